//! Error types for the page migration.
//!
//! Parsing errors (`MalformedXml`, `ZoneNotFound`, ...) are scoped to a single
//! field and are reported by the migrator without stopping the run.
//! `BlockDefinitionNotFound` is the one recoverable error: the operator decides
//! whether unknown blocks are ignored for the rest of the run.

use thiserror::Error;

/// Main error type for the migration library.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The landing page XML could not be parsed.
    #[error("Malformed landing page XML: {0}")]
    MalformedXml(#[from] roxmltree::Error),

    /// Missing required XML element.
    #[error("Missing required XML element: {element} in {context}")]
    MissingElement { element: String, context: String },

    /// The page refers to a layout that is not configured.
    #[error("Layout definition not found: '{0}'")]
    LayoutNotFound(String),

    /// A zone does not match any zone slot of the page layout.
    #[error("Zone with id: \"{zone_id}\" not found for layout: \"{layout_name}\", id: \"{layout_id}\"")]
    ZoneNotFound {
        zone_id: String,
        layout_id: String,
        layout_name: String,
    },

    /// A block refers to a block type missing from the catalog.
    #[error("Block definition not found for block type \"{block_type}\"")]
    BlockDefinitionNotFound { block_type: String },

    /// The requested content version does not exist.
    #[error("Content {content_id} has no version {version_no}")]
    ContentNotFound { content_id: i64, version_no: i32 },

    /// Database query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Generic persistence failure reported by a page gateway.
    #[error("persistence error: {0}")]
    Gateway(String),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Definitions file could not be deserialized.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl MigrationError {
    /// Return the offending block type when this is an unknown block error.
    #[must_use]
    pub fn unknown_block_type(&self) -> Option<&str> {
        match self {
            Self::BlockDefinitionNotFound { block_type } => Some(block_type),
            _ => None,
        }
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrationError>;

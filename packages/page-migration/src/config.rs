//! Configuration for a migration run.
//!
//! Connection settings come from the environment; layouts, block types and
//! attribute converter assignments come from a YAML definitions file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::converter::{create_attribute_converter_registry, ConverterKind, XmlAttributeProcessor};
use crate::definitions::{
    BlockDefinition, BlockDefinitionCatalog, LayoutDefinition, LayoutDefinitionRegistry,
};
use crate::error::{MigrationError, Result};
use crate::parser::PageParser;

/// Field type identifier of legacy landing page fields.
pub const LANDING_PAGE_FIELD_TYPE: &str = "ezlandingpage";

/// Default location of the definitions file.
pub const DEFAULT_DEFINITIONS_PATH: &str = "config/definitions.yaml";

/// Default connection pool size.
///
/// The run-wide transaction pins one connection while content is read on
/// another, so fewer than two connections would deadlock.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 2;

#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub definitions_path: PathBuf,
    pub field_type: String,
}

impl MigrationConfig {
    /// Read the configuration from environment variables.
    ///
    /// * `DATABASE_URL` (required)
    /// * `DATABASE_MAX_CONNECTIONS` (default 2)
    /// * `PAGE_MIGRATION_DEFINITIONS` (default `config/definitions.yaml`)
    /// * `PAGE_MIGRATION_FIELD_TYPE` (default `ezlandingpage`)
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| MigrationError::Config("DATABASE_URL not set".into()))?;

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let definitions_path = std::env::var("PAGE_MIGRATION_DEFINITIONS")
            .unwrap_or_else(|_| DEFAULT_DEFINITIONS_PATH.into())
            .into();

        let field_type = std::env::var("PAGE_MIGRATION_FIELD_TYPE")
            .unwrap_or_else(|_| LANDING_PAGE_FIELD_TYPE.into());

        Self {
            database_url,
            max_connections,
            definitions_path,
            field_type,
        }
        .validated()
    }

    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            definitions_path: DEFAULT_DEFINITIONS_PATH.into(),
            field_type: LANDING_PAGE_FIELD_TYPE.into(),
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_definitions_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.definitions_path = path.into();
        self
    }

    /// Check settings that would make a run fail halfway.
    pub fn validated(self) -> Result<Self> {
        if self.max_connections < DEFAULT_MAX_CONNECTIONS {
            return Err(MigrationError::Config(format!(
                "DATABASE_MAX_CONNECTIONS must be at least {DEFAULT_MAX_CONNECTIONS}, got {}",
                self.max_connections
            )));
        }
        if self.field_type.trim().is_empty() {
            return Err(MigrationError::Config(
                "PAGE_MIGRATION_FIELD_TYPE must not be empty".into(),
            ));
        }
        Ok(self)
    }
}

/// Contents of the definitions file.
///
/// ```yaml
/// layouts:
///   - id: default
///     name: Default layout
///     zones:
///       - id: default
///         name: Default zone
/// blocks:
///   - identifier: tag
///     name: Code
/// attribute_converters:
///   tag: default
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Definitions {
    #[serde(default)]
    pub layouts: Vec<LayoutDefinition>,

    #[serde(default)]
    pub blocks: Vec<BlockDefinition>,

    /// Block type identifier to converter kind.
    #[serde(default)]
    pub attribute_converters: BTreeMap<String, ConverterKind>,
}

impl Definitions {
    /// Parse definitions from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let definitions: Self = serde_yaml_ng::from_str(yaml)?;
        if definitions.layouts.is_empty() {
            return Err(MigrationError::Config(
                "definitions declare no layouts".into(),
            ));
        }
        Ok(definitions)
    }

    /// Load definitions from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            MigrationError::Io(std::io::Error::new(
                e.kind(),
                format!("Cannot read definitions {}: {e}", path.display()),
            ))
        })?;
        Self::from_yaml(&yaml)
    }

    /// Build the page parser described by these definitions.
    #[must_use]
    pub fn into_parser(self) -> PageParser {
        let registry = create_attribute_converter_registry(&self.attribute_converters);
        for block_type in self.attribute_converters.keys() {
            if !self.blocks.iter().any(|b| &b.identifier == block_type) {
                tracing::warn!(
                    block_type = %block_type,
                    "Attribute converter registered for a block type missing from the catalog"
                );
            }
        }

        PageParser::new(
            LayoutDefinitionRegistry::new(self.layouts),
            BlockDefinitionCatalog::new(self.blocks),
            XmlAttributeProcessor::new(registry),
        )
    }
}

//! Layout and block definitions the parser validates legacy pages against.
//!
//! Both are immutable once loaded from the definitions file (see
//! [`crate::config::Definitions`]).

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{MigrationError, Result};

/// A zone slot declared by a layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ZoneSlot {
    /// Zone slot identifier.
    pub id: String,

    /// Human readable name.
    #[serde(default)]
    pub name: String,
}

/// A page layout and its ordered zone slots.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LayoutDefinition {
    /// Layout identifier, as used in the page's `layout` attribute.
    pub id: String,

    /// Human readable name.
    #[serde(default)]
    pub name: String,

    /// Zone slots in declaration order.
    #[serde(default)]
    pub zones: Vec<ZoneSlot>,
}

impl LayoutDefinition {
    /// Check whether a zone slot with this id is declared.
    #[must_use]
    pub fn has_zone(&self, zone_id: &str) -> bool {
        self.zones.iter().any(|slot| slot.id == zone_id)
    }

    /// Check whether the zone at `index` is valid for this layout.
    ///
    /// A zone is accepted when its id is declared, or when the layout has a
    /// zone slot at the same position.
    #[must_use]
    pub fn accepts_zone(&self, zone_id: &str, index: usize) -> bool {
        self.has_zone(zone_id) || index < self.zones.len()
    }
}

/// A known block type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockDefinition {
    /// Block type identifier. Also the attribute converter lookup key.
    pub identifier: String,

    /// Human readable name.
    #[serde(default)]
    pub name: String,
}

impl BlockDefinition {
    /// Create a block definition.
    #[must_use]
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
        }
    }
}

/// Layout definitions keyed by id.
#[derive(Debug, Clone, Default)]
pub struct LayoutDefinitionRegistry {
    layouts: HashMap<String, LayoutDefinition>,
}

impl LayoutDefinitionRegistry {
    /// Create a registry from layout definitions. Later duplicates win.
    #[must_use]
    pub fn new(layouts: impl IntoIterator<Item = LayoutDefinition>) -> Self {
        Self {
            layouts: layouts
                .into_iter()
                .map(|layout| (layout.id.clone(), layout))
                .collect(),
        }
    }

    /// Get a layout definition by id.
    ///
    /// # Errors
    /// Returns `LayoutNotFound` if no layout with this id is configured.
    pub fn get(&self, layout_id: &str) -> Result<&LayoutDefinition> {
        self.layouts
            .get(layout_id)
            .ok_or_else(|| MigrationError::LayoutNotFound(layout_id.to_string()))
    }
}

/// Catalog of block definitions keyed by block type.
#[derive(Debug, Clone, Default)]
pub struct BlockDefinitionCatalog {
    definitions: HashMap<String, BlockDefinition>,
}

impl BlockDefinitionCatalog {
    /// Create a catalog from block definitions. Later duplicates win.
    #[must_use]
    pub fn new(definitions: impl IntoIterator<Item = BlockDefinition>) -> Self {
        Self {
            definitions: definitions
                .into_iter()
                .map(|definition| (definition.identifier.clone(), definition))
                .collect(),
        }
    }

    /// Check if a block type is known.
    #[must_use]
    pub fn has(&self, block_type: &str) -> bool {
        self.definitions.contains_key(block_type)
    }

    /// Get the definition of a block type.
    ///
    /// # Errors
    /// Returns `BlockDefinitionNotFound` carrying the block type if unknown.
    pub fn get(&self, block_type: &str) -> Result<&BlockDefinition> {
        self.definitions
            .get(block_type)
            .ok_or_else(|| MigrationError::BlockDefinitionNotFound {
                block_type: block_type.to_string(),
            })
    }
}

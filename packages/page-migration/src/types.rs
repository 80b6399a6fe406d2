//! Core data types for migrated landing pages.
//!
//! A [`Page`] owns its zones, a [`Zone`] owns its blocks and a [`Block`] owns
//! its attributes. The graph is built per content field during migration and
//! handed to the page gateway; it is never kept afterwards.

use chrono::{DateTime, Utc};

/// Name/value pair attached to a block.
///
/// Collection-style converters encode multiple values as a comma separated
/// string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name (e.g., "title", "locationlist").
    pub name: String,

    /// Attribute value.
    pub value: String,
}

impl Attribute {
    /// Create a new attribute.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A placed content widget inside a zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Identifier of the block in the legacy XML.
    pub id: String,

    /// Block type identifier (e.g., "tag", "collection").
    pub block_type: String,

    /// Display name, empty when the legacy block had none.
    pub name: String,

    /// View identifier.
    pub view: String,

    /// Design style. Legacy content predates it, always empty.
    pub style: String,

    /// Compiled design. Always empty for legacy content.
    pub compiled: String,

    /// CSS class. Always empty for legacy content.
    pub class: String,

    /// Start of the visibility window.
    pub since: Option<DateTime<Utc>>,

    /// End of the visibility window.
    pub till: Option<DateTime<Utc>>,

    /// Block attributes in document order.
    pub attributes: Vec<Attribute>,
}

impl Block {
    /// Create a block as found in legacy XML: no design, no visibility window.
    #[must_use]
    pub fn from_legacy(
        id: impl Into<String>,
        block_type: impl Into<String>,
        name: impl Into<String>,
        view: impl Into<String>,
        attributes: Vec<Attribute>,
    ) -> Self {
        Self {
            id: id.into(),
            block_type: block_type.into(),
            name: name.into(),
            view: view.into(),
            style: String::new(),
            compiled: String::new(),
            class: String::new(),
            since: None,
            till: None,
            attributes,
        }
    }

    /// Visibility window as unix timestamps, as stored by the page gateway.
    #[must_use]
    pub fn visibility_timestamps(&self) -> (Option<i64>, Option<i64>) {
        (
            self.since.map(|since| since.timestamp()),
            self.till.map(|till| till.timestamp()),
        )
    }
}

/// A named region of a page layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Storage identifier. Empty until the zone is persisted.
    pub id: String,

    /// Zone name.
    pub name: String,

    /// Blocks in document order.
    pub blocks: Vec<Block>,
}

impl Zone {
    /// Create a zone that has not been persisted yet.
    #[must_use]
    pub fn new(name: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            blocks,
        }
    }
}

/// Root of a migrated landing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Layout identifier.
    pub layout: String,

    /// Zones in document order.
    pub zones: Vec<Zone>,
}

impl Page {
    /// Create a new page.
    #[must_use]
    pub fn new(layout: impl Into<String>, zones: Vec<Zone>) -> Self {
        Self {
            layout: layout.into(),
            zones,
        }
    }

    /// The page stored for a landing page field without legacy XML.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(String::new(), Vec::new())
    }

    /// Total number of blocks across all zones.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.zones.iter().map(|zone| zone.blocks.len()).sum()
    }
}

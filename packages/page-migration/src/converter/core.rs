//! Converter registry mapping block type identifiers to converters.

use std::collections::{BTreeMap, HashMap};

use super::handler::AttributeConverter;

/// Registry mapping block type identifiers to attribute converters.
///
/// Registration is last-write-wins per block type. The registry does not
/// check whether a converter fits the block type it is registered for.
pub struct ConverterRegistry {
    converters: HashMap<String, Box<dyn AttributeConverter>>,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// Register a converter for a block type, replacing any previous one.
    pub fn register(
        &mut self,
        block_type: impl Into<String>,
        converter: impl AttributeConverter + 'static,
    ) {
        self.register_boxed(block_type, Box::new(converter));
    }

    /// Register an already boxed converter for a block type.
    pub fn register_boxed(
        &mut self,
        block_type: impl Into<String>,
        converter: Box<dyn AttributeConverter>,
    ) {
        let block_type = block_type.into();
        if self.converters.insert(block_type.clone(), converter).is_some() {
            tracing::debug!(block_type = %block_type, "replaced attribute converter");
        }
    }

    /// Get the converter registered for a block type.
    #[must_use]
    pub fn get(&self, block_type: &str) -> Option<&dyn AttributeConverter> {
        self.converters.get(block_type).map(|c| c.as_ref())
    }

    /// Check if a converter is registered for a block type.
    #[must_use]
    pub fn has_converter(&self, block_type: &str) -> bool {
        self.converters.contains_key(block_type)
    }

    /// All registrations, ordered by block type.
    #[must_use]
    pub fn list(&self) -> BTreeMap<&str, &dyn AttributeConverter> {
        self.converters
            .iter()
            .map(|(block_type, converter)| (block_type.as_str(), converter.as_ref()))
            .collect()
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

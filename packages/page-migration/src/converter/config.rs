//! Registry configuration from the definitions file.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::converters::{CollectionConverter, DefaultConverter};
use super::core::ConverterRegistry;
use super::handler::AttributeConverter;

/// Built-in converter kinds that can be assigned to a block type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConverterKind {
    /// Name/value pairs, see [`DefaultConverter`].
    Default,
    /// Comma separated location ids, see [`CollectionConverter`].
    Collection,
}

impl ConverterKind {
    /// Instantiate the converter for this kind.
    #[must_use]
    pub fn build(self) -> Box<dyn AttributeConverter> {
        match self {
            Self::Default => Box::new(DefaultConverter),
            Self::Collection => Box::new(CollectionConverter),
        }
    }
}

/// Create a converter registry from a block type to converter kind mapping.
#[must_use]
pub fn create_attribute_converter_registry(
    mapping: &BTreeMap<String, ConverterKind>,
) -> ConverterRegistry {
    let mut registry = ConverterRegistry::new();

    for (block_type, kind) in mapping {
        registry.register_boxed(block_type.clone(), kind.build());
    }

    registry
}

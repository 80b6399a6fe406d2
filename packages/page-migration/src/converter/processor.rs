//! Processor that dispatches a block's attributes to its converter.

use roxmltree::Node;

use super::core::ConverterRegistry;
use crate::definitions::BlockDefinition;
use crate::types::Attribute;

/// Looks up the converter for a block definition and delegates to it.
///
/// Block types without a registered converter contribute no attributes;
/// they never fail the page.
pub struct XmlAttributeProcessor {
    registry: ConverterRegistry,
}

impl XmlAttributeProcessor {
    /// Create a processor over the given registry.
    #[must_use]
    pub fn new(registry: ConverterRegistry) -> Self {
        Self { registry }
    }

    /// Convert the attributes element of a block.
    pub fn process(&self, definition: &BlockDefinition, node: Node<'_, '_>) -> Vec<Attribute> {
        match self.registry.get(&definition.identifier) {
            Some(converter) => converter.convert(definition, node),
            None => {
                tracing::debug!(
                    block_type = %definition.identifier,
                    "No attribute converter registered, block gets no attributes"
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::converters::DefaultConverter;
    use roxmltree::Document;

    const ATTRIBUTES: &str = r#"<attributes><attribute name="title">Hello</attribute></attributes>"#;

    #[test]
    fn test_process_with_converter() {
        let mut registry = ConverterRegistry::new();
        registry.register("tag", DefaultConverter);
        let processor = XmlAttributeProcessor::new(registry);

        let doc = Document::parse(ATTRIBUTES).unwrap();
        let attributes = processor.process(&BlockDefinition::new("tag", ""), doc.root_element());

        assert_eq!(attributes, vec![Attribute::new("title", "Hello")]);
    }

    #[test]
    fn test_process_without_converter() {
        let processor = XmlAttributeProcessor::new(ConverterRegistry::new());

        let doc = Document::parse(ATTRIBUTES).unwrap();
        let attributes =
            processor.process(&BlockDefinition::new("video", ""), doc.root_element());

        assert!(attributes.is_empty());
    }
}

//! Name/value attribute converter.

use roxmltree::Node;

use crate::converter::handler::AttributeConverter;
use crate::definitions::BlockDefinition;
use crate::types::Attribute;
use crate::xml::{attribute_or_empty, element_children, text_content};

/// Converter for the plain attribute dialect.
///
/// Every child element of `<attributes>` becomes one attribute: the name is
/// taken from its `name` attribute, the value is its text content.
///
/// ```xml
/// <attributes>
///     <attribute name="title">Hello</attribute>
/// </attributes>
/// ```
pub struct DefaultConverter;

impl AttributeConverter for DefaultConverter {
    fn name(&self) -> &'static str {
        "default"
    }

    fn convert(&self, _definition: &BlockDefinition, node: Node<'_, '_>) -> Vec<Attribute> {
        element_children(node)
            .map(|child| Attribute::new(attribute_or_empty(child, "name"), text_content(child)))
            .collect()
    }
}

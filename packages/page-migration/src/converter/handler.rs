//! Attribute converter trait definition.

use roxmltree::Node;

use crate::definitions::BlockDefinition;
use crate::types::Attribute;

/// Trait for attribute converters.
///
/// A converter receives the block definition and the block's `<attributes>`
/// element and returns a flat list of name/value attributes.
pub trait AttributeConverter: Send + Sync {
    /// Short name of the converter, used in diagnostics.
    fn name(&self) -> &'static str;

    /// Convert an attributes element into block attributes.
    ///
    /// # Arguments
    /// * `definition` - Definition of the block being converted
    /// * `node` - The block's `<attributes>` element
    fn convert(&self, definition: &BlockDefinition, node: Node<'_, '_>) -> Vec<Attribute>;
}

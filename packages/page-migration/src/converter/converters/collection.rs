//! Location list attribute converter for collection blocks.

use roxmltree::Node;

use crate::converter::handler::AttributeConverter;
use crate::definitions::BlockDefinition;
use crate::types::Attribute;
use crate::xml::{find_descendants, get_tag_name, get_text};

/// Name of the attribute produced by [`CollectionConverter`].
pub const LOCATION_LIST_ATTRIBUTE: &str = "locationlist";

/// Converter for collection blocks.
///
/// Gathers every `<locationId>` inside a `<locationlist>` container into a
/// single comma separated `locationlist` attribute. Each id counts once, even
/// when location lists are nested. The attribute is always
/// emitted, with an empty value when the block lists no locations.
///
/// ```xml
/// <attributes>
///     <locationlist>
///         <locationId>12</locationId>
///         <locationId>45</locationId>
///     </locationlist>
/// </attributes>
/// ```
pub struct CollectionConverter;

impl AttributeConverter for CollectionConverter {
    fn name(&self) -> &'static str {
        "collection"
    }

    fn convert(&self, _definition: &BlockDefinition, node: Node<'_, '_>) -> Vec<Attribute> {
        let location_ids: Vec<String> = find_descendants(node, "locationId")
            .filter(|id| {
                id.ancestors()
                    .skip(1)
                    .take_while(|ancestor| *ancestor != node)
                    .any(|ancestor| get_tag_name(ancestor) == LOCATION_LIST_ATTRIBUTE)
            })
            .map(get_text)
            .collect();

        vec![Attribute::new(
            LOCATION_LIST_ATTRIBUTE,
            location_ids.join(","),
        )]
    }
}

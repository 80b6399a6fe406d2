//! Parser turning legacy landing page XML into a [`Page`] graph.
//!
//! The legacy document looks like:
//!
//! ```xml
//! <page layout="2zonesLayout1">
//!   <zones>
//!     <zone id="left" name="Left">
//!       <blocks>
//!         <block id="b-1" type="tag" view="default" name="Intro">
//!           <attributes>
//!             <attribute name="content">Hello</attribute>
//!           </attributes>
//!         </block>
//!       </blocks>
//!     </zone>
//!   </zones>
//! </page>
//! ```

use roxmltree::{Document, Node};

use crate::converter::XmlAttributeProcessor;
use crate::definitions::{BlockDefinitionCatalog, LayoutDefinitionRegistry};
use crate::error::{MigrationError, Result};
use crate::types::{Block, Page, Zone};
use crate::xml::{attribute_or_empty, find_descendant, find_descendants};

/// Parses legacy landing page XML against layout and block definitions.
pub struct PageParser {
    layouts: LayoutDefinitionRegistry,
    blocks: BlockDefinitionCatalog,
    processor: XmlAttributeProcessor,
}

impl PageParser {
    /// Create a parser.
    #[must_use]
    pub fn new(
        layouts: LayoutDefinitionRegistry,
        blocks: BlockDefinitionCatalog,
        processor: XmlAttributeProcessor,
    ) -> Self {
        Self {
            layouts,
            blocks,
            processor,
        }
    }

    /// Parse one landing page document.
    ///
    /// # Arguments
    /// * `xml` - Raw legacy XML
    /// * `ignore_unknown_blocks` - Drop blocks whose type is not in the catalog
    ///   instead of failing the page
    ///
    /// # Errors
    /// * `MalformedXml` if the document is not well-formed
    /// * `LayoutNotFound` if the page layout is not configured
    /// * `MissingElement` if the page has no `<zones>` element
    /// * `ZoneNotFound` if a zone matches neither a zone slot id nor a
    ///   zone slot position of the layout
    /// * `BlockDefinitionNotFound` for an unknown block type, unless
    ///   `ignore_unknown_blocks` is set
    pub fn parse(&self, xml: &str, ignore_unknown_blocks: bool) -> Result<Page> {
        let doc = Document::parse(xml)?;
        let page_element = doc.root_element();

        let layout_id = attribute_or_empty(page_element, "layout");
        let layout = self.layouts.get(layout_id)?;

        let zones_element =
            find_descendant(page_element, "zones").ok_or_else(|| MigrationError::MissingElement {
                element: "zones".to_string(),
                context: format!("<page layout=\"{layout_id}\">"),
            })?;

        let mut zones = Vec::new();

        for (index, zone_element) in find_descendants(zones_element, "zone").enumerate() {
            let zone_id = attribute_or_empty(zone_element, "id");

            if !layout.accepts_zone(zone_id, index) {
                return Err(MigrationError::ZoneNotFound {
                    zone_id: zone_id.to_string(),
                    layout_id: layout.id.clone(),
                    layout_name: layout.name.clone(),
                });
            }

            // A zone without <blocks> is an empty zone
            let blocks = match find_descendant(zone_element, "blocks") {
                Some(blocks_element) => self.parse_blocks(blocks_element, ignore_unknown_blocks)?,
                None => Vec::new(),
            };

            zones.push(Zone::new(attribute_or_empty(zone_element, "name"), blocks));
        }

        let page = Page::new(layout_id, zones);
        tracing::debug!(
            layout = %page.layout,
            zones = page.zones.len(),
            blocks = page.block_count(),
            "Parsed landing page"
        );

        Ok(page)
    }

    fn parse_blocks(
        &self,
        blocks_element: Node<'_, '_>,
        ignore_unknown_blocks: bool,
    ) -> Result<Vec<Block>> {
        let mut blocks = Vec::new();

        for block_element in find_descendants(blocks_element, "block") {
            let block_type = attribute_or_empty(block_element, "type");

            if ignore_unknown_blocks && !self.blocks.has(block_type) {
                tracing::debug!(block_type = %block_type, "Ignoring block of unknown type");
                continue;
            }

            let definition = self.blocks.get(block_type)?;

            let attributes = find_descendant(block_element, "attributes")
                .map(|node| self.processor.process(definition, node))
                .unwrap_or_default();

            blocks.push(Block::from_legacy(
                attribute_or_empty(block_element, "id"),
                block_type,
                attribute_or_empty(block_element, "name"),
                attribute_or_empty(block_element, "view"),
                attributes,
            ));
        }

        Ok(blocks)
    }
}

//! XML utility functions for navigating and extracting data from DOM trees.

use roxmltree::Node;

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use page_migration::xml::get_tag_name;
///
/// let xml = r#"<page><zones/></page>"#;
/// let doc = Document::parse(xml).unwrap();
/// let zones = doc.root_element().first_element_child().unwrap();
/// assert_eq!(get_tag_name(zones), "zones");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Find all descendant elements with the given tag name, in document order.
///
/// The node itself is not included.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use page_migration::xml::find_descendants;
///
/// let xml = r#"<zones><zone><blocks><block/><block/></blocks></zone></zones>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// assert_eq!(find_descendants(doc.root_element(), "block").count(), 2);
/// ```
pub fn find_descendants<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .filter(move |child| child.is_element() && get_tag_name(*child) == tag)
}

/// Find the first descendant element with the given tag name.
pub fn find_descendant<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> Option<Node<'a, 'input>> {
    find_descendants(node, tag).next()
}

/// Get the text of a node and all its descendants, trimmed.
///
/// Returns an empty string if the node has no text.
pub fn get_text(node: Node<'_, '_>) -> String {
    text_content(node).trim().to_string()
}

/// Get the concatenated text of a node and all its descendants, untrimmed.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use page_migration::xml::text_content;
///
/// let xml = r#"<attribute name="content"><p>Hello <b>world</b></p></attribute>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(text_content(doc.root_element()), "Hello world");
/// ```
pub fn text_content(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|descendant| descendant.is_text())
        .filter_map(|descendant| descendant.text())
        .collect()
}

/// Get an attribute value, or an empty string when it is absent.
pub fn attribute_or_empty<'a>(node: Node<'a, '_>, name: &str) -> &'a str {
    node.attribute(name).unwrap_or_default()
}

/// Get all element children of a node.
///
/// Excludes text nodes, comments and processing instructions.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    #[test]
    fn test_get_tag_name_with_namespace() {
        let xml = r#"<ns:page xmlns:ns="http://example.com"><ns:zones/></ns:page>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_tag_name(doc.root_element()), "page");
    }

    #[test]
    fn test_find_descendants_excludes_self() {
        let xml = r#"<block><block/></block>"#;
        let doc = Document::parse(xml).unwrap();

        assert_eq!(find_descendants(doc.root_element(), "block").count(), 1);
    }

    #[test]
    fn test_find_descendant_document_order() {
        let xml = r#"<block><a><attributes id="first"/></a><attributes id="second"/></block>"#;
        let doc = Document::parse(xml).unwrap();

        let found = find_descendant(doc.root_element(), "attributes").unwrap();
        assert_eq!(found.attribute("id"), Some("first"));
    }

    #[test]
    fn test_get_text() {
        let xml = r#"<locationId>  42  </locationId>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_text(doc.root_element()), "42");
    }

    #[test]
    fn test_get_text_spans_comments() {
        let xml = r#"<locationId>12<!-- moved -->3</locationId>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_text(doc.root_element()), "123");
    }

    #[test]
    fn test_text_content_keeps_whitespace() {
        let xml = r#"<attribute> a <b>b</b> </attribute>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(text_content(doc.root_element()), " a b ");
    }

    #[test]
    fn test_text_content_cdata() {
        let xml = r#"<attribute><![CDATA[<p>rich</p>]]></attribute>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(text_content(doc.root_element()), "<p>rich</p>");
    }

    #[test]
    fn test_attribute_or_empty() {
        let xml = r#"<block name="Teaser"/>"#;
        let doc = Document::parse(xml).unwrap();
        let block = doc.root_element();

        assert_eq!(attribute_or_empty(block, "name"), "Teaser");
        assert_eq!(attribute_or_empty(block, "view"), "");
    }

    #[test]
    fn test_element_children() {
        let xml = r#"<attributes>
            <attribute name="a"/>
            <!-- note -->
            <attribute name="b"/>
        </attributes>"#;
        let doc = Document::parse(xml).unwrap();

        assert_eq!(element_children(doc.root_element()).count(), 2);
    }
}

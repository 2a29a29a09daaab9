use crate::errors::DocError;
use crate::tree::DocNode;

/// Parse XML text into a [`DocNode`] tree rooted at the document element.
///
/// Element names keep their local part (GraphML inputs frequently carry a
/// default namespace); attribute names are kept verbatim. Text content is
/// the concatenation of all direct text children, trimmed.
pub fn parse_xml(source: &str) -> Result<DocNode, DocError> {
    let doc = roxmltree::Document::parse(source).map_err(|e| DocError::Xml {
        message: e.to_string(),
    })?;
    Ok(convert(doc.root_element()))
}

fn convert(element: roxmltree::Node<'_, '_>) -> DocNode {
    let mut node = DocNode::new(element.tag_name().name());
    for attr in element.attributes() {
        node = node.with_attr(attr.name(), attr.value());
    }
    let mut text = String::new();
    for child in element.children() {
        if child.is_element() {
            node.push_child(convert(child));
        } else if let Some(t) = child.text() {
            text.push_str(t);
        }
    }
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        node.set_text(trimmed);
    }
    node
}

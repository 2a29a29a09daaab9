use indexmap::IndexMap;

/// Synthetic tag given to elements of a YAML sequence.
///
/// XML children carry their element name; YAML sequence entries have none, so
/// the adapter assigns this tag to keep the tree interface uniform.
pub const ITEM_TAG: &str = "item";

/// One node of the normalized document tree.
///
/// The tree is fully owned; loaders borrow into it for the duration of a
/// parse and never hold references past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocNode {
    tag: String,
    text: String,
    attrs: IndexMap<String, String>,
    children: Vec<DocNode>,
}

impl DocNode {
    pub fn new(tag: impl Into<String>) -> Self {
        DocNode {
            tag: tag.into(),
            text: String::new(),
            attrs: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: DocNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn push_child(&mut self, child: DocNode) {
        self.children.push(child);
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Look up an attribute by name.
    ///
    /// XML attributes are matched first; for YAML (which has no attribute
    /// syntax) a leaf child with the requested tag stands in, so both
    /// dialect loaders can use the same accessor.
    pub fn attr(&self, name: &str) -> Option<&str> {
        if let Some(v) = self.attrs.get(name) {
            return Some(v.as_str());
        }
        self.children
            .iter()
            .find(|c| c.tag == name && c.children.is_empty())
            .map(|c| c.text.as_str())
    }

    /// Iterate children with the given tag, in document order.
    pub fn children<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a DocNode> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// All children regardless of tag.
    pub fn all_children(&self) -> impl Iterator<Item = &DocNode> {
        self.children.iter()
    }

    /// First child with the given tag, if any.
    pub fn child(&self, tag: &str) -> Option<&DocNode> {
        self.children.iter().find(|c| c.tag == tag)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_tag_text_and_attrs() {
        let node = DocNode::new("edge")
            .with_text("body")
            .with_attr("source", "n1")
            .with_attr("target", "n2");
        assert_eq!(node.tag(), "edge");
        assert_eq!(node.text(), "body");
        assert_eq!(node.attr("source"), Some("n1"));
        assert_eq!(node.attr("target"), Some("n2"));
        assert_eq!(node.attr("missing"), None);
    }

    #[test]
    fn children_filter_by_tag_in_order() {
        let node = DocNode::new("graph")
            .with_child(DocNode::new("node").with_attr("id", "a"))
            .with_child(DocNode::new("edge"))
            .with_child(DocNode::new("node").with_attr("id", "b"));
        let ids: Vec<_> = node
            .children("node")
            .map(|n| n.attr("id").unwrap())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(node.children("edge").count(), 1);
        assert_eq!(node.all_children().count(), 3);
    }

    #[test]
    fn attr_falls_back_to_leaf_child() {
        let node = DocNode::new("waypoint").with_child(DocNode::new("line").with_text("12"));
        assert_eq!(node.attr("line"), Some("12"));
    }

    #[test]
    fn attr_fallback_skips_non_leaf_children() {
        let nested = DocNode::new("location").with_child(DocNode::new("line").with_text("3"));
        let node = DocNode::new("waypoint").with_child(nested);
        assert_eq!(node.attr("location"), None);
    }

    #[test]
    fn child_returns_first_match() {
        let node = DocNode::new("root")
            .with_child(DocNode::new("data").with_text("first"))
            .with_child(DocNode::new("data").with_text("second"));
        assert_eq!(node.child("data").unwrap().text(), "first");
        assert!(node.child("nothing").is_none());
    }
}

use serde_yaml::Value;

use crate::errors::DocError;
use crate::tree::{DocNode, ITEM_TAG};

/// Parse YAML text into a [`DocNode`] tree.
///
/// The returned root carries the synthetic tag `document`. Mappings become
/// children named after their keys, sequence entries become repeated
/// [`ITEM_TAG`] children, and scalars become node text, so the loader walks
/// the same tree shape as the XML adapter.
pub fn parse_yaml(source: &str) -> Result<DocNode, DocError> {
    let value: Value = serde_yaml::from_str(source).map_err(|e| DocError::Yaml {
        message: e.to_string(),
    })?;
    let mut root = DocNode::new("document");
    fill(&mut root, &value)?;
    Ok(root)
}

fn fill(node: &mut DocNode, value: &Value) -> Result<(), DocError> {
    match value {
        Value::Null => {}
        Value::Bool(b) => node.set_text(b.to_string()),
        Value::Number(n) => node.set_text(n.to_string()),
        Value::String(s) => node.set_text(s.clone()),
        Value::Sequence(seq) => {
            for entry in seq {
                let mut child = DocNode::new(ITEM_TAG);
                fill(&mut child, entry)?;
                node.push_child(child);
            }
        }
        Value::Mapping(map) => {
            for (key, entry) in map {
                let tag = key.as_str().ok_or_else(|| DocError::YamlStructure {
                    message: format!("non-string mapping key: {key:?}"),
                })?;
                let mut child = DocNode::new(tag);
                fill(&mut child, entry)?;
                node.push_child(child);
            }
        }
        Value::Tagged(tagged) => fill(node, &tagged.value)?,
    }
    Ok(())
}

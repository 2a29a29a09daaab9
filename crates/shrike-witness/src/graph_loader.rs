use shrike_doc::DocNode;

use crate::constraint::skim_result;
use crate::errors::{Diagnostics, WitnessError};
use crate::graph::{Control, Edge, GraphMetadata, Node, WitnessAutomaton};
use crate::nondet::NONDET_PREFIX;

/// Loader configuration.
///
/// `refutation` starts enabled; the loader clears it when it meets
/// attributes or assumption text the core cannot faithfully replay.
#[derive(Debug, Clone, Copy)]
pub struct GraphLoaderOptions {
    pub refutation: bool,
}

impl Default for GraphLoaderOptions {
    fn default() -> Self {
        GraphLoaderOptions { refutation: true }
    }
}

/// Build a [`WitnessAutomaton`] from a parsed GraphML document.
///
/// All structural and lexical problems are fatal; unknown `<data>` keys are
/// advisory. The returned automaton is not yet normalized.
pub fn load_graph_witness(
    root: &DocNode,
    options: GraphLoaderOptions,
    diags: &mut Diagnostics,
) -> Result<WitnessAutomaton, WitnessError> {
    if root.tag() != "graphml" {
        return Err(WitnessError::MissingElement {
            element: "graphml".into(),
        });
    }
    let graph = root.child("graph").ok_or_else(|| WitnessError::MissingElement {
        element: "graph".into(),
    })?;

    let metadata = read_graph_metadata(graph, diags)?;
    let mut automaton = WitnessAutomaton::new(metadata);
    if !options.refutation {
        automaton.disable_refutation();
    }

    for node_elem in graph.children("node") {
        let node = read_node(node_elem, diags)?;
        if automaton.node_id(&node.id).is_some() {
            return Err(WitnessError::DuplicateNode { id: node.id });
        }
        automaton.push_node(node);
    }

    for edge_elem in graph.children("edge") {
        read_edge(edge_elem, &mut automaton, diags)?;
    }

    let entries: Vec<_> = automaton
        .nodes()
        .filter(|(_, n)| n.entry)
        .map(|(id, _)| id)
        .collect();
    if entries.len() != 1 {
        return Err(WitnessError::EntryCount {
            count: entries.len(),
        });
    }
    automaton.entry = entries[0];

    if automaton.violations().is_empty() {
        return Err(WitnessError::NoViolation);
    }

    Ok(automaton)
}

fn read_graph_metadata(
    graph: &DocNode,
    diags: &mut Diagnostics,
) -> Result<GraphMetadata, WitnessError> {
    let mut metadata = GraphMetadata::default();
    let mut witness_type = String::new();

    for data in graph.children("data") {
        let key = data.attr("key").unwrap_or("");
        let value = data.text();
        match key {
            "witness-type" => witness_type = value.to_string(),
            "sourcecodelang" => {
                if value != "C" && value != "c" {
                    diags.warn(
                        "shrike::witness::source_language",
                        format!("unsupported source language '{value}'"),
                    );
                    return Err(WitnessError::UnsupportedLanguage {
                        found: value.to_string(),
                    });
                }
            }
            "producer" => metadata.producer = value.to_string(),
            "specification" => metadata.specification = value.to_string(),
            "programfile" => metadata.program_file = value.to_string(),
            "programhash" => metadata.program_hash = value.to_string(),
            "architecture" => metadata.architecture = value.to_string(),
            "creationtime" => metadata.creation_time = value.to_string(),
            other => diags.warn(
                "shrike::witness::unknown_key",
                format!("unknown graph data key '{other}'"),
            ),
        }
    }

    if witness_type != "violation_witness" {
        return Err(WitnessError::WrongWitnessType {
            found: witness_type,
        });
    }
    Ok(metadata)
}

fn read_node(node_elem: &DocNode, diags: &mut Diagnostics) -> Result<Node, WitnessError> {
    let id = node_elem.attr("id").ok_or_else(|| WitnessError::MissingElement {
        element: "node id".into(),
    })?;
    let mut node = Node::new(id);

    for data in node_elem.children("data") {
        let key = data.attr("key").unwrap_or("");
        let value = data.text();
        match key {
            "entry" => node.entry = parse_bool(key, value)?,
            "sink" => node.sink = parse_bool(key, value)?,
            "violation" => node.violation = parse_bool(key, value)?,
            other => diags.warn(
                "shrike::witness::unknown_key",
                format!("unknown node data key '{other}'"),
            ),
        }
    }
    Ok(node)
}

fn read_edge(
    edge_elem: &DocNode,
    automaton: &mut WitnessAutomaton,
    diags: &mut Diagnostics,
) -> Result<(), WitnessError> {
    let source_id = edge_elem
        .attr("source")
        .ok_or_else(|| WitnessError::MissingElement {
            element: "edge source".into(),
        })?;
    let target_id = edge_elem
        .attr("target")
        .ok_or_else(|| WitnessError::MissingElement {
            element: "edge target".into(),
        })?;
    let source = automaton
        .node_id(source_id)
        .ok_or_else(|| WitnessError::DanglingEdge {
            id: source_id.to_string(),
        })?;
    let target = automaton
        .node_id(target_id)
        .ok_or_else(|| WitnessError::DanglingEdge {
            id: target_id.to_string(),
        })?;

    let mut edge = Edge::new(source, target);
    let mut saw_offsets = false;

    for data in edge_elem.children("data") {
        let key = data.attr("key").unwrap_or("");
        let value = data.text();
        match key {
            "assumption" => edge.assumption = value.to_string(),
            "assumption.scope" => edge.assumption_scope = value.to_string(),
            "assumption.resultfunction" => edge.result_function = value.to_string(),
            "control" => {
                edge.control = match value {
                    "condition-true" => Control::ConditionTrue,
                    "condition-false" => Control::ConditionFalse,
                    other => {
                        return Err(WitnessError::InvalidControl {
                            value: other.to_string(),
                        })
                    }
                }
            }
            "startline" => edge.span.start_line = Some(parse_u64(value)?),
            "endline" => edge.span.end_line = Some(parse_u64(value)?),
            "startoffset" => {
                edge.span.start_offset = Some(parse_u64(value)?);
                saw_offsets = true;
            }
            "endoffset" => {
                edge.span.end_offset = Some(parse_u64(value)?);
                saw_offsets = true;
            }
            "enterLoopHead" => edge.enter_loop = parse_bool(key, value)?,
            "enterFunction" => edge.enter_function = value.to_string(),
            "returnFromFunction" | "returnFrom" => {
                edge.return_from_function = value.to_string()
            }
            other => diags.warn(
                "shrike::witness::unknown_key",
                format!("unknown edge data key '{other}'"),
            ),
        }
    }

    // Byte offsets name source regions the replayer cannot line up with
    // instruction positions.
    if saw_offsets {
        automaton.disable_refutation();
    }

    edge.replay = edge.result_function.starts_with(NONDET_PREFIX);
    if edge.replay {
        match skim_result(&edge.assumption) {
            Ok(skim) => {
                if !skim.covers_whole(&edge.assumption) {
                    automaton.disable_refutation();
                }
                edge.result_skim = Some(skim);
            }
            Err(err) => {
                diags.warn(
                    "shrike::witness::replay_assumption",
                    format!("cannot skim replay assumption: {err}"),
                );
                automaton.disable_refutation();
            }
        }
    } else if !edge
        .assumption
        .chars()
        .all(|c| c.is_whitespace() || c == ';')
    {
        // Free-form assumption text on a normal edge cannot be enforced.
        automaton.disable_refutation();
    }

    automaton.push_edge(edge);
    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, WitnessError> {
    match value {
        "true" => Ok(true),
        "false" | "" => Ok(false),
        other => Err(WitnessError::InvalidBool {
            key: key.to_string(),
            value: other.to_string(),
        }),
    }
}

fn parse_u64(value: &str) -> Result<u64, WitnessError> {
    value.trim().parse().map_err(|_| WitnessError::InvalidInteger {
        literal: value.to_string(),
    })
}

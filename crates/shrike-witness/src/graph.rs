use std::fmt;

use indexmap::IndexMap;

use crate::constraint::ResultSkim;
use crate::nondet::ConcreteValue;

/// Index of a node in the automaton arena.
pub type NodeId = usize;
/// Index of an edge in the automaton arena.
pub type EdgeId = usize;

/// Branch direction recorded on a control-flow edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Control {
    #[default]
    Unset,
    ConditionTrue,
    ConditionFalse,
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::Unset => write!(f, "-"),
            Control::ConditionTrue => write!(f, "condition-true"),
            Control::ConditionFalse => write!(f, "condition-false"),
        }
    }
}

/// Source region an edge refers to. Offsets are byte offsets into the
/// program file; their presence disables refutation mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSpan {
    pub start_line: Option<u64>,
    pub end_line: Option<u64>,
    pub start_offset: Option<u64>,
    pub end_offset: Option<u64>,
}

/// A node of the witness automaton.
///
/// Outgoing edges are partitioned: replay edges carry a non-deterministic
/// result assumption, normal edges everything else. Nodes are owned by the
/// automaton arena; edges refer to nodes by id only.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub entry: bool,
    pub sink: bool,
    pub violation: bool,
    pub normal_edges: Vec<EdgeId>,
    pub replay_edges: Vec<EdgeId>,
    pub edges_in: Vec<EdgeId>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Node {
            id: id.into(),
            entry: false,
            sink: false,
            violation: false,
            normal_edges: Vec::new(),
            replay_edges: Vec::new(),
            edges_in: Vec::new(),
        }
    }
}

/// A labeled edge of the witness automaton.
#[derive(Debug, Clone)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    /// Raw assumption text, e.g. `\result == 42;`.
    pub assumption: String,
    pub assumption_scope: String,
    /// Function whose result the assumption constrains
    /// (typically a `__VERIFIER_nondet_*` symbol).
    pub result_function: String,
    /// Skimmed `\result` fragment of the assumption, when present.
    pub result_skim: Option<ResultSkim>,
    pub control: Control,
    pub span: SourceSpan,
    pub enter_loop: bool,
    pub enter_function: String,
    pub return_from_function: String,
    /// True when this edge replays a non-deterministic input.
    pub replay: bool,
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Edge {
            source,
            target,
            assumption: String::new(),
            assumption_scope: String::new(),
            result_function: String::new(),
            result_skim: None,
            control: Control::Unset,
            span: SourceSpan::default(),
            enter_loop: false,
            enter_function: String::new(),
            return_from_function: String::new(),
            replay: false,
        }
    }
}

/// Graph-level metadata carried by the witness document.
#[derive(Debug, Clone, Default)]
pub struct GraphMetadata {
    pub producer: String,
    pub specification: String,
    pub program_file: String,
    pub program_hash: String,
    pub architecture: String,
    pub creation_time: String,
}

/// One concrete non-deterministic value on the replay tape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapeEntry {
    pub function: String,
    pub line: u64,
    pub ordinal: u32,
    pub value: ConcreteValue,
}

/// The graph-dialect witness body.
///
/// Nodes and edges live in index-keyed arenas; the `by_id` map resolves the
/// document's textual node ids. The replay tape and the determinism flag are
/// produced by normalization.
#[derive(Debug, Clone)]
pub struct WitnessAutomaton {
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) by_id: IndexMap<String, NodeId>,
    pub(crate) entry: NodeId,
    pub metadata: GraphMetadata,
    pub(crate) refutation_supported: bool,
    pub(crate) deterministic: bool,
    pub(crate) tape: Vec<TapeEntry>,
}

impl WitnessAutomaton {
    pub fn new(metadata: GraphMetadata) -> Self {
        WitnessAutomaton {
            nodes: Vec::new(),
            edges: Vec::new(),
            by_id: IndexMap::new(),
            entry: 0,
            metadata,
            refutation_supported: true,
            deterministic: false,
            tape: Vec::new(),
        }
    }

    /// Insert a node; the caller has already checked the id is fresh.
    pub(crate) fn push_node(&mut self, node: Node) -> NodeId {
        let id = self.nodes.len();
        self.by_id.insert(node.id.clone(), id);
        self.nodes.push(node);
        id
    }

    /// Insert an edge and wire both endpoints.
    pub(crate) fn push_edge(&mut self, edge: Edge) -> EdgeId {
        let id = self.edges.len();
        let (source, target, replay) = (edge.source, edge.target, edge.replay);
        self.edges.push(edge);
        if replay {
            self.nodes[source].replay_edges.push(id);
        } else {
            self.nodes[source].normal_edges.push(id);
        }
        self.nodes[target].edges_in.push(id);
        id
    }

    pub fn node_id(&self, id: &str) -> Option<NodeId> {
        self.by_id.get(id).copied()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    pub fn entry(&self) -> NodeId {
        self.entry
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate()
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter().enumerate()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn violations(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.violation)
            .map(|(id, _)| id)
            .collect()
    }

    /// Whether a single deterministic replay path exists (set by
    /// normalization).
    pub fn deterministic(&self) -> bool {
        self.deterministic
    }

    /// Ordered replay tape; empty unless the witness is deterministic.
    pub fn tape(&self) -> &[TapeEntry] {
        &self.tape
    }

    /// Whether refutation mode is still available for this witness.
    pub fn refutation_supported(&self) -> bool {
        self.refutation_supported
    }

    pub(crate) fn disable_refutation(&mut self) {
        self.refutation_supported = false;
    }
}

impl fmt::Display for WitnessAutomaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Witness automaton:")?;
        writeln!(f, "  Producer: {}", self.metadata.producer)?;
        writeln!(f, "  Program: {}", self.metadata.program_file)?;
        writeln!(
            f,
            "  Nodes: {} ({} violation), Edges: {}",
            self.node_count(),
            self.violations().len(),
            self.edge_count()
        )?;
        writeln!(f, "  Deterministic replay: {}", self.deterministic)?;
        for (i, n) in self.nodes() {
            let mut flags = String::new();
            if n.entry {
                flags.push_str(" entry");
            }
            if n.sink {
                flags.push_str(" sink");
            }
            if n.violation {
                flags.push_str(" violation");
            }
            writeln!(f, "    N{i}: {}{flags}", n.id)?;
        }
        for (i, e) in self.edges() {
            let kind = if e.replay { "replay" } else { "normal" };
            writeln!(
                f,
                "    E{i}: N{} -> N{} ({kind}, control={})",
                e.source, e.target, e.control
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_edge_wires_partitions_and_reverse_lists() {
        let mut automaton = WitnessAutomaton::new(GraphMetadata::default());
        let a = automaton.push_node(Node::new("A"));
        let b = automaton.push_node(Node::new("B"));

        let normal = automaton.push_edge(Edge::new(a, b));
        let mut replay_edge = Edge::new(a, b);
        replay_edge.replay = true;
        let replay = automaton.push_edge(replay_edge);

        assert_eq!(automaton.node(a).normal_edges, vec![normal]);
        assert_eq!(automaton.node(a).replay_edges, vec![replay]);
        assert_eq!(automaton.node(b).edges_in, vec![normal, replay]);
        assert_eq!(automaton.node_id("B"), Some(b));
        assert_eq!(automaton.node_id("C"), None);
    }

    #[test]
    fn violations_lists_flagged_nodes() {
        let mut automaton = WitnessAutomaton::new(GraphMetadata::default());
        automaton.push_node(Node::new("A"));
        let mut v = Node::new("V");
        v.violation = true;
        let vid = automaton.push_node(v);
        assert_eq!(automaton.violations(), vec![vid]);
    }

    #[test]
    fn fresh_automaton_has_no_tape() {
        let automaton = WitnessAutomaton::new(GraphMetadata::default());
        assert!(!automaton.deterministic());
        assert!(automaton.tape().is_empty());
        assert!(automaton.refutation_supported());
    }
}

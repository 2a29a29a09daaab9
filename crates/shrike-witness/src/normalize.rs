use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;

use crate::constraint::Comparator;
use crate::errors::Diagnostics;
use crate::graph::{Edge, EdgeId, Node, NodeId, TapeEntry, WitnessAutomaton};
use crate::nondet::nondet_value;

impl WitnessAutomaton {
    /// Prune the automaton to the violation-reaching subgraph, decide
    /// whether a single deterministic replay path exists, and extract the
    /// replay tape.
    ///
    /// Normalizing an already-normalized automaton is a no-op: the pruned
    /// graph contains only reaching nodes, and the determinism verdict and
    /// tape are recomputed to the same values.
    pub fn normalize(&mut self, diags: &mut Diagnostics) {
        let violations = self.violations();

        // Reverse reachability over both edge partitions. A node rediscovered
        // through a second predecessor means more than one path reaches a
        // violation.
        let mut reaching: HashSet<NodeId> = HashSet::new();
        let mut multiple = false;
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        for &v in &violations {
            reaching.insert(v);
            queue.push_back(v);
        }
        while let Some(n) = queue.pop_front() {
            for &e in &self.nodes[n].edges_in {
                let source = self.edges[e].source;
                if reaching.insert(source) {
                    queue.push_back(source);
                } else {
                    multiple = true;
                }
            }
        }

        let mut deterministic = violations.len() == 1 && !multiple;

        // Forward walk from the entry. Edges into non-reaching targets are
        // cut; a second path into a visited node drops determinism; replay
        // edges feed the tape while determinism still holds.
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut tape: Vec<TapeEntry> = Vec::new();
        visited.insert(self.entry);
        let mut queue = VecDeque::from([self.entry]);
        while let Some(n) = queue.pop_front() {
            let outgoing: Vec<EdgeId> = self.nodes[n]
                .normal_edges
                .iter()
                .chain(self.nodes[n].replay_edges.iter())
                .copied()
                .collect();
            for e in outgoing {
                let target = self.edges[e].target;
                if !reaching.contains(&target) {
                    continue;
                }
                if !visited.insert(target) {
                    deterministic = false;
                    continue;
                }
                queue.push_back(target);
                if self.edges[e].replay && deterministic {
                    match replay_entry(&self.edges[e], diags) {
                        Some(entry) => tape.push(entry),
                        None => deterministic = false,
                    }
                }
            }
        }

        self.rebuild(&visited, &reaching);
        self.deterministic = deterministic;
        self.tape = if deterministic { tape } else { Vec::new() };
    }

    /// Rebuild the arenas keeping only visited nodes and edges whose target
    /// still reaches a violation. Rebuilding instead of unlinking in place
    /// keeps ids dense and is trivially safe on cyclic witnesses.
    fn rebuild(&mut self, visited: &HashSet<NodeId>, reaching: &HashSet<NodeId>) {
        let mut remap: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        let mut nodes: Vec<Node> = Vec::new();
        let mut by_id: IndexMap<String, NodeId> = IndexMap::new();

        for (old_id, node) in self.nodes.iter().enumerate() {
            if !visited.contains(&old_id) {
                continue;
            }
            let new_id = nodes.len();
            remap[old_id] = Some(new_id);
            let mut kept = node.clone();
            kept.normal_edges.clear();
            kept.replay_edges.clear();
            kept.edges_in.clear();
            by_id.insert(kept.id.clone(), new_id);
            nodes.push(kept);
        }

        let mut edges: Vec<Edge> = Vec::new();
        for edge in &self.edges {
            let (Some(source), Some(target)) = (remap[edge.source], remap[edge.target]) else {
                continue;
            };
            if !reaching.contains(&edge.target) {
                continue;
            }
            let id = edges.len();
            let mut kept = edge.clone();
            kept.source = source;
            kept.target = target;
            if kept.replay {
                nodes[source].replay_edges.push(id);
            } else {
                nodes[source].normal_edges.push(id);
            }
            nodes[target].edges_in.push(id);
            edges.push(kept);
        }

        self.entry = remap[self.entry].expect("entry survives normalization");
        self.nodes = nodes;
        self.edges = edges;
        self.by_id = by_id;
    }
}

/// Turn a replay edge into a tape entry, or `None` when the edge cannot be
/// replayed deterministically.
fn replay_entry(edge: &Edge, diags: &mut Diagnostics) -> Option<TapeEntry> {
    let Some(skim) = edge.result_skim.as_ref() else {
        return None;
    };
    if skim.op != Comparator::Eq {
        diags.warn(
            "shrike::witness::ambiguous_replay",
            format!(
                "replay assumption '{}' constrains but does not fix the result",
                edge.assumption
            ),
        );
        return None;
    }
    let Some(line) = edge.span.start_line else {
        diags.warn(
            "shrike::witness::ambiguous_replay",
            format!("replay edge for {} has no startline", edge.result_function),
        );
        return None;
    };
    match nondet_value(&edge.result_function, &skim.literal).known() {
        Some(value) => Some(TapeEntry {
            function: edge.result_function.clone(),
            line,
            ordinal: 0,
            value,
        }),
        None => {
            diags.warn(
                "shrike::witness::ambiguous_replay",
                format!(
                    "cannot interpret replay value '{}' for {}",
                    skim.literal, edge.result_function
                ),
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::skim_result;
    use crate::graph::GraphMetadata;

    struct Builder {
        automaton: WitnessAutomaton,
    }

    impl Builder {
        fn new() -> Self {
            Builder {
                automaton: WitnessAutomaton::new(GraphMetadata::default()),
            }
        }

        fn node(&mut self, id: &str, entry: bool, violation: bool) -> NodeId {
            let mut node = Node::new(id);
            node.entry = entry;
            node.violation = violation;
            let nid = self.automaton.push_node(node);
            if entry {
                self.automaton.entry = nid;
            }
            nid
        }

        fn edge(&mut self, source: NodeId, target: NodeId) {
            self.automaton.push_edge(Edge::new(source, target));
        }

        fn replay_edge(&mut self, source: NodeId, target: NodeId, function: &str, text: &str, line: u64) {
            let mut edge = Edge::new(source, target);
            edge.result_function = function.to_string();
            edge.assumption = text.to_string();
            edge.result_skim = skim_result(text).ok();
            edge.span.start_line = Some(line);
            edge.replay = true;
            self.automaton.push_edge(edge);
        }

        fn normalized(mut self) -> (WitnessAutomaton, Diagnostics) {
            let mut diags = Diagnostics::new();
            self.automaton.normalize(&mut diags);
            (self.automaton, diags)
        }
    }

    #[test]
    fn prunes_branches_that_cannot_reach_a_violation() {
        let mut b = Builder::new();
        let entry = b.node("entry", true, false);
        let n1 = b.node("n1", false, false);
        let v = b.node("v", false, true);
        let dead = b.node("dead", false, false);
        b.edge(entry, n1);
        b.edge(n1, v);
        b.edge(entry, dead);

        let (automaton, _) = b.normalized();
        assert_eq!(automaton.node_count(), 3);
        assert!(automaton.node_id("dead").is_none());
        assert_eq!(automaton.node(automaton.entry()).normal_edges.len(), 1);
        assert!(automaton.deterministic());
    }

    #[test]
    fn every_surviving_node_reaches_a_violation() {
        let mut b = Builder::new();
        let entry = b.node("entry", true, false);
        let v = b.node("v", false, true);
        let dead1 = b.node("dead1", false, false);
        let dead2 = b.node("dead2", false, false);
        b.edge(entry, v);
        b.edge(entry, dead1);
        b.edge(dead1, dead2);

        let (automaton, _) = b.normalized();
        for (id, _) in automaton.nodes() {
            // Walk forward from every node; a violation must be reachable.
            let mut seen = HashSet::from([id]);
            let mut queue = VecDeque::from([id]);
            let mut hits_violation = false;
            while let Some(n) = queue.pop_front() {
                if automaton.node(n).violation {
                    hits_violation = true;
                    break;
                }
                for &e in automaton
                    .node(n)
                    .normal_edges
                    .iter()
                    .chain(automaton.node(n).replay_edges.iter())
                {
                    let t = automaton.edge(e).target;
                    if seen.insert(t) {
                        queue.push_back(t);
                    }
                }
            }
            assert!(hits_violation, "node {id} cannot reach a violation");
        }
    }

    #[test]
    fn deterministic_chain_publishes_the_tape() {
        let mut b = Builder::new();
        let entry = b.node("entry", true, false);
        let n1 = b.node("n1", false, false);
        let v = b.node("v", false, true);
        b.edge(entry, n1);
        b.replay_edge(n1, v, "__VERIFIER_nondet_int", "\\result == 42;", 7);

        let (automaton, _) = b.normalized();
        assert!(automaton.deterministic());
        let tape = automaton.tape();
        assert_eq!(tape.len(), 1);
        assert_eq!(tape[0].function, "__VERIFIER_nondet_int");
        assert_eq!(tape[0].line, 7);
        assert_eq!(tape[0].ordinal, 0);
        assert_eq!(tape[0].value.bits, 42);
        assert_eq!(tape[0].value.width, 32);
    }

    #[test]
    fn two_violations_downgrade_determinism_but_load_survives() {
        let mut b = Builder::new();
        let entry = b.node("entry", true, false);
        let v1 = b.node("v1", false, true);
        let v2 = b.node("v2", false, true);
        b.edge(entry, v1);
        b.edge(entry, v2);

        let (automaton, _) = b.normalized();
        assert!(!automaton.deterministic());
        assert!(automaton.tape().is_empty());
        assert_eq!(automaton.node_count(), 3);
    }

    #[test]
    fn diamond_paths_downgrade_determinism() {
        let mut b = Builder::new();
        let entry = b.node("entry", true, false);
        let a = b.node("a", false, false);
        let c = b.node("c", false, false);
        let v = b.node("v", false, true);
        b.edge(entry, a);
        b.edge(entry, c);
        b.edge(a, v);
        b.edge(c, v);

        let (automaton, _) = b.normalized();
        assert!(!automaton.deterministic());
        assert_eq!(automaton.node_count(), 4);
    }

    #[test]
    fn unknown_replay_function_downgrades_without_failing() {
        let mut b = Builder::new();
        let entry = b.node("entry", true, false);
        let v = b.node("v", false, true);
        b.replay_edge(entry, v, "__VERIFIER_nondet_widget", "\\result == 1;", 3);

        let (automaton, diags) = b.normalized();
        assert!(!automaton.deterministic());
        assert!(automaton.tape().is_empty());
        assert!(diags.contains_code("shrike::witness::ambiguous_replay"));
    }

    #[test]
    fn non_equality_replay_constraint_downgrades() {
        let mut b = Builder::new();
        let entry = b.node("entry", true, false);
        let v = b.node("v", false, true);
        b.replay_edge(entry, v, "__VERIFIER_nondet_int", "\\result >= 1;", 3);

        let (automaton, diags) = b.normalized();
        assert!(!automaton.deterministic());
        assert!(diags.contains_code("shrike::witness::ambiguous_replay"));
    }

    #[test]
    fn cyclic_witnesses_normalize_without_diverging() {
        let mut b = Builder::new();
        let entry = b.node("entry", true, false);
        let a = b.node("a", false, false);
        let c = b.node("c", false, false);
        let v = b.node("v", false, true);
        b.edge(entry, a);
        b.edge(a, c);
        b.edge(c, a); // cycle
        b.edge(c, v);

        let (automaton, _) = b.normalized();
        assert_eq!(automaton.node_count(), 4);
        assert!(!automaton.deterministic()); // the cycle revisits `a`
    }

    #[test]
    fn normalization_is_idempotent() {
        let mut b = Builder::new();
        let entry = b.node("entry", true, false);
        let n1 = b.node("n1", false, false);
        let v = b.node("v", false, true);
        let dead = b.node("dead", false, false);
        b.edge(entry, n1);
        b.replay_edge(n1, v, "__VERIFIER_nondet_int", "\\result == 5;", 9);
        b.edge(entry, dead);

        let (mut automaton, _) = b.normalized();
        let nodes_before = automaton.node_count();
        let edges_before = automaton.edge_count();
        let tape_before = automaton.tape().to_vec();
        let deterministic_before = automaton.deterministic();

        automaton.normalize(&mut Diagnostics::new());
        assert_eq!(automaton.node_count(), nodes_before);
        assert_eq!(automaton.edge_count(), edges_before);
        assert_eq!(automaton.tape(), tape_before.as_slice());
        assert_eq!(automaton.deterministic(), deterministic_before);
    }
}

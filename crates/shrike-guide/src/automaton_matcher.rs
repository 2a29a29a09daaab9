use shrike_witness::{Control, Edge, NodeId, WitnessAutomaton};

use crate::cursor::{Cursor, Opcode};

/// Monitor over a graph-dialect witness automaton.
///
/// The current node advances along normal edges whose predicates match the
/// instruction; when nothing matches the step is simply ignored. Replay
/// edges are consulted by the tape, not by the monitor.
#[derive(Debug)]
pub struct AutomatonMatcher<'w> {
    automaton: &'w WitnessAutomaton,
    current: NodeId,
}

impl<'w> AutomatonMatcher<'w> {
    pub fn new(automaton: &'w WitnessAutomaton) -> Self {
        AutomatonMatcher {
            automaton,
            current: automaton.entry(),
        }
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn violation_reached(&self) -> bool {
        self.automaton.node(self.current).violation
    }

    /// Advance along the first matching normal edge. Returns whether the
    /// monitor moved.
    pub fn step(&mut self, cursor: &Cursor<'_>) -> bool {
        let node = self.automaton.node(self.current);
        for &e in &node.normal_edges {
            let edge = self.automaton.edge(e);
            if self.edge_matches(edge, cursor) {
                self.current = edge.target;
                return true;
            }
        }
        false
    }

    /// Allowed branch directions at `line`, derived from the control
    /// attributes of the current node's outgoing edges. With no matching
    /// control edge both directions stay open.
    pub fn condition_constraint(&self, line: u64) -> (bool, bool) {
        let node = self.automaton.node(self.current);
        let mut any = false;
        let mut allow_true = false;
        let mut allow_false = false;
        for &e in &node.normal_edges {
            let edge = self.automaton.edge(e);
            if edge.span.start_line != Some(line) {
                continue;
            }
            match edge.control {
                Control::ConditionTrue => {
                    any = true;
                    allow_true = true;
                }
                Control::ConditionFalse => {
                    any = true;
                    allow_false = true;
                }
                Control::Unset => {}
            }
        }
        if any {
            (allow_true, allow_false)
        } else {
            (true, true)
        }
    }

    /// The replay edge leaving the current node for a call to `callee` at
    /// `line`, if any.
    pub fn replay_edge_for(&self, cursor: &Cursor<'_>) -> Option<&'w Edge> {
        let callee = cursor.callee?;
        let node = self.automaton.node(self.current);
        node.replay_edges
            .iter()
            .map(|&e| self.automaton.edge(e))
            .find(|edge| {
                edge.result_function == callee
                    && (edge.span.start_line.is_none() || edge.span.start_line == Some(cursor.line))
            })
    }

    /// Advance over a replay edge once its value was consumed.
    pub fn step_replay(&mut self, cursor: &Cursor<'_>) -> bool {
        let node = self.automaton.node(self.current);
        for &e in &node.replay_edges {
            let edge = self.automaton.edge(e);
            if Some(edge.result_function.as_str()) == cursor.callee
                && (edge.span.start_line.is_none() || edge.span.start_line == Some(cursor.line))
            {
                self.current = edge.target;
                return true;
            }
        }
        false
    }

    fn edge_matches(&self, edge: &Edge, cursor: &Cursor<'_>) -> bool {
        // The graph dialect checks files: instruction positions outside the
        // witnessed program file never match.
        let program_file = &self.automaton.metadata.program_file;
        if !program_file.is_empty() && !cursor.file.is_empty() && program_file != cursor.file {
            return false;
        }
        if let Some(line) = edge.span.start_line {
            if line != cursor.line {
                return false;
            }
        }
        match edge.control {
            Control::ConditionTrue => {
                if cursor.opcode != Opcode::Branch || cursor.branch_taken != Some(true) {
                    return false;
                }
            }
            Control::ConditionFalse => {
                if cursor.opcode != Opcode::Branch || cursor.branch_taken != Some(false) {
                    return false;
                }
            }
            Control::Unset => {}
        }
        if !edge.enter_function.is_empty()
            && (cursor.opcode != Opcode::Call
                || cursor.callee != Some(edge.enter_function.as_str()))
        {
            return false;
        }
        if !edge.return_from_function.is_empty() {
            if cursor.opcode != Opcode::Return {
                return false;
            }
            if let Some(function) = cursor.function {
                if function != edge.return_from_function {
                    return false;
                }
            }
        }
        true
    }
}

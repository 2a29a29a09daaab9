use shrike_expr::Expr;
use shrike_witness::{
    ConcreteValue, Diagnostics, ErrorWitness, ReturnConstraint, WitnessBody, WitnessError,
    NONDET_PREFIX,
};

use crate::automaton_matcher::AutomatonMatcher;
use crate::cursor::{Cursor, Opcode};
use crate::sequence_matcher::SequenceMatcher;
use crate::tape::ReplayTape;

/// What the executor may and must do at the current instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepGuidance {
    /// Whether the true branch direction may be taken.
    pub allow_true: bool,
    /// Whether the false branch direction may be taken.
    pub allow_false: bool,
    /// Constraint to assume over the instruction's return value.
    pub return_constraint: Option<ReturnConstraint>,
    /// Concrete value to inject for a non-deterministic call.
    pub replay_value: Option<ConcreteValue>,
    /// The witness's error location has been reached.
    pub target_reached: bool,
}

impl StepGuidance {
    fn open() -> Self {
        StepGuidance {
            allow_true: true,
            allow_false: true,
            return_constraint: None,
            replay_value: None,
            target_reached: false,
        }
    }

    /// The return constraint as a predicate over the executor's return
    /// expression, when one applies.
    pub fn return_predicate(&self, left: &Expr) -> Option<Expr> {
        self.return_constraint.as_ref().map(|c| c.to_predicate(left))
    }
}

enum State<'w> {
    Sequence(SequenceMatcher<'w>),
    Automaton {
        matcher: AutomatonMatcher<'w>,
        tape: ReplayTape<'w>,
        diagnostics: Diagnostics,
    },
}

/// The step hook the executor drives once per instruction.
///
/// Borrows the witness read-only; all mutable matching state (the active
/// segment, the monitor node, the tape position) lives here and is confined
/// to the executor thread.
pub struct Guidance<'w> {
    state: State<'w>,
}

impl<'w> Guidance<'w> {
    pub fn new(witness: &'w ErrorWitness) -> Self {
        let state = match &witness.body {
            WitnessBody::Sequence(segments) => State::Sequence(SequenceMatcher::new(segments)),
            WitnessBody::Automaton(automaton) => State::Automaton {
                matcher: AutomatonMatcher::new(automaton),
                tape: ReplayTape::new(automaton.tape()),
                diagnostics: Diagnostics::new(),
            },
        };
        Guidance { state }
    }

    /// Advisory diagnostics emitted by matching so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        match &self.state {
            State::Sequence(matcher) => matcher.diagnostics(),
            State::Automaton { diagnostics, .. } => diagnostics,
        }
    }

    /// Answer the four queries for the instruction under the cursor and
    /// update the matching state.
    pub fn advance(&mut self, cursor: &Cursor<'_>) -> Result<StepGuidance, WitnessError> {
        match &mut self.state {
            State::Sequence(matcher) => Self::advance_sequence(matcher, cursor),
            State::Automaton {
                matcher,
                tape,
                diagnostics,
            } => Self::advance_automaton(matcher, tape, diagnostics, cursor),
        }
    }

    /// The switch arm value demanded by the witness, for `Switch` steps.
    pub fn switch_value(&self) -> Result<Option<i64>, WitnessError> {
        match &self.state {
            State::Sequence(matcher) => matcher.switch_value(),
            State::Automaton { .. } => Ok(None),
        }
    }

    fn advance_sequence(
        matcher: &mut SequenceMatcher<'w>,
        cursor: &Cursor<'_>,
    ) -> Result<StepGuidance, WitnessError> {
        let mut guidance = StepGuidance::open();

        let avoided = matcher.check_avoid(cursor);
        if cursor.opcode == Opcode::Branch {
            let (allow_true, allow_false) =
                matcher.condition_constraint(cursor.line, cursor.column)?;
            guidance.allow_true = allow_true;
            guidance.allow_false = allow_false;
        } else if !avoided.is_empty() {
            // A matched avoid waypoint prohibits this step outright.
            guidance.allow_true = false;
            guidance.allow_false = false;
        }

        guidance.return_constraint = matcher.follow_return_constraint(cursor)?;

        if matcher.match_target(cursor.line, cursor.column) {
            guidance.target_reached = true;
        }

        matcher.observe(cursor);
        Ok(guidance)
    }

    fn advance_automaton(
        matcher: &mut AutomatonMatcher<'w>,
        tape: &mut ReplayTape<'w>,
        diagnostics: &mut Diagnostics,
        cursor: &Cursor<'_>,
    ) -> Result<StepGuidance, WitnessError> {
        let mut guidance = StepGuidance::open();

        if cursor.opcode == Opcode::Branch {
            let (allow_true, allow_false) = matcher.condition_constraint(cursor.line);
            guidance.allow_true = allow_true;
            guidance.allow_false = allow_false;
        }

        let nondet_call = cursor.opcode == Opcode::Call
            && cursor.callee.is_some_and(|c| c.starts_with(NONDET_PREFIX));
        if nondet_call {
            if let Some(edge) = matcher.replay_edge_for(cursor) {
                if let Some(skim) = edge.result_skim.as_ref() {
                    guidance.return_constraint =
                        ReturnConstraint::from_skim(skim, diagnostics).ok();
                }
            }
            if let Some(callee) = cursor.callee {
                guidance.replay_value = tape.next(callee, cursor.line);
            }
            matcher.step_replay(cursor);
        } else {
            matcher.step(cursor);
        }

        guidance.target_reached = matcher.violation_reached();
        Ok(guidance)
    }
}

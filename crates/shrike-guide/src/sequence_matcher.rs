use std::collections::BTreeSet;

use shrike_expr::Expr;
use shrike_witness::{
    Diagnostics, ReturnConstraint, Segment, Waypoint, WaypointKind, WitnessError,
};

use crate::cursor::{Cursor, Opcode};

/// Matcher over a sequence-dialect witness.
///
/// Tracks the active segment (the first whose follow has not fired yet) and
/// answers the per-instruction queries. The sequence dialect matches on line
/// and column only; file names are ignored.
#[derive(Debug)]
pub struct SequenceMatcher<'w> {
    segments: &'w [Segment],
    active: usize,
    diagnostics: Diagnostics,
}

impl<'w> SequenceMatcher<'w> {
    pub fn new(segments: &'w [Segment]) -> Self {
        SequenceMatcher {
            segments,
            active: 0,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_segment(&self) -> Option<&'w Segment> {
        self.segments.get(self.active)
    }

    /// Advisory diagnostics emitted by matching so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Does `waypoint` match the instruction under the cursor?
    pub fn waypoint_matches(waypoint: &Waypoint, cursor: &Cursor<'_>) -> bool {
        if waypoint.kind != WaypointKind::Target
            && !waypoint.loc.matches(cursor.line, cursor.column)
        {
            return false;
        }
        match waypoint.kind {
            WaypointKind::Branch => cursor.opcode == Opcode::Branch,
            WaypointKind::Enter => {
                cursor.opcode == Opcode::Call
                    && cursor.previous != Some(Opcode::Return)
                    && (waypoint.loc.identifier.is_empty()
                        || cursor.callee == Some(waypoint.loc.identifier.as_str()))
            }
            // The cursor may already sit on the caller after the callee
            // returned; the prior opcode still identifies the return.
            WaypointKind::Return => {
                cursor.opcode == Opcode::Return || cursor.previous == Some(Opcode::Return)
            }
            WaypointKind::Assume | WaypointKind::Target => false,
        }
    }

    /// Indices into the active segment's avoid list whose waypoints match
    /// the instruction. A match prohibits the step but never advances the
    /// segment.
    pub fn check_avoid(&self, cursor: &Cursor<'_>) -> BTreeSet<usize> {
        let Some(segment) = self.active_segment() else {
            return BTreeSet::new();
        };
        segment
            .avoid
            .iter()
            .enumerate()
            .filter(|(_, wp)| Self::waypoint_matches(wp, cursor))
            .map(|(i, _)| i)
            .collect()
    }

    /// Allowed branch directions `(may_take_true, may_take_false)` at the
    /// given position.
    ///
    /// The follow waypoint forces one side, avoid waypoints mask sides;
    /// conflicting directions block both and emit a warning.
    pub fn condition_constraint(
        &mut self,
        line: u64,
        column: u64,
    ) -> Result<(bool, bool), WitnessError> {
        let Some(segment) = self.segments.get(self.active) else {
            return Ok((true, true));
        };

        let mut go_true = true;
        let mut go_false = true;
        if segment.follow.kind == WaypointKind::Branch && segment.follow.loc.matches(line, column) {
            let value = segment.follow.branch_value()?;
            go_true = value;
            go_false = !value;
        }

        let mut avoid_true = !go_true;
        let mut avoid_false = !go_false;
        for waypoint in &segment.avoid {
            if waypoint.kind != WaypointKind::Branch || !waypoint.loc.matches(line, column) {
                continue;
            }
            let value = waypoint.branch_value()?;
            if (!go_true && !value) || (!go_false && value) {
                self.diagnostics.warn(
                    "shrike::guide::conflicting_branch",
                    "conflicting branching info in segment",
                );
                return Ok((false, false));
            }
            avoid_true = avoid_true || value;
            avoid_false = avoid_false || !value;
        }

        Ok((!avoid_true, !avoid_false))
    }

    /// The parsed return constraint of the active follow waypoint, when it
    /// is a Return waypoint matching the cursor and carries a `\result`
    /// constraint.
    pub fn follow_return_constraint(
        &mut self,
        cursor: &Cursor<'_>,
    ) -> Result<Option<ReturnConstraint>, WitnessError> {
        let Some(segment) = self.segments.get(self.active) else {
            return Ok(None);
        };
        if segment.follow.kind != WaypointKind::Return
            || !Self::waypoint_matches(&segment.follow, cursor)
            || segment.follow.constraint == "true"
        {
            return Ok(None);
        }
        ReturnConstraint::parse(&segment.follow.constraint, &mut self.diagnostics).map(Some)
    }

    /// Convenience: the follow return constraint as a predicate over the
    /// executor's return expression.
    pub fn return_predicate(
        &mut self,
        cursor: &Cursor<'_>,
        left: &Expr,
    ) -> Result<Option<Expr>, WitnessError> {
        Ok(self
            .follow_return_constraint(cursor)?
            .map(|c| c.to_predicate(left)))
    }

    /// The switch arm value demanded by the active follow waypoint.
    pub fn switch_value(&self) -> Result<Option<i64>, WitnessError> {
        match self.active_segment() {
            Some(segment) if segment.follow.kind != WaypointKind::Target => {
                segment.follow.switch_value().map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Whether the error location falls inside the final target region.
    /// Only meaningful once the last segment is active.
    pub fn match_target(&self, line: u64, column: u64) -> bool {
        match self.active_segment() {
            Some(segment) if self.active == self.segments.len() - 1 => {
                segment.follow.target_contains(line, column)
            }
            _ => false,
        }
    }

    /// Advance to the next segment when the instruction matches the active
    /// follow waypoint. Returns true when the segment was consumed.
    pub fn observe(&mut self, cursor: &Cursor<'_>) -> bool {
        let Some(segment) = self.segments.get(self.active) else {
            return false;
        };
        if Self::waypoint_matches(&segment.follow, cursor) {
            self.active += 1;
            return true;
        }
        false
    }
}

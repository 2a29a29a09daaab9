use std::fmt;

use crate::constraint::parse_i64_auto;
use crate::errors::WitnessError;

/// A source position a waypoint refers to.
///
/// `column == 0` means "any column"; an empty `file` matches any file (the
/// sequence dialect does not check files at all, the graph dialect does).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: u64,
    pub column: u64,
    pub identifier: String,
}

impl Location {
    /// Point match against an instruction position.
    pub fn matches(&self, line: u64, column: u64) -> bool {
        line == self.line && (self.column == 0 || column == self.column)
    }

    pub fn matches_file(&self, file: &str) -> bool {
        self.file.is_empty() || self.file == file
    }
}

/// Kind of a sequence-dialect waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaypointKind {
    Assume,
    Branch,
    Return,
    Enter,
    Target,
}

impl fmt::Display for WaypointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaypointKind::Assume => write!(f, "assumption"),
            WaypointKind::Branch => write!(f, "branching"),
            WaypointKind::Return => write!(f, "function_return"),
            WaypointKind::Enter => write!(f, "function_enter"),
            WaypointKind::Target => write!(f, "target"),
        }
    }
}

/// A single waypoint: a program point the execution must follow or avoid.
///
/// Target waypoints may carry a second location, turning the point into a
/// source region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Waypoint {
    pub kind: WaypointKind,
    pub loc: Location,
    pub loc2: Option<Location>,
    pub constraint: String,
}

impl Waypoint {
    pub fn new(kind: WaypointKind, loc: Location) -> Self {
        Waypoint {
            kind,
            loc,
            loc2: None,
            constraint: "true".to_string(),
        }
    }

    /// Interpret the constraint of a branching waypoint.
    pub fn branch_value(&self) -> Result<bool, WitnessError> {
        match self.constraint.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(WitnessError::InvalidBranchValue {
                value: other.to_string(),
            }),
        }
    }

    /// Interpret the constraint of a follow waypoint at a switch.
    ///
    /// The whole constraint must parse as one integer.
    pub fn switch_value(&self) -> Result<i64, WitnessError> {
        match parse_i64_auto(&self.constraint) {
            Some((value, consumed)) if consumed == self.constraint.len() => Ok(value),
            _ => Err(WitnessError::InvalidInteger {
                literal: self.constraint.clone(),
            }),
        }
    }

    /// Whether an error location falls inside this target's source region.
    ///
    /// With a single location this is a point match. With two locations the
    /// region spans from `loc` to `loc2`: points strictly between the lines
    /// match unconditionally, the boundary lines are bounded by the
    /// respective columns, and a zero end column leaves the range open on
    /// the right.
    pub fn target_contains(&self, line: u64, column: u64) -> bool {
        if self.kind != WaypointKind::Target {
            return false;
        }
        let Some(loc2) = self.loc2.as_ref() else {
            return self.loc.matches(line, column);
        };

        if self.loc.line == loc2.line {
            return line == self.loc.line
                && column >= self.loc.column
                && (loc2.column == 0 || column <= loc2.column);
        }
        if line == self.loc.line {
            return column >= self.loc.column;
        }
        if line == loc2.line {
            return loc2.column == 0 || column <= loc2.column;
        }
        line > self.loc.line && line < loc2.line
    }
}

/// One segment of the witness: a set of waypoints to avoid while driving
/// toward the one waypoint to follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub avoid: Vec<Waypoint>,
    pub follow: Waypoint,
}

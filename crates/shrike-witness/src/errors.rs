use miette::Diagnostic;
use thiserror::Error;

use shrike_doc::DocError;

/// Fatal witness-load or query failure.
///
/// There is no process-terminating helper anywhere in the core: structural,
/// semantic and lexical problems surface as `Err` and the host decides what
/// to do with them. Advisory conditions go through [`Diagnostics`] instead.
#[derive(Debug, Error, Diagnostic)]
pub enum WitnessError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Doc(#[from] DocError),

    // --- structural ---
    #[error("missing <{element}> element")]
    #[diagnostic(code(shrike::witness::missing_element))]
    MissingElement { element: String },

    #[error("duplicate node id '{id}'")]
    #[diagnostic(code(shrike::witness::duplicate_node))]
    DuplicateNode { id: String },

    #[error("edge references unknown node '{id}'")]
    #[diagnostic(code(shrike::witness::dangling_edge))]
    DanglingEdge { id: String },

    #[error("witness has {count} entry nodes, expected exactly one")]
    #[diagnostic(code(shrike::witness::entry_count))]
    EntryCount { count: usize },

    #[error("witness has no violation node")]
    #[diagnostic(code(shrike::witness::no_violation))]
    NoViolation,

    #[error("witness carries no specification")]
    #[diagnostic(code(shrike::witness::missing_specification))]
    MissingSpecification,

    #[error("specification matches no known property: {specification:?}")]
    #[diagnostic(code(shrike::witness::unknown_specification))]
    UnknownSpecification { specification: String },

    #[error("invalid specification: missing error function")]
    #[diagnostic(code(shrike::witness::missing_error_function))]
    MissingErrorFunction,

    #[error("top-level sequence must contain exactly one entry, got {count}")]
    #[diagnostic(code(shrike::witness::entry_list))]
    EntryListShape { count: usize },

    #[error("witness contains no segments")]
    #[diagnostic(code(shrike::witness::no_segments))]
    NoSegments,

    #[error("target waypoint may only appear as the final segment's follow")]
    #[diagnostic(code(shrike::witness::misplaced_target))]
    MisplacedTarget,

    #[error("the final segment's follow waypoint must be a target")]
    #[diagnostic(code(shrike::witness::missing_target))]
    MissingTarget,

    #[error("segment must end with its single waypoint of action 'follow'")]
    #[diagnostic(code(shrike::witness::follow_position))]
    FollowNotLast,

    // --- semantic dialect mismatch ---
    #[error("witness-type must be 'violation_witness', got '{found}'")]
    #[diagnostic(code(shrike::witness::witness_type))]
    WrongWitnessType { found: String },

    #[error("unsupported source language '{found}' (only C witnesses are accepted)")]
    #[diagnostic(code(shrike::witness::source_language))]
    UnsupportedLanguage { found: String },

    #[error("entry_type must be 'violation_sequence', got '{found}'")]
    #[diagnostic(code(shrike::witness::entry_type))]
    WrongEntryType { found: String },

    // --- lexical ---
    #[error("invalid boolean literal '{value}' for '{key}'")]
    #[diagnostic(code(shrike::witness::invalid_bool))]
    InvalidBool { key: String, value: String },

    #[error("invalid control value '{value}'")]
    #[diagnostic(
        code(shrike::witness::invalid_control),
        help("allowed control values are 'condition-true' and 'condition-false'")
    )]
    InvalidControl { value: String },

    #[error("unknown waypoint type '{value}'")]
    #[diagnostic(code(shrike::witness::waypoint_type))]
    UnknownWaypointType { value: String },

    #[error("waypoint location is missing '{field}'")]
    #[diagnostic(code(shrike::witness::location_field))]
    MissingLocationField { field: String },

    #[error("invalid integer literal '{literal}'")]
    #[diagnostic(code(shrike::witness::invalid_integer))]
    InvalidInteger { literal: String },

    #[error("constraint '{constraint}' does not reference \\result")]
    #[diagnostic(code(shrike::witness::missing_result))]
    MissingResult { constraint: String },

    #[error("invalid comparator in return constraint '{constraint}'")]
    #[diagnostic(code(shrike::witness::invalid_comparator))]
    InvalidComparator { constraint: String },

    #[error("cannot parse return constraint literal '{literal}'")]
    #[diagnostic(code(shrike::witness::constraint_literal))]
    InvalidConstraintLiteral { literal: String },

    #[error("unsupported constraint value '{value}' for branching waypoint")]
    #[diagnostic(code(shrike::witness::branch_value))]
    InvalidBranchValue { value: String },

    // --- host glue ---
    #[error("cannot read witness file '{path}': {message}")]
    #[diagnostic(code(shrike::witness::io))]
    Io { path: String, message: String },
}

/// Severity of an advisory diagnostic. Fatal conditions are errors, so only
/// warnings remain here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisorySeverity {
    Warning,
}

/// A non-fatal load or matching diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub code: &'static str,
    pub severity: AdvisorySeverity,
    pub message: String,
}

/// Collector for advisory diagnostics.
///
/// Loaders and matchers push warnings here instead of terminating; every
/// warning is mirrored to `tracing` so hosts get it in their logs while
/// tests can assert on the collected list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Advisory>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, code: &'static str, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(code, "{message}");
        self.items.push(Advisory {
            code,
            severity: AdvisorySeverity::Warning,
            message,
        });
    }

    pub fn items(&self) -> &[Advisory] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.items.iter().any(|a| a.code == code)
    }

    /// Move all diagnostics out of `other` into this collector.
    pub fn absorb(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_structural_errors() {
        let err = WitnessError::EntryCount { count: 2 };
        assert_eq!(err.to_string(), "witness has 2 entry nodes, expected exactly one");
        let err = WitnessError::DanglingEdge { id: "n7".into() };
        assert_eq!(err.to_string(), "edge references unknown node 'n7'");
    }

    #[test]
    fn display_dialect_mismatch() {
        let err = WitnessError::WrongWitnessType {
            found: "correctness_witness".into(),
        };
        assert_eq!(
            err.to_string(),
            "witness-type must be 'violation_witness', got 'correctness_witness'"
        );
    }

    #[test]
    fn diagnostics_collects_in_order() {
        let mut diags = Diagnostics::new();
        assert!(diags.is_empty());
        diags.warn("shrike::witness::unknown_key", "unknown data key 'foo'");
        diags.warn("shrike::witness::replay", "ambiguous replay");
        assert_eq!(diags.items().len(), 2);
        assert!(diags.contains_code("shrike::witness::replay"));
        assert!(!diags.contains_code("shrike::witness::other"));
        assert_eq!(diags.items()[0].severity, AdvisorySeverity::Warning);
    }

    #[test]
    fn absorb_appends_items() {
        let mut a = Diagnostics::new();
        a.warn("c1", "first");
        let mut b = Diagnostics::new();
        b.warn("c2", "second");
        a.absorb(b);
        assert_eq!(a.items().len(), 2);
        assert_eq!(a.items()[1].code, "c2");
    }
}

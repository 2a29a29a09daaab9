use std::fmt;

use indexmap::IndexSet;

use crate::errors::WitnessError;

/// A safety property the witness claims to violate.
///
/// Several properties may be checked simultaneously; a witness carries a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    ValidFree,
    ValidDeref,
    ValidMemtrack,
    ValidMemcleanup,
    Termination,
    NoOverflow,
    UnreachCall,
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::ValidFree => write!(f, "valid-free"),
            Property::ValidDeref => write!(f, "valid-deref"),
            Property::ValidMemtrack => write!(f, "valid-memtrack"),
            Property::ValidMemcleanup => write!(f, "valid-memcleanup"),
            Property::Termination => write!(f, "termination"),
            Property::NoOverflow => write!(f, "no-overflow"),
            Property::UnreachCall => write!(f, "unreach-call"),
        }
    }
}

/// Classify a free-text specification into the set of checked properties.
///
/// Pure substring search against the fixed SV-COMP vocabulary; classifying
/// the same string twice yields the same set. An empty result is not an
/// error here; the graph loader decides whether that is fatal.
pub fn classify_specification(spec: &str) -> IndexSet<Property> {
    let mut properties = IndexSet::new();
    if spec.contains("valid-free") {
        properties.insert(Property::ValidFree);
    }
    if spec.contains("valid-deref") {
        properties.insert(Property::ValidDeref);
    }
    if spec.contains("valid-memtrack") {
        properties.insert(Property::ValidMemtrack);
    }
    if spec.contains("valid-memcleanup") {
        properties.insert(Property::ValidMemcleanup);
    }
    if spec.contains("F end") {
        properties.insert(Property::Termination);
    }
    if spec.contains("! overflow") {
        properties.insert(Property::NoOverflow);
    }
    if spec.contains("G ! call(") {
        properties.insert(Property::UnreachCall);
    }
    // Legacy SV-COMP specifications name the error function directly.
    if properties.is_empty() && spec.contains("reach_error") {
        properties.insert(Property::UnreachCall);
    }
    properties
}

/// Extract the designated error function from a `G ! call(...)` formula.
///
/// Returns `None` when the specification does not constrain calls. An empty
/// identifier inside the parentheses is fatal.
pub fn error_function(spec: &str) -> Result<Option<String>, WitnessError> {
    if let Some(pos) = spec.find("G ! call(") {
        let mut start = pos + "G ! call(".len();
        let bytes = spec.as_bytes();
        while start < bytes.len() && (bytes[start] == b'(' || bytes[start] == b' ') {
            start += 1;
        }
        let mut len = 0;
        while start + len < bytes.len()
            && !(bytes[start + len] == b'(' || bytes[start + len] == b' ' || bytes[start + len] == b')')
        {
            len += 1;
        }
        if len == 0 {
            return Err(WitnessError::MissingErrorFunction);
        }
        return Ok(Some(spec[start..start + len].to_string()));
    }
    if spec.contains("reach_error") {
        return Ok(Some("reach_error".to_string()));
    }
    Ok(None)
}

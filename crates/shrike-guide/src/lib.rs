#![doc = include_str!("../README.md")]

//! Witness-driven guidance for a symbolic executor.
//!
//! [`Guidance::advance`] is the single step hook: it takes the instruction
//! cursor and answers which branch directions remain open, which
//! return-value constraint to assume, which concrete non-deterministic value
//! to replay, and whether the error location has been reached.

pub mod automaton_matcher;
pub mod cursor;
pub mod sequence_matcher;
pub mod step;
pub mod tape;

pub use automaton_matcher::AutomatonMatcher;
pub use cursor::{Cursor, Opcode};
pub use sequence_matcher::SequenceMatcher;
pub use step::{Guidance, StepGuidance};
pub use tape::ReplayTape;

#![doc = include_str!("../README.md")]

//! Witness model, loaders and normalizer.
//!
//! This crate defines the common error-witness model, the two dialect
//! loaders (GraphML automaton, YAML waypoint sequence), the safety-property
//! classifier, the `\result` constraint mini-parser, the non-deterministic
//! value table, and the automaton normalizer that prunes sink branches and
//! extracts the deterministic replay tape.

pub mod constraint;
pub mod errors;
pub mod graph;
pub mod graph_loader;
pub mod model;
pub mod nondet;
pub mod normalize;
pub mod property;
pub mod sequence;
pub mod sequence_loader;

pub use constraint::{Comparator, ConstraintLiteral, ResultSkim, ReturnConstraint};
pub use errors::{Advisory, AdvisorySeverity, Diagnostics, WitnessError};
pub use graph::{Control, Edge, EdgeId, GraphMetadata, Node, NodeId, TapeEntry, WitnessAutomaton};
pub use graph_loader::GraphLoaderOptions;
pub use model::{ErrorWitness, WitnessBody, WitnessSummary};
pub use nondet::{nondet_value, ConcreteValue, NondetValue, NONDET_PREFIX};
pub use property::{classify_specification, error_function, Property};
pub use sequence::{Location, Segment, Waypoint, WaypointKind};

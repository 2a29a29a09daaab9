#![doc = include_str!("../README.md")]

//! Document-tree adapters for witness inputs.
//!
//! This crate turns raw XML or YAML text into a single owned [`DocNode`]
//! tree. Loaders walk the tree through `tag`/`text`/`attr`/`children` and
//! stay independent of the underlying parser library.

pub mod errors;
pub mod tree;
pub mod xml;
pub mod yaml;

pub use errors::DocError;
pub use tree::{DocNode, ITEM_TAG};
pub use xml::parse_xml;
pub use yaml::parse_yaml;

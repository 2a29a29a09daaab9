#![doc = include_str!("../README.md")]

//! Bit-vector expression terms.
//!
//! The guidance core never solves anything itself; it only builds predicates
//! over a left-hand expression supplied by the executor and hands them back.

pub mod term;
pub mod value;

pub use term::Expr;
pub use value::{BvConst, Width};

//! Configuration types
//!
//! Board-agnostic configuration structures. Parsing lives with whatever
//! loads them (see `cadence-runtime`).

pub mod types;

pub use types::*;

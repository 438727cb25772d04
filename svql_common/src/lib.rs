//! Small, dependency-light types shared between the matching engine and its
//! drivers.
//!
//! Everything graph-shaped lives in `svql_subgraph`; this crate only holds
//! the bits that are useful on both sides of that boundary.

mod intern;

pub use intern::Interner;

//! Subgraph isomorphism over attributed hypergraph netlists.
//!
//! A small *needle* graph (a logic pattern) is matched injectively into a
//! large *haystack* graph (a circuit) by node-type compatibility and
//! signal connectivity, using a modified Ullmann algorithm with port-swap
//! awareness. [`miner`] grows and counts frequent candidate subcircuits on
//! top of the same matcher.
//!
//! Typical use: build graphs with [`graph::GraphBuilder`], register them on
//! a [`solver::Solver`], configure compatibility/swap rules on
//! [`solver::Solver::config_mut`], then call [`matcher::solve`] or
//! [`miner::mine`].

mod utils;

pub mod error;
pub mod graph;
pub mod ids;
pub mod matcher;
pub mod miner;
pub mod result;
pub mod solver;

pub use error::{BuildError, ConfigError, SolveError};
pub use graph::{Graph, GraphBuilder};
pub use matcher::solve;
pub use miner::mine;
pub use result::{MatchResult, MineCandidate, MineResult, NodeMatch};
pub use solver::{Config, Hooks, Solver};

//! User-supplied callback hooks for extending the matcher without forking it.
//!
//! A small, mostly-default trait a caller can override piecemeal rather
//! than a closure-per-field struct.

use crate::graph::Graph;
use crate::ids::NodeIndex;
use crate::result::MatchResult;

/// Extension points a caller may override to influence matching beyond
/// type/constant compatibility tables.
///
/// Every method has a permissive default, so implementing a subset (or none)
/// of them behaves exactly like the built-in rules.
pub trait Hooks: Send + Sync {
    /// Additional node-level compatibility check, run after the type
    /// compatibility table already accepted the pair.
    fn compare_nodes(
        &self,
        _needle: &Graph,
        _needle_node: NodeIndex,
        _haystack: &Graph,
        _haystack_node: NodeIndex,
    ) -> bool {
        true
    }

    /// Additional per-bit connectivity check, run after the structural
    /// connectivity check already accepted the pair of bits.
    fn compare_edge(
        &self,
        _needle: &Graph,
        _needle_edge: crate::graph::AdjacencyEdge,
        _haystack: &Graph,
        _haystack_edge: crate::graph::AdjacencyEdge,
    ) -> bool {
        true
    }

    /// Final gate run once a full injective mapping has been assembled but
    /// before it is reported.
    fn check_solution(&self, _result: &MatchResult) -> bool {
        true
    }

    /// Observational hook invoked for every edge accepted during refinement;
    /// never affects the search, useful for tracing/telemetry.
    fn annotate_edge(
        &self,
        _needle: &Graph,
        _needle_edge: crate::graph::AdjacencyEdge,
        _haystack: &Graph,
        _haystack_edge: crate::graph::AdjacencyEdge,
    ) {
    }
}

/// The permissive default: accepts everything the compatibility tables
/// already accepted.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultHooks;

impl Hooks for DefaultHooks {}

//! Match and mining results, and their textual rendering.

use std::fmt;

/// One matched node: which needle node landed on which haystack node, and
/// the full needle-port → haystack-port map that was committed for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeMatch {
    pub needle_node: String,
    pub haystack_node: String,
    /// `(needle_port, haystack_port)`, in the needle node's port declaration order.
    pub port_map: Vec<(String, String)>,
}

/// A single injective mapping from a needle graph onto a haystack graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchResult {
    pub needle: String,
    pub haystack: String,
    /// Matched nodes, in needle node declaration order.
    pub nodes: Vec<NodeMatch>,
}

impl fmt::Display for MatchResult {
    /// Renders the result the way `scshell`'s `solve` command prints matches:
    /// one line per matched node, `needle→haystack port:port ...`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}→{}", node.needle_node, node.haystack_node)?;
            for (needle_port, haystack_port) in &node.port_map {
                write!(f, " {needle_port}:{haystack_port}")?;
            }
        }
        Ok(())
    }
}

/// A single frequent candidate subcircuit discovered by the miner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MineCandidate {
    /// Deterministic id assigned to this candidate in discovery order.
    pub id: u64,
    /// Node type names making up the candidate, in canonical growth order.
    pub node_types: Vec<String>,
    /// For each haystack graph searched, how many non-overlapping matches
    /// were found.
    pub match_counts: Vec<(String, usize)>,
}

impl fmt::Display for MineCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "candidate#{} [{}]", self.id, self.node_types.join(","))?;
        for (graph, count) in &self.match_counts {
            write!(f, " {graph}={count}")?;
        }
        Ok(())
    }
}

/// The full output of one `mine` call: every candidate that met the
/// `min_matches` threshold, in descending total-match order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MineResult {
    pub candidates: Vec<MineCandidate>,
}

impl fmt::Display for MineResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, candidate) in self.candidates.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{candidate}")?;
        }
        Ok(())
    }
}

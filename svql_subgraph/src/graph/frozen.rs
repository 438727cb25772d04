//! The frozen, integer-indexed graph representation.

use std::collections::HashMap;
use std::sync::Arc;

use svql_common::Interner;

use crate::ids::{NodeIndex, PortIndex, SignalIndex};

/// Opaque handle a caller may attach to a node.
///
/// Kept as an `Arc<dyn Any>` so the builder stays string-keyed while still
/// letting callers round-trip arbitrary payloads through a match.
pub type UserData = Arc<dyn std::any::Any + Send + Sync>;

/// A single declared port on a node.
#[derive(Clone, Debug)]
pub struct PortInfo {
    pub(crate) name_id: u32,
    pub(crate) name: String,
    pub(crate) width: u32,
    pub(crate) min_width: u32,
}

impl PortInfo {
    /// The port's declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The port's declared bit width.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// The smallest haystack width this port may still match against
    /// (needle-only subtyping).
    #[must_use]
    pub const fn min_width(&self) -> u32 {
        self.min_width
    }
}

/// A single node: its type, its ports in declaration order, and user metadata.
#[derive(Clone)]
pub struct NodeInfo {
    pub(crate) name: String,
    pub(crate) type_name: String,
    pub(crate) shareable: bool,
    pub(crate) user_data: Option<UserData>,
    pub(crate) ports: Vec<PortInfo>,
    pub(crate) port_name_to_index: HashMap<u32, PortIndex>,
}

impl NodeInfo {
    /// The node's user-visible string id.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node's declared type string.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Whether this node is excluded from non-overlap accounting.
    #[must_use]
    pub const fn is_shareable(&self) -> bool {
        self.shareable
    }

    /// The opaque handle attached at `create_node`, if any.
    #[must_use]
    pub fn user_data(&self) -> Option<&UserData> {
        self.user_data.as_ref()
    }

    /// Ports declared on this node, in declaration order.
    #[must_use]
    pub fn ports(&self) -> &[PortInfo] {
        &self.ports
    }
}

/// A collapsed hyperedge: the set of bits that are electrically the same net.
#[derive(Clone, Debug, Default)]
pub struct SignalInfo {
    pub(crate) bits: Vec<crate::ids::Bit>,
    pub(crate) constant: Option<char>,
    pub(crate) extern_: bool,
}

impl SignalInfo {
    /// All bits belonging to this signal.
    #[must_use]
    pub fn bits(&self) -> &[crate::ids::Bit] {
        &self.bits
    }

    /// The constant driver on this signal, if any.
    #[must_use]
    pub const fn constant(&self) -> Option<char> {
        self.constant
    }

    /// Whether this signal is visible outside the graph it belongs to.
    #[must_use]
    pub const fn is_extern(&self) -> bool {
        self.extern_
    }
}

/// One directed port-to-port connection bundle entry between two adjacent
/// nodes: `(my_port, my_bit, their_port, their_bit)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AdjacencyEdge {
    pub my_port: PortIndex,
    pub my_bit: u32,
    pub their_port: PortIndex,
    pub their_bit: u32,
}

/// The frozen, integer-indexed form of a graph.
///
/// Produced exclusively by [`crate::graph::GraphBuilder::freeze`]; there is no
/// public mutator on `Graph` itself, matching the "build mutably, then
/// register (conceptually frozen)" lifecycle.
#[derive(Clone)]
pub struct Graph {
    pub(crate) nodes: Vec<NodeInfo>,
    pub(crate) node_name_to_index: HashMap<String, NodeIndex>,
    #[allow(dead_code)]
    pub(crate) port_names: Interner<String>,
    pub(crate) signal_of: HashMap<(NodeIndex, PortIndex), Vec<SignalIndex>>,
    pub(crate) signals: Vec<SignalInfo>,
    pub(crate) adjacency: HashMap<NodeIndex, HashMap<NodeIndex, Vec<AdjacencyEdge>>>,
}

impl Graph {
    /// Number of nodes in this graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Iterates over all node indices in declaration order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        (0..self.nodes.len()).map(NodeIndex::new)
    }

    /// Looks up a node by its user-visible name.
    #[must_use]
    pub fn node_by_name(&self, name: &str) -> Option<NodeIndex> {
        self.node_name_to_index.get(name).copied()
    }

    /// Returns the static info for a node.
    #[must_use]
    pub fn node(&self, idx: NodeIndex) -> &NodeInfo {
        &self.nodes[idx.index()]
    }

    /// Looks up a port by name on a given node.
    #[must_use]
    pub fn port_by_name(&self, node: NodeIndex, name: &str) -> Option<PortIndex> {
        let id = self.port_names.get(&name.to_string())?;
        self.nodes[node.index()].port_name_to_index.get(&id).copied()
    }

    /// Returns the signal backing a given bit, or `None` if the bit is out of range.
    #[must_use]
    pub fn signal_at(&self, node: NodeIndex, port: PortIndex, bit: u32) -> Option<SignalIndex> {
        self.signal_of.get(&(node, port))?.get(bit as usize).copied()
    }

    /// Returns the signal info for a given signal index.
    #[must_use]
    pub fn signal(&self, idx: SignalIndex) -> &SignalInfo {
        &self.signals[idx.index()]
    }

    /// Total number of signals (collapsed hyperedges) in this graph.
    #[must_use]
    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }

    /// Returns the set of neighbor nodes adjacent to `node`, with their
    /// per-bit connection bundles.
    #[must_use]
    pub fn neighbors(&self, node: NodeIndex) -> impl Iterator<Item = (NodeIndex, &[AdjacencyEdge])> {
        self.adjacency
            .get(&node)
            .into_iter()
            .flat_map(|m| m.iter().map(|(n, edges)| (*n, edges.as_slice())))
    }

    /// Returns the connection bundle between two specific nodes, if adjacent.
    #[must_use]
    pub fn bundle(&self, a: NodeIndex, b: NodeIndex) -> Option<&[AdjacencyEdge]> {
        self.adjacency.get(&a)?.get(&b).map(Vec::as_slice)
    }
}

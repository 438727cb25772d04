//! Mutable graph construction.

use std::collections::HashMap;

use svql_common::Interner;

use crate::error::BuildError;
use crate::ids::{Bit, NodeIndex, PortIndex, SignalIndex};

use super::frozen::{AdjacencyEdge, Graph, NodeInfo, PortInfo, SignalInfo, UserData};

#[derive(Clone)]
struct BuilderPort {
    name_id: u32,
    name: String,
    width: u32,
    min_width: u32,
}

#[derive(Clone)]
struct BuilderNode {
    name: String,
    type_name: String,
    shareable: bool,
    user_data: Option<UserData>,
    ports: Vec<BuilderPort>,
    port_name_to_index: HashMap<u32, PortIndex>,
}

/// Mutable builder used to assemble a graph from string-keyed input, one node
/// and connection at a time, before freezing it into a [`Graph`].
///
/// Every call is string-keyed for external stability; bits are
/// tracked with a path-compressing union-find so that `create_connection`
/// composes transitively.
pub struct GraphBuilder {
    nodes: Vec<BuilderNode>,
    node_name_to_index: HashMap<String, NodeIndex>,
    port_names: Interner<String>,
    /// Union-find parent pointers over every bit created so far.
    parent: HashMap<Bit, Bit>,
    /// Constant driver recorded against the current root of a union-find tree.
    root_constant: HashMap<Bit, char>,
    /// Extern flag recorded against the current root of a union-find tree.
    root_extern: HashMap<Bit, bool>,
    /// All bits ever created, in creation order, for `mark_all_extern` and freeze.
    all_bits: Vec<Bit>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            node_name_to_index: HashMap::new(),
            port_names: Interner::new(),
            parent: HashMap::new(),
            root_constant: HashMap::new(),
            root_extern: HashMap::new(),
            all_bits: Vec::new(),
        }
    }

    /// Declares a new node. Fails with [`BuildError::DuplicateNode`] if `id`
    /// is already used in this graph.
    pub fn create_node(
        &mut self,
        id: impl Into<String>,
        node_type: impl Into<String>,
        user_data: Option<UserData>,
        shareable: bool,
    ) -> Result<NodeIndex, BuildError> {
        let id = id.into();
        if self.node_name_to_index.contains_key(&id) {
            return Err(BuildError::DuplicateNode(id));
        }
        let idx = NodeIndex::new(self.nodes.len());
        self.nodes.push(BuilderNode {
            name: id.clone(),
            type_name: node_type.into(),
            shareable,
            user_data,
            ports: Vec::new(),
            port_name_to_index: HashMap::new(),
        });
        self.node_name_to_index.insert(id, idx);
        Ok(idx)
    }

    fn node_mut(&mut self, node: NodeIndex) -> &mut BuilderNode {
        &mut self.nodes[node.index()]
    }

    fn resolve_node(&self, id: &str) -> Result<NodeIndex, BuildError> {
        self.node_name_to_index
            .get(id)
            .copied()
            .ok_or_else(|| BuildError::UnknownNode(id.to_string()))
    }

    /// Declares a new port on an existing node.
    pub fn create_port(
        &mut self,
        node_id: &str,
        port_name: impl Into<String>,
        width: u32,
        min_width: Option<u32>,
    ) -> Result<PortIndex, BuildError> {
        let node = self.resolve_node(node_id)?;
        let port_name = port_name.into();
        let min_width = min_width.unwrap_or(width);

        if width < 1 {
            return Err(BuildError::BadWidth {
                node: node_id.to_string(),
                port: port_name,
                width,
            });
        }
        if min_width < 1 || min_width > width {
            return Err(BuildError::BadMinWidth {
                node: node_id.to_string(),
                port: port_name,
                width,
                min_width,
            });
        }

        let name_id = self.port_names.intern(port_name.clone());
        if self.nodes[node.index()]
            .port_name_to_index
            .contains_key(&name_id)
        {
            return Err(BuildError::DuplicatePort {
                node: node_id.to_string(),
                port: port_name,
            });
        }

        let port_idx = PortIndex::new(self.nodes[node.index()].ports.len());
        for bit in 0..width {
            let b = Bit::new(node, port_idx, bit);
            self.parent.insert(b, b);
            self.all_bits.push(b);
        }

        let node_mut = self.node_mut(node);
        node_mut.ports.push(BuilderPort {
            name_id,
            name: port_name,
            width,
            min_width,
        });
        node_mut.port_name_to_index.insert(name_id, port_idx);
        Ok(port_idx)
    }

    fn resolve_port(&self, node_id: &str, port_name: &str) -> Result<(NodeIndex, PortIndex, u32), BuildError> {
        let node = self.resolve_node(node_id)?;
        let name_id = self
            .port_names
            .get(&port_name.to_string())
            .ok_or_else(|| BuildError::UnknownPort {
                node: node_id.to_string(),
                port: port_name.to_string(),
            })?;
        let port = self.nodes[node.index()]
            .port_name_to_index
            .get(&name_id)
            .copied()
            .ok_or_else(|| BuildError::UnknownPort {
                node: node_id.to_string(),
                port: port_name.to_string(),
            })?;
        let width = self.nodes[node.index()].ports[port.index()].width;
        Ok((node, port, width))
    }

    fn find(&mut self, bit: Bit) -> Bit {
        let parent = self.parent[&bit];
        if parent == bit {
            return bit;
        }
        let root = self.find(parent);
        self.parent.insert(bit, root);
        root
    }

    fn union(&mut self, a: Bit, b: Bit) -> Result<(), BuildError> {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return Ok(());
        }

        let merged_const = match (self.root_constant.get(&ra), self.root_constant.get(&rb)) {
            (Some(&ca), Some(&cb)) if ca != cb => {
                return Err(BuildError::ConstantConflict {
                    existing: ca,
                    new: cb,
                });
            }
            (Some(&ca), _) => Some(ca),
            (None, Some(&cb)) => Some(cb),
            (None, None) => None,
        };
        let merged_extern = self.root_extern.get(&ra).copied().unwrap_or(false)
            || self.root_extern.get(&rb).copied().unwrap_or(false);

        self.parent.insert(ra, rb);
        self.root_constant.remove(&ra);
        if let Some(c) = merged_const {
            self.root_constant.insert(rb, c);
        }
        self.root_extern.remove(&ra);
        if merged_extern {
            self.root_extern.insert(rb, true);
        }
        Ok(())
    }

    /// Connects every bit of `port_a` to the corresponding bit of `port_b`.
    /// Idempotent: connecting the same pair again is a no-op.
    pub fn create_connection(
        &mut self,
        node_a: &str,
        port_a: &str,
        node_b: &str,
        port_b: &str,
    ) -> Result<(), BuildError> {
        let (na, pa, wa) = self.resolve_port(node_a, port_a)?;
        let (nb, pb, wb) = self.resolve_port(node_b, port_b)?;
        if wa != wb {
            return Err(BuildError::WidthMismatch {
                node_a: node_a.to_string(),
                port_a: port_a.to_string(),
                width_a: wa,
                node_b: node_b.to_string(),
                port_b: port_b.to_string(),
                width_b: wb,
            });
        }
        for bit in 0..wa {
            self.union(Bit::new(na, pa, bit), Bit::new(nb, pb, bit))?;
        }
        Ok(())
    }

    /// Bit-slice connection form: connects `width` consecutive bits starting
    /// at `bit_a`/`bit_b` on the two named ports.
    pub fn create_bit_connection(
        &mut self,
        node_a: &str,
        port_a: &str,
        bit_a: u32,
        node_b: &str,
        port_b: &str,
        bit_b: u32,
        width: u32,
    ) -> Result<(), BuildError> {
        let (na, pa, wa) = self.resolve_port(node_a, port_a)?;
        let (nb, pb, wb) = self.resolve_port(node_b, port_b)?;
        if bit_a + width > wa {
            return Err(BuildError::BitOutOfRange {
                node: node_a.to_string(),
                port: port_a.to_string(),
                bit: bit_a + width.saturating_sub(1),
                width: wa,
            });
        }
        if bit_b + width > wb {
            return Err(BuildError::BitOutOfRange {
                node: node_b.to_string(),
                port: port_b.to_string(),
                bit: bit_b + width.saturating_sub(1),
                width: wb,
            });
        }
        for i in 0..width {
            self.union(
                Bit::new(na, pa, bit_a + i),
                Bit::new(nb, pb, bit_b + i),
            )?;
        }
        Ok(())
    }

    /// Attaches a constant driver to the signal containing a single bit.
    pub fn create_constant(
        &mut self,
        node: &str,
        port: &str,
        bit: u32,
        value: char,
    ) -> Result<(), BuildError> {
        let (n, p, w) = self.resolve_port(node, port)?;
        if bit >= w {
            return Err(BuildError::BitOutOfRange {
                node: node.to_string(),
                port: port.to_string(),
                bit,
                width: w,
            });
        }
        let root = self.find(Bit::new(n, p, bit));
        if let Some(&existing) = self.root_constant.get(&root) {
            if existing != value {
                return Err(BuildError::ConstantConflict {
                    existing,
                    new: value,
                });
            }
        } else {
            self.root_constant.insert(root, value);
        }
        Ok(())
    }

    /// Sets bits LSB-first from an integer value, mapping each binary digit
    /// to `'0'`/`'1'`.
    pub fn create_constant_int(
        &mut self,
        node: &str,
        port: &str,
        mut value: u64,
    ) -> Result<(), BuildError> {
        let (_, _, w) = self.resolve_port(node, port)?;
        for bit in 0..w {
            let digit = if value & 1 == 1 { '1' } else { '0' };
            self.create_constant(node, port, bit, digit)?;
            value >>= 1;
        }
        Ok(())
    }

    /// Marks a signal extern. With no `bit` given, marks every bit of the port.
    pub fn mark_extern(&mut self, node: &str, port: &str, bit: Option<u32>) -> Result<(), BuildError> {
        let (n, p, w) = self.resolve_port(node, port)?;
        let bits: Vec<u32> = match bit {
            Some(b) => {
                if b >= w {
                    return Err(BuildError::BitOutOfRange {
                        node: node.to_string(),
                        port: port.to_string(),
                        bit: b,
                        width: w,
                    });
                }
                vec![b]
            }
            None => (0..w).collect(),
        };
        for b in bits {
            let root = self.find(Bit::new(n, p, b));
            self.root_extern.insert(root, true);
        }
        Ok(())
    }

    /// Marks every signal in the graph extern (convenience for disabling the
    /// intern/extern distinction entirely).
    pub fn mark_all_extern(&mut self) {
        let bits = self.all_bits.clone();
        for b in bits {
            let root = self.find(b);
            self.root_extern.insert(root, true);
        }
    }

    /// Freezes this builder into an immutable [`Graph`], collapsing the
    /// union-find into contiguous [`SignalIndex`] values and precomputing
    /// per-node adjacency bundles.
    pub fn freeze(mut self) -> Graph {
        let bits = self.all_bits.clone();
        let mut root_to_signal: HashMap<Bit, SignalIndex> = HashMap::new();
        let mut signals: Vec<SignalInfo> = Vec::new();

        for &b in &bits {
            let root = self.find(b);
            let signal_idx = *root_to_signal.entry(root).or_insert_with(|| {
                let idx = SignalIndex::new(signals.len());
                signals.push(SignalInfo {
                    bits: Vec::new(),
                    constant: self.root_constant.get(&root).copied(),
                    extern_: self.root_extern.get(&root).copied().unwrap_or(false),
                });
                idx
            });
            signals[signal_idx.index()].bits.push(b);
        }

        let mut signal_of: HashMap<(NodeIndex, PortIndex), Vec<SignalIndex>> = HashMap::new();
        for (node_idx, node) in self.nodes.iter().enumerate() {
            let node_idx = NodeIndex::new(node_idx);
            for (port_idx, port) in node.ports.iter().enumerate() {
                let port_idx = PortIndex::new(port_idx);
                let mut sigs = Vec::with_capacity(port.width as usize);
                for bit in 0..port.width {
                    let root = self.find(Bit::new(node_idx, port_idx, bit));
                    sigs.push(root_to_signal[&root]);
                }
                signal_of.insert((node_idx, port_idx), sigs);
            }
        }

        let mut adjacency: HashMap<NodeIndex, HashMap<NodeIndex, Vec<AdjacencyEdge>>> = HashMap::new();
        for signal in &signals {
            for &a in &signal.bits {
                for &b in &signal.bits {
                    if a.node == b.node {
                        continue;
                    }
                    adjacency
                        .entry(a.node)
                        .or_default()
                        .entry(b.node)
                        .or_default()
                        .push(AdjacencyEdge {
                            my_port: a.port,
                            my_bit: a.bit,
                            their_port: b.port,
                            their_bit: b.bit,
                        });
                }
            }
        }

        let nodes = self
            .nodes
            .into_iter()
            .map(|n| NodeInfo {
                name: n.name,
                type_name: n.type_name,
                shareable: n.shareable,
                user_data: n.user_data,
                ports: n
                    .ports
                    .into_iter()
                    .map(|p| PortInfo {
                        name_id: p.name_id,
                        name: p.name,
                        width: p.width,
                        min_width: p.min_width,
                    })
                    .collect(),
                port_name_to_index: n.port_name_to_index,
            })
            .collect();

        Graph {
            nodes,
            node_name_to_index: self.node_name_to_index,
            port_names: self.port_names,
            signal_of,
            signals,
            adjacency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_pair() -> GraphBuilder {
        let mut b = GraphBuilder::new();
        b.create_node("a", "buf", None, false).unwrap();
        b.create_port("a", "o", 1, None).unwrap();
        b.create_node("b", "buf", None, false).unwrap();
        b.create_port("b", "i", 1, None).unwrap();
        b
    }

    #[test]
    fn duplicate_node_fails() {
        let mut b = GraphBuilder::new();
        b.create_node("a", "buf", None, false).unwrap();
        assert!(matches!(
            b.create_node("a", "buf", None, false),
            Err(BuildError::DuplicateNode(_))
        ));
    }

    #[test]
    fn bad_width_fails() {
        let mut b = GraphBuilder::new();
        b.create_node("a", "buf", None, false).unwrap();
        assert!(matches!(
            b.create_port("a", "o", 0, None),
            Err(BuildError::BadWidth { .. })
        ));
    }

    #[test]
    fn bad_min_width_fails() {
        let mut b = GraphBuilder::new();
        b.create_node("a", "buf", None, false).unwrap();
        assert!(matches!(
            b.create_port("a", "o", 4, Some(5)),
            Err(BuildError::BadMinWidth { .. })
        ));
    }

    #[test]
    fn width_mismatch_on_connect() {
        let mut b = GraphBuilder::new();
        b.create_node("a", "buf", None, false).unwrap();
        b.create_port("a", "o", 2, None).unwrap();
        b.create_node("b", "buf", None, false).unwrap();
        b.create_port("b", "i", 1, None).unwrap();
        assert!(matches!(
            b.create_connection("a", "o", "b", "i"),
            Err(BuildError::WidthMismatch { .. })
        ));
    }

    #[test]
    fn idempotent_connection() {
        let mut b1 = simple_pair();
        b1.create_connection("a", "o", "b", "i").unwrap();
        b1.create_connection("a", "o", "b", "i").unwrap();
        let g1 = b1.freeze();

        let mut b2 = simple_pair();
        b2.create_connection("a", "o", "b", "i").unwrap();
        let g2 = b2.freeze();

        assert_eq!(g1.signal_count(), g2.signal_count());
        let na = g1.node_by_name("a").unwrap();
        let nb = g1.node_by_name("b").unwrap();
        let pa = g1.port_by_name(na, "o").unwrap();
        let pb = g1.port_by_name(nb, "i").unwrap();
        assert_eq!(g1.signal_at(na, pa, 0), g1.signal_at(nb, pb, 0));
    }

    #[test]
    fn transitive_union() {
        let mut b = GraphBuilder::new();
        b.create_node("a", "t", None, false).unwrap();
        b.create_port("a", "o", 1, None).unwrap();
        b.create_node("b", "t", None, false).unwrap();
        b.create_port("b", "io", 1, None).unwrap();
        b.create_node("c", "t", None, false).unwrap();
        b.create_port("c", "i", 1, None).unwrap();
        b.create_connection("a", "o", "b", "io").unwrap();
        b.create_connection("b", "io", "c", "i").unwrap();
        let g = b.freeze();

        let na = g.node_by_name("a").unwrap();
        let nc = g.node_by_name("c").unwrap();
        let pa = g.port_by_name(na, "o").unwrap();
        let pc = g.port_by_name(nc, "i").unwrap();
        assert_eq!(g.signal_at(na, pa, 0), g.signal_at(nc, pc, 0));
        assert_eq!(g.signal_count(), 1);
    }

    #[test]
    fn constant_conflict_detected() {
        let mut b = GraphBuilder::new();
        b.create_node("a", "t", None, false).unwrap();
        b.create_port("a", "o", 1, None).unwrap();
        b.create_constant("a", "o", 0, '0').unwrap();
        assert!(matches!(
            b.create_constant("a", "o", 0, '1'),
            Err(BuildError::ConstantConflict { .. })
        ));
    }

    #[test]
    fn constant_int_round_trips_lsb_first() {
        let mut b = GraphBuilder::new();
        b.create_node("a", "t", None, false).unwrap();
        b.create_port("a", "o", 4, None).unwrap();
        b.create_constant_int("a", "o", 0b0110).unwrap();
        let g = b.freeze();
        let n = g.node_by_name("a").unwrap();
        let p = g.port_by_name(n, "o").unwrap();
        let expect = ['0', '1', '1', '0'];
        for (bit, want) in expect.iter().enumerate() {
            let sig = g.signal_at(n, p, bit as u32).unwrap();
            assert_eq!(g.signal(sig).constant(), Some(*want));
        }
    }

    #[test]
    fn every_bit_has_a_signal_and_every_signal_has_bits() {
        let mut b = simple_pair();
        b.create_connection("a", "o", "b", "i").unwrap();
        let g = b.freeze();
        for node in g.node_indices() {
            for (port_idx, port) in g.node(node).ports().iter().enumerate() {
                let port_idx = PortIndex::new(port_idx);
                for bit in 0..port.width() {
                    assert!(g.signal_at(node, port_idx, bit).is_some());
                }
            }
        }
        for idx in 0..g.signal_count() {
            assert!(!g.signal(SignalIndex::new(idx)).bits().is_empty());
        }
    }
}

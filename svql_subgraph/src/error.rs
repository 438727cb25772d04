//! Structured failures for every layer of the engine.
//!
//! Each layer gets its own `thiserror` enum rather than one catch-all type:
//! build errors never need to talk about solve-time concerns and vice versa.

use thiserror::Error;

/// Failures raised while assembling a graph through [`crate::graph::GraphBuilder`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// `create_node` was called with an id already used in this graph.
    #[error("node '{0}' already exists in this graph")]
    DuplicateNode(String),
    /// A call referenced a node id that was never created.
    #[error("unknown node '{0}'")]
    UnknownNode(String),
    /// `create_port` was called with a name already used on that node.
    #[error("port '{port}' already exists on node '{node}'")]
    DuplicatePort { node: String, port: String },
    /// A call referenced a port name that was never created on that node.
    #[error("unknown port '{port}' on node '{node}'")]
    UnknownPort { node: String, port: String },
    /// `create_port` was called with a width less than 1.
    #[error("port '{port}' on node '{node}' has width {width}, must be >= 1")]
    BadWidth { node: String, port: String, width: u32 },
    /// `create_port` was called with `min_width` outside `[1, width]`.
    #[error(
        "port '{port}' on node '{node}' has min_width {min_width} out of range for width {width}"
    )]
    BadMinWidth {
        node: String,
        port: String,
        width: u32,
        min_width: u32,
    },
    /// A bit index fell outside a port's declared width.
    #[error("bit {bit} out of range for port '{port}' on node '{node}' (width {width})")]
    BitOutOfRange {
        node: String,
        port: String,
        bit: u32,
        width: u32,
    },
    /// `create_connection` was called between two ports of differing declared width.
    #[error(
        "connection between '{node_a}.{port_a}' and '{node_b}.{port_b}' requires equal widths ({width_a} != {width_b})"
    )]
    WidthMismatch {
        node_a: String,
        port_a: String,
        width_a: u32,
        node_b: String,
        port_b: String,
        width_b: u32,
    },
    /// A signal was asked to carry two different constant drivers.
    #[error("signal already carries constant '{existing}', cannot also carry '{new}'")]
    ConstantConflict { existing: char, new: char },
}

/// Failures raised by [`crate::solver::Solver`] registry/configuration calls.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `add_graph` was called with a name already registered.
    #[error("graph '{0}' is already registered")]
    DuplicateGraph(String),
    /// A call referenced a graph name that was never registered.
    #[error("unknown graph '{0}'")]
    UnknownGraph(String),
    /// `add_swappable_ports_permutation` was given a map that is not a
    /// bijection, or whose two port lists differ in length.
    #[error("permutation for type '{0}' is not a bijection or has mismatched lengths")]
    MalformedPermutation(String),
    /// `add_swappable_ports` was given fewer than two ports.
    #[error("swap group for type '{0}' must contain at least 2 ports")]
    EmptySwapGroup(String),
}

/// Failures raised by [`crate::matcher::solve`] / [`crate::miner::mine`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolveError {
    /// `solve` or `mine` referenced a graph name that was never registered.
    #[error("unknown graph '{0}'")]
    UnknownGraph(String),
    /// `initial_mappings` referenced a needle node that does not exist.
    #[error("initial mapping references unknown needle node '{0}'")]
    InitialMappingUnknownNode(String),
}

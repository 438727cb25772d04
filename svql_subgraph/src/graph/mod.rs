//! Graph construction and the frozen graph representation.

mod builder;
mod frozen;

pub use builder::GraphBuilder;
pub use frozen::{AdjacencyEdge, Graph, NodeInfo, PortInfo, SignalInfo, UserData};

//! Shared graph-building helpers for the black-box scenario tests.

use svql_subgraph::{GraphBuilder, Solver};

/// Declares a node and its ports in one call: `ports` is
/// `(name, width, min_width)`, where `min_width = None` defaults to `width`.
pub fn add_node(builder: &mut GraphBuilder, name: &str, type_name: &str, ports: &[(&str, u32, Option<u32>)]) {
    builder.create_node(name, type_name, None, false).unwrap();
    for &(port, width, min_width) in ports {
        builder.create_port(name, port, width, min_width).unwrap();
    }
}

/// Declares a shareable node (excluded from non-overlap accounting).
pub fn add_shareable_node(builder: &mut GraphBuilder, name: &str, type_name: &str, ports: &[(&str, u32, Option<u32>)]) {
    builder.create_node(name, type_name, None, true).unwrap();
    for &(port, width, min_width) in ports {
        builder.create_port(name, port, width, min_width).unwrap();
    }
}

/// Connects whole ports, panicking on a malformed test graph.
pub fn connect(builder: &mut GraphBuilder, node_a: &str, port_a: &str, node_b: &str, port_b: &str) {
    builder.create_connection(node_a, port_a, node_b, port_b).unwrap();
}

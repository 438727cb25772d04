//! `max_solutions` bounds how many matches a single `solve` call reports,
//! without disturbing which matches would otherwise be found.

mod common;

use std::collections::HashMap;

use common::add_node;
use svql_subgraph::{GraphBuilder, Solver};

/// A single-node needle against a haystack of `n` structurally-identical,
/// unconnected nodes: every haystack node is an independent match.
fn build_haystack(n: usize) -> GraphBuilder {
    let mut b = GraphBuilder::new();
    for i in 0..n {
        add_node(&mut b, &format!("h{i}"), "buf", &[("o", 1, None)]);
    }
    b
}

fn build_needle() -> GraphBuilder {
    let mut b = GraphBuilder::new();
    add_node(&mut b, "n", "buf", &[("o", 1, None)]);
    b
}

#[test]
fn uncapped_search_finds_every_match() {
    let mut solver = Solver::new();
    solver.add_graph("needle", build_needle().freeze()).unwrap();
    solver.add_graph("haystack", build_haystack(100).freeze()).unwrap();

    let mut results = Vec::new();
    svql_subgraph::solve(&mut solver, &mut results, "needle", "haystack", true, None, &HashMap::new()).unwrap();
    assert_eq!(results.len(), 100);
}

#[test]
fn capped_search_stops_at_max_solutions() {
    let mut solver = Solver::new();
    solver.add_graph("needle", build_needle().freeze()).unwrap();
    solver.add_graph("haystack", build_haystack(100).freeze()).unwrap();

    let mut results = Vec::new();
    svql_subgraph::solve(&mut solver, &mut results, "needle", "haystack", true, Some(5), &HashMap::new()).unwrap();
    assert_eq!(results.len(), 5);
}

#[test]
fn cap_larger_than_available_matches_is_a_no_op() {
    let mut solver = Solver::new();
    solver.add_graph("needle", build_needle().freeze()).unwrap();
    solver.add_graph("haystack", build_haystack(3).freeze()).unwrap();

    let mut results = Vec::new();
    svql_subgraph::solve(&mut solver, &mut results, "needle", "haystack", true, Some(5), &HashMap::new()).unwrap();
    assert_eq!(results.len(), 3);
}

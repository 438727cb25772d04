//! Internal (non-extern) needle signals must map onto haystack signals that
//! are either extern themselves or fully contained within the matched nodes.

mod common;

use std::collections::HashMap;

use common::{add_node, connect};
use svql_subgraph::{GraphBuilder, Solver};

fn build_needle() -> GraphBuilder {
    let mut b = GraphBuilder::new();
    add_node(&mut b, "a", "buf", &[("o", 1, None)]);
    add_node(&mut b, "b", "buf", &[("i", 1, None)]);
    connect(&mut b, "a", "o", "b", "i");
    b
}

fn build_haystack_with_third_tap() -> GraphBuilder {
    let mut b = GraphBuilder::new();
    add_node(&mut b, "a2", "buf", &[("o", 1, None)]);
    add_node(&mut b, "b2", "buf", &[("i", 1, None)]);
    add_node(&mut b, "c2", "buf", &[("i", 1, None)]);
    connect(&mut b, "a2", "o", "b2", "i");
    connect(&mut b, "a2", "o", "c2", "i");
    b
}

#[test]
fn unmarked_internal_signal_rejects_a_haystack_net_with_an_uncovered_tap() {
    let needle = build_needle();
    let haystack = build_haystack_with_third_tap();

    let mut solver = Solver::new();
    solver.add_graph("needle", needle.freeze()).unwrap();
    solver.add_graph("haystack", haystack.freeze()).unwrap();

    let mut results = Vec::new();
    svql_subgraph::solve(&mut solver, &mut results, "needle", "haystack", true, None, &HashMap::new()).unwrap();
    assert!(results.is_empty(), "c2's tap on the shared net should break containment");
}

#[test]
fn marking_the_needle_signal_extern_admits_the_same_match() {
    let mut needle = build_needle();
    needle.mark_extern("a", "o", None).unwrap();
    let haystack = build_haystack_with_third_tap();

    let mut solver = Solver::new();
    solver.add_graph("needle", needle.freeze()).unwrap();
    solver.add_graph("haystack", haystack.freeze()).unwrap();

    let mut results = Vec::new();
    svql_subgraph::solve(&mut solver, &mut results, "needle", "haystack", true, None, &HashMap::new()).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].nodes.len(), 2);
}

#[test]
fn without_the_third_tap_the_plain_chain_matches_even_when_internal() {
    let needle = build_needle();

    let mut haystack = GraphBuilder::new();
    add_node(&mut haystack, "a2", "buf", &[("o", 1, None)]);
    add_node(&mut haystack, "b2", "buf", &[("i", 1, None)]);
    connect(&mut haystack, "a2", "o", "b2", "i");

    let mut solver = Solver::new();
    solver.add_graph("needle", needle.freeze()).unwrap();
    solver.add_graph("haystack", haystack.freeze()).unwrap();

    let mut results = Vec::new();
    svql_subgraph::solve(&mut solver, &mut results, "needle", "haystack", true, None, &HashMap::new()).unwrap();
    assert_eq!(results.len(), 1);
}

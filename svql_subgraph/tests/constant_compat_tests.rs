//! A needle bit driven by a constant only matches a haystack bit driven by a
//! compatible constant, per the registered constant-compatibility table.

mod common;

use std::collections::HashMap;

use common::add_node;
use svql_subgraph::{GraphBuilder, Solver};

fn build_needle_with_const(value: char) -> GraphBuilder {
    let mut b = GraphBuilder::new();
    add_node(&mut b, "n", "reg", &[("d", 1, None)]);
    b.create_constant("n", "d", 0, value).unwrap();
    b
}

fn build_haystack_with_const(value: char) -> GraphBuilder {
    let mut b = GraphBuilder::new();
    add_node(&mut b, "h", "reg", &[("d", 1, None)]);
    b.create_constant("h", "d", 0, value).unwrap();
    b
}

#[test]
fn identical_constants_always_match() {
    let needle = build_needle_with_const('0');
    let haystack = build_haystack_with_const('0');
    let mut solver = Solver::new();
    solver.add_graph("needle", needle.freeze()).unwrap();
    solver.add_graph("haystack", haystack.freeze()).unwrap();

    let mut results = Vec::new();
    svql_subgraph::solve(&mut solver, &mut results, "needle", "haystack", true, None, &HashMap::new()).unwrap();
    assert_eq!(results.len(), 1);
}

#[test]
fn mismatched_constants_fail_without_a_compatibility_registration() {
    let needle = build_needle_with_const('x');
    let haystack = build_haystack_with_const('0');
    let mut solver = Solver::new();
    solver.add_graph("needle", needle.freeze()).unwrap();
    solver.add_graph("haystack", haystack.freeze()).unwrap();

    let mut results = Vec::new();
    svql_subgraph::solve(&mut solver, &mut results, "needle", "haystack", true, None, &HashMap::new()).unwrap();
    assert!(results.is_empty());
}

#[test]
fn registering_constant_compatibility_admits_the_match() {
    let needle = build_needle_with_const('x');
    let haystack = build_haystack_with_const('0');
    let mut solver = Solver::new();
    solver.add_graph("needle", needle.freeze()).unwrap();
    solver.add_graph("haystack", haystack.freeze()).unwrap();
    solver.config_mut().add_compatible_constants('x', '0');

    let mut results = Vec::new();
    svql_subgraph::solve(&mut solver, &mut results, "needle", "haystack", true, None, &HashMap::new()).unwrap();
    assert_eq!(results.len(), 1);
}

#[test]
fn needle_bit_demanding_a_constant_rejects_a_haystack_bit_with_none() {
    let needle = build_needle_with_const('0');

    let mut haystack = GraphBuilder::new();
    add_node(&mut haystack, "h", "reg", &[("d", 1, None)]);
    // No constant driver attached to h.d at all.

    let mut solver = Solver::new();
    solver.add_graph("needle", needle.freeze()).unwrap();
    solver.add_graph("haystack", haystack.freeze()).unwrap();

    let mut results = Vec::new();
    svql_subgraph::solve(&mut solver, &mut results, "needle", "haystack", true, None, &HashMap::new()).unwrap();
    assert!(results.is_empty());
}

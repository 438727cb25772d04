//! Table-driven checks of the basic type-compatibility and injectivity
//! invariants, across a handful of single- and two-node scenarios.

mod common;

use std::collections::HashMap;

use common::{add_node, connect};
use rstest::rstest;
use svql_subgraph::{GraphBuilder, Solver};

fn solve_type_pair(needle_type: &str, haystack_type: &str, register_compatible: bool) -> usize {
    let mut needle = GraphBuilder::new();
    add_node(&mut needle, "n", needle_type, &[]);
    let mut haystack = GraphBuilder::new();
    add_node(&mut haystack, "h", haystack_type, &[]);

    let mut solver = Solver::new();
    solver.add_graph("needle", needle.freeze()).unwrap();
    solver.add_graph("haystack", haystack.freeze()).unwrap();
    if register_compatible {
        solver.config_mut().add_compatible_types(needle_type, haystack_type);
    }

    let mut results = Vec::new();
    svql_subgraph::solve(&mut solver, &mut results, "needle", "haystack", true, None, &HashMap::new()).unwrap();
    results.len()
}

#[rstest]
#[case("and2", "and2", false, 1)]
#[case("and2", "and3", false, 0)]
#[case("and2", "and3", true, 1)]
fn type_compatibility_table(
    #[case] needle_type: &str,
    #[case] haystack_type: &str,
    #[case] register_compatible: bool,
    #[case] expected: usize,
) {
    assert_eq!(solve_type_pair(needle_type, haystack_type, register_compatible), expected);
}

#[test]
fn type_compatibility_registration_is_one_directional() {
    // Registering and2 -> and3 must not implicitly admit and3 -> and2.
    assert_eq!(solve_type_pair("and2", "and3", true), 1);
    assert_eq!(solve_type_pair("and3", "and2", false), 0);
}

#[test]
fn two_identical_needle_nodes_never_map_onto_the_same_haystack_node() {
    // Needle has two unconnected nodes of the same type; haystack has only
    // one node of that type, so no injective mapping exists.
    let mut needle = GraphBuilder::new();
    add_node(&mut needle, "n1", "buf", &[("o", 1, None)]);
    add_node(&mut needle, "n2", "buf", &[("o", 1, None)]);

    let mut haystack = GraphBuilder::new();
    add_node(&mut haystack, "h1", "buf", &[("o", 1, None)]);

    let mut solver = Solver::new();
    solver.add_graph("needle", needle.freeze()).unwrap();
    solver.add_graph("haystack", haystack.freeze()).unwrap();

    let mut results = Vec::new();
    svql_subgraph::solve(&mut solver, &mut results, "needle", "haystack", true, None, &HashMap::new()).unwrap();
    assert!(results.is_empty());
}

#[test]
fn two_identical_needle_nodes_map_onto_two_distinct_haystack_nodes_in_both_orders() {
    let mut needle = GraphBuilder::new();
    add_node(&mut needle, "n1", "buf", &[("o", 1, None)]);
    add_node(&mut needle, "n2", "buf", &[("o", 1, None)]);

    let mut haystack = GraphBuilder::new();
    add_node(&mut haystack, "h1", "buf", &[("o", 1, None)]);
    add_node(&mut haystack, "h2", "buf", &[("o", 1, None)]);

    let mut solver = Solver::new();
    solver.add_graph("needle", needle.freeze()).unwrap();
    solver.add_graph("haystack", haystack.freeze()).unwrap();

    let mut results = Vec::new();
    svql_subgraph::solve(&mut solver, &mut results, "needle", "haystack", true, None, &HashMap::new()).unwrap();
    // n1/n2 are interchangeable (no structural distinction), so both
    // assignments of {h1, h2} are reported as separate matches.
    assert_eq!(results.len(), 2);
    for m in &results {
        let mut haystack_nodes: Vec<&str> = m.nodes.iter().map(|n| n.haystack_node.as_str()).collect();
        haystack_nodes.sort_unstable();
        assert_eq!(haystack_nodes, vec!["h1", "h2"]);
    }
}

#[test]
fn initial_mappings_restrict_the_candidate_domain() {
    let mut needle = GraphBuilder::new();
    add_node(&mut needle, "n", "buf", &[("o", 1, None)]);

    let mut haystack = GraphBuilder::new();
    add_node(&mut haystack, "h1", "buf", &[("o", 1, None)]);
    add_node(&mut haystack, "h2", "buf", &[("o", 1, None)]);

    let mut solver = Solver::new();
    solver.add_graph("needle", needle.freeze()).unwrap();
    solver.add_graph("haystack", haystack.freeze()).unwrap();

    let mut initial = HashMap::new();
    initial.insert("n".to_string(), vec!["h2".to_string()]);

    let mut results = Vec::new();
    svql_subgraph::solve(&mut solver, &mut results, "needle", "haystack", true, None, &initial).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].nodes[0].haystack_node, "h2");
}

#[test]
fn a_needle_with_more_nodes_than_a_connected_haystack_component_finds_nothing() {
    let mut needle = GraphBuilder::new();
    add_node(&mut needle, "a", "buf", &[("o", 1, None)]);
    add_node(&mut needle, "b", "buf", &[("i", 1, None), ("o", 1, None)]);
    add_node(&mut needle, "c", "buf", &[("i", 1, None)]);
    connect(&mut needle, "a", "o", "b", "i");
    connect(&mut needle, "b", "o", "c", "i");

    let mut haystack = GraphBuilder::new();
    add_node(&mut haystack, "a2", "buf", &[("o", 1, None)]);
    add_node(&mut haystack, "b2", "buf", &[("i", 1, None), ("o", 1, None)]);
    connect(&mut haystack, "a2", "o", "b2", "i");

    let mut solver = Solver::new();
    solver.add_graph("needle", needle.freeze()).unwrap();
    solver.add_graph("haystack", haystack.freeze()).unwrap();

    let mut results = Vec::new();
    svql_subgraph::solve(&mut solver, &mut results, "needle", "haystack", true, None, &HashMap::new()).unwrap();
    assert!(results.is_empty());
}

//! Frequent-subcircuit mining built on top of the matcher.
//!
//! Grows connected candidate subgraphs from every registered graph, dedupes
//! them under an intentionally approximate canonical signature, then counts
//! how often each candidate recurs (as a needle, with `allow_overlap = true`)
//! across every registered graph.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::graph::{Graph, GraphBuilder};
use crate::ids::NodeIndex;
use crate::matcher::solve_on;
use crate::result::{MineCandidate, MineResult};
use crate::solver::Solver;

/// Grows, dedupes, and counts frequent candidate subcircuits.
///
/// For each node of each registered graph, grows a connected induced
/// subgraph by BFS up to `max_nodes` nodes, keeps the ones with at least
/// `min_nodes` nodes, deduplicates by an approximate canonical signature,
/// and reports every surviving candidate whose
/// total non-overlapping match count across all registered graphs reaches
/// `min_matches`. `per_graph_cap` bounds how many matches are counted in any
/// single graph (`None` = unbounded).
pub fn mine(
    solver: &mut Solver,
    min_nodes: usize,
    max_nodes: usize,
    min_matches: usize,
    per_graph_cap: Option<usize>,
) -> MineResult {
    let graph_names: Vec<String> = solver.graph_names().map(str::to_string).collect();

    let mut seen_signatures: HashSet<String> = HashSet::new();
    let mut candidate_graphs: Vec<(String, Graph)> = Vec::new();

    for graph_name in &graph_names {
        let Ok(graph) = solver.graph(graph_name) else {
            continue;
        };
        for seed in graph.node_indices() {
            let included = grow_induced_subgraph(graph, seed, max_nodes);
            if included.len() < min_nodes {
                continue;
            }
            let order = canonical_order(graph, &included);
            let signature = canonical_signature(graph, &order);
            if !seen_signatures.insert(signature) {
                continue;
            }
            let candidate = build_candidate_graph(graph, &order);
            candidate_graphs.push((format!("cand#{}", candidate_graphs.len()), candidate));
        }
    }

    debug!(
        candidates = candidate_graphs.len(),
        graphs = graph_names.len(),
        "miner grew candidate subgraphs"
    );

    let mut result = MineResult::default();
    for (id, (label, candidate)) in candidate_graphs.into_iter().enumerate() {
        let node_types: Vec<String> = candidate
            .node_indices()
            .map(|n| candidate.node(n).type_name().to_string())
            .collect();

        let mut match_counts = Vec::new();
        let mut total = 0usize;
        for haystack_name in &graph_names {
            let Ok(haystack) = solver.graph(haystack_name) else {
                continue;
            };
            let haystack = haystack.clone();
            let mut results = Vec::new();
            let _ = solve_on(
                solver,
                &mut results,
                &label,
                &candidate,
                haystack_name,
                &haystack,
                true,
                per_graph_cap,
                &HashMap::new(),
            );
            let count = results.len();
            total += count;
            if count > 0 {
                match_counts.push((haystack_name.clone(), count));
            }
        }

        if total >= min_matches {
            result.candidates.push(MineCandidate {
                id: id as u64,
                node_types,
                match_counts,
            });
        }
    }

    result.candidates.sort_by(|a, b| {
        let total_a: usize = a.match_counts.iter().map(|(_, c)| c).sum();
        let total_b: usize = b.match_counts.iter().map(|(_, c)| c).sum();
        total_b.cmp(&total_a).then(a.id.cmp(&b.id))
    });
    result
}

/// Grows a connected induced subgraph from `seed` by breadth-first search,
/// visiting discovered neighbors in increasing node-index order for
/// determinism, until `max_nodes` nodes are included or the graph is
/// exhausted.
fn grow_induced_subgraph(graph: &Graph, seed: NodeIndex, max_nodes: usize) -> HashSet<NodeIndex> {
    let mut included = HashSet::new();
    included.insert(seed);
    let mut frontier = VecDeque::from([seed]);

    while included.len() < max_nodes {
        let Some(cur) = frontier.pop_front() else {
            break;
        };
        let mut neighbors: Vec<NodeIndex> = graph
            .neighbors(cur)
            .map(|(nn, _)| nn)
            .filter(|nn| !included.contains(nn))
            .collect();
        neighbors.sort();
        neighbors.dedup();
        for nn in neighbors {
            if included.len() >= max_nodes {
                break;
            }
            included.insert(nn);
            frontier.push_back(nn);
        }
    }
    included
}

/// A node's local signature: its type, and the sorted multiset of
/// `(neighbor type, sorted port-name pairs)` over in-subgraph neighbors.
///
/// This is a single round of color refinement, not an iterated fixed point,
/// and abstracts connectivity to port names rather than exact bit pairs:
/// larger or shorted-pin candidates can collide on this signature even when
/// not truly isomorphic — a known, documented imprecision, not silently
/// patched over.
fn node_signature(graph: &Graph, node: NodeIndex, included: &HashSet<NodeIndex>) -> String {
    let mut neighbor_sigs: Vec<String> = graph
        .neighbors(node)
        .filter(|(nn, _)| included.contains(nn))
        .map(|(nn, edges)| {
            let mut pairs: Vec<String> = edges
                .iter()
                .map(|e| {
                    format!(
                        "{}:{}",
                        graph.node(node).ports()[e.my_port.index()].name(),
                        graph.node(nn).ports()[e.their_port.index()].name()
                    )
                })
                .collect();
            pairs.sort();
            pairs.dedup();
            format!("{}[{}]", graph.node(nn).type_name(), pairs.join(","))
        })
        .collect();
    neighbor_sigs.sort();
    format!("{}|{}", graph.node(node).type_name(), neighbor_sigs.join(";"))
}

/// Orders a candidate's nodes canonically: by local signature, ties broken by
/// original node index.
fn canonical_order(graph: &Graph, included: &HashSet<NodeIndex>) -> Vec<NodeIndex> {
    let sigs: HashMap<NodeIndex, String> = included
        .iter()
        .map(|&n| (n, node_signature(graph, n, included)))
        .collect();
    let mut order: Vec<NodeIndex> = included.iter().copied().collect();
    order.sort_by(|a, b| sigs[a].cmp(&sigs[b]).then(a.index().cmp(&b.index())));
    order
}

/// The dedup key for a candidate: its nodes' signatures, in canonical order.
fn canonical_signature(graph: &Graph, order: &[NodeIndex]) -> String {
    let included: HashSet<NodeIndex> = order.iter().copied().collect();
    order
        .iter()
        .map(|&n| node_signature(graph, n, &included))
        .collect::<Vec<_>>()
        .join("||")
}

/// Materializes a candidate subgraph as a standalone needle [`Graph`]: nodes
/// and ports carried over verbatim, connections between included nodes
/// rebuilt, and any signal touching a node outside `order` (or already
/// extern in the source graph) marked extern, since the candidate's boundary
/// is intentionally unconstrained.
fn build_candidate_graph(graph: &Graph, order: &[NodeIndex]) -> Graph {
    let included: HashSet<NodeIndex> = order.iter().copied().collect();
    let name_of: HashMap<NodeIndex, String> = order.iter().enumerate().map(|(i, &n)| (n, format!("n{i}"))).collect();

    let mut builder = GraphBuilder::new();
    for &n in order {
        let info = graph.node(n);
        builder
            .create_node(name_of[&n].clone(), info.type_name(), None, false)
            .expect("canonical candidate names are unique");
        for port in info.ports() {
            builder
                .create_port(&name_of[&n], port.name(), port.width(), Some(port.min_width()))
                .expect("candidate ports are freshly declared");
        }
    }

    let mut handled_signals: HashSet<crate::ids::SignalIndex> = HashSet::new();
    for &n in order {
        for (port_idx, port) in graph.node(n).ports().iter().enumerate() {
            let port_idx = crate::ids::PortIndex::new(port_idx);
            for bit in 0..port.width() {
                let Some(sig_idx) = graph.signal_at(n, port_idx, bit) else {
                    continue;
                };
                if !handled_signals.insert(sig_idx) {
                    continue;
                }
                let signal = graph.signal(sig_idx);
                let inside_bits: Vec<crate::ids::Bit> = signal.bits().iter().copied().filter(|b| included.contains(&b.node)).collect();
                if inside_bits.is_empty() {
                    continue;
                }
                // A signal only carries a genuine internal edge of the mined motif
                // if it ties together two or more included nodes; anything else
                // (a port left dangling by this particular seed, or one that in
                // fact reaches outside the induced set) must stay a don't-care
                // boundary, or the candidate would only ever match back onto its
                // own seed.
                let inside_node_count = inside_bits.iter().map(|b| b.node).collect::<HashSet<_>>().len();
                let touches_outside =
                    signal.is_extern() || signal.bits().iter().any(|b| !included.contains(&b.node)) || inside_node_count < 2;

                let first = inside_bits[0];
                let first_name = name_of[&first.node].clone();
                let first_port = graph.node(first.node).ports()[first.port.index()].name();
                for other in &inside_bits[1..] {
                    let other_name = name_of[&other.node].clone();
                    let other_port = graph.node(other.node).ports()[other.port.index()].name();
                    builder
                        .create_bit_connection(&first_name, first_port, first.bit, &other_name, other_port, other.bit, 1)
                        .expect("candidate connections reuse validated widths");
                }
                if let Some(c) = signal.constant() {
                    builder
                        .create_constant(&first_name, first_port, first.bit, c)
                        .expect("candidate constants were conflict-free in the source graph");
                }
                if touches_outside {
                    builder
                        .mark_extern(&first_name, first_port, Some(first.bit))
                        .expect("bit within declared port width");
                }
            }
        }
    }

    builder.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    fn chain_of_three() -> Graph {
        let mut b = GraphBuilder::new();
        for name in ["a", "b", "c"] {
            b.create_node(name, "buf", None, false).unwrap();
            b.create_port(name, "i", 1, None).unwrap();
            b.create_port(name, "o", 1, None).unwrap();
        }
        b.create_connection("a", "o", "b", "i").unwrap();
        b.create_connection("b", "o", "c", "i").unwrap();
        b.freeze()
    }

    #[test]
    fn grows_up_to_max_nodes() {
        let g = chain_of_three();
        let seed = g.node_by_name("a").unwrap();
        let included = grow_induced_subgraph(&g, seed, 2);
        assert_eq!(included.len(), 2);
        assert!(included.contains(&seed));
    }

    #[test]
    fn candidate_graph_marks_boundary_extern() {
        let g = chain_of_three();
        let a = g.node_by_name("a").unwrap();
        let b = g.node_by_name("b").unwrap();
        let included: HashSet<NodeIndex> = [a, b].into_iter().collect();
        let order = canonical_order(&g, &included);
        let candidate = build_candidate_graph(&g, &order);

        assert_eq!(candidate.node_count(), 2);
        let has_extern = (0..candidate.signal_count()).any(|i| candidate.signal(crate::ids::SignalIndex::new(i)).is_extern());
        assert!(has_extern, "the b->c boundary signal must be marked extern");
    }

    #[test]
    fn mine_finds_repeated_two_node_chain() {
        let mut solver = Solver::new();
        solver.add_graph("h", chain_of_three()).unwrap();
        let result = mine(&mut solver, 2, 2, 1, None);
        assert!(!result.candidates.is_empty());
    }
}

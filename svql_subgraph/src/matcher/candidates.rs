//! Candidate-matrix construction and Ullmann-style refinement.

use std::collections::{HashMap, HashSet};

use crate::graph::Graph;
use crate::ids::NodeIndex;
use crate::solver::{Config, Hooks, Permutation};
use crate::utils::intersect_sets;

/// Returns true if `haystack`'s node `h` has, for every port declared on
/// needle node `n`, a same-named-under-`perm` port whose width `W_j` falls in
/// `[min_width, width]` of the needle port: a larger needle port may match
/// a smaller haystack port, down to min-width — but never a *wider* one
/// than the needle declared.
pub(super) fn port_compatible(needle: &Graph, n: NodeIndex, haystack: &Graph, h: NodeIndex, perm: &Permutation) -> bool {
    for port in needle.node(n).ports() {
        let haystack_name = perm.apply(port.name());
        match haystack.port_by_name(h, haystack_name) {
            Some(hp) => {
                let haystack_width = haystack.node(h).ports()[hp.index()].width();
                if haystack_width < port.min_width() || haystack_width > port.width() {
                    return false;
                }
            }
            None => return false,
        }
    }
    true
}

/// Returns true if `needle` node `n` (under some permutation of its type)
/// could plausibly match `haystack` node `h`: compatible types, and a port
/// layout satisfiable by at least one permutation.
fn node_compatible(needle: &Graph, n: NodeIndex, haystack: &Graph, h: NodeIndex, config: &Config, perms: &[Permutation]) -> bool {
    config.is_type_compatible(needle.node(n).type_name(), haystack.node(h).type_name())
        && perms.iter().any(|perm| port_compatible(needle, n, haystack, h, perm))
}

/// Exact per-bit connectivity check between two needle nodes `(n, nn)` and
/// two haystack nodes `(h, hh)` under fixed permutations for each side.
/// Bits beyond the haystack port's actual width are
/// vacuously satisfied (needle-port-wider-than-haystack-port subtyping).
///
/// Every needle/haystack bit pair that structurally lines up is also run
/// through `hooks.compare_edge` (a false veto fails the edge, same as a
/// structural mismatch) and, once accepted, reported via `hooks.annotate_edge`.
pub(super) fn edge_consistent(
    needle: &Graph,
    n: NodeIndex,
    perm_n: &Permutation,
    nn: NodeIndex,
    perm_nn: &Permutation,
    haystack: &Graph,
    h: NodeIndex,
    hh: NodeIndex,
    hooks: &dyn Hooks,
) -> bool {
    let Some(bundle_n) = needle.bundle(n, nn) else {
        return true;
    };
    let Some(bundle_h) = haystack.bundle(h, hh) else {
        return false;
    };

    for edge in bundle_n {
        let my_name = needle.node(n).ports()[edge.my_port.index()].name();
        let their_name = needle.node(nn).ports()[edge.their_port.index()].name();
        let my_haystack_name = perm_n.apply(my_name);
        let their_haystack_name = perm_nn.apply(their_name);

        let Some(my_hp) = haystack.port_by_name(h, my_haystack_name) else {
            return false;
        };
        let my_width = haystack.node(h).ports()[my_hp.index()].width();
        if edge.my_bit >= my_width {
            continue;
        }

        let Some(their_hp) = haystack.port_by_name(hh, their_haystack_name) else {
            return false;
        };
        let their_width = haystack.node(hh).ports()[their_hp.index()].width();
        if edge.their_bit >= their_width {
            continue;
        }

        let found = bundle_h.iter().find(|candidate| {
            candidate.my_port == my_hp
                && candidate.my_bit == edge.my_bit
                && candidate.their_port == their_hp
                && candidate.their_bit == edge.their_bit
        });
        let Some(&haystack_edge) = found else {
            return false;
        };
        if !hooks.compare_edge(needle, *edge, haystack, haystack_edge) {
            return false;
        }
        hooks.annotate_edge(needle, *edge, haystack, haystack_edge);
    }
    true
}

/// Existential version of [`edge_consistent`] used during refinement: does
/// there exist a permutation pair making `(n, h)` and `(nn, hh)` consistent?
#[allow(clippy::too_many_arguments)]
fn edge_consistent_exists(
    needle: &Graph,
    n: NodeIndex,
    nn: NodeIndex,
    perms_n: &[Permutation],
    perms_nn: &[Permutation],
    haystack: &Graph,
    h: NodeIndex,
    hh: NodeIndex,
    hooks: &dyn Hooks,
) -> bool {
    perms_n
        .iter()
        .any(|pn| perms_nn.iter().any(|pnn| edge_consistent(needle, n, pn, nn, pnn, haystack, h, hh, hooks)))
}

/// Builds the raw candidate matrix: for each needle node, every haystack
/// node that passes type/port compatibility and the non-overlap exclusion,
/// intersected with any forced `initial_mapping` domain.
pub(super) fn build(
    needle: &Graph,
    haystack: &Graph,
    config: &Config,
    perms: &HashMap<String, Vec<Permutation>>,
    allow_overlap: bool,
    used: Option<&HashSet<NodeIndex>>,
    initial_mapping: &HashMap<NodeIndex, HashSet<NodeIndex>>,
) -> HashMap<NodeIndex, Vec<NodeIndex>> {
    let mut candidates = HashMap::new();
    for n in needle.node_indices() {
        let type_name = needle.node(n).type_name();
        let type_perms = &perms[type_name];

        let default_domain: Vec<NodeIndex> = haystack
            .node_indices()
            .filter(|&h| {
                if !allow_overlap && !haystack.node(h).is_shareable() {
                    if let Some(used) = used {
                        if used.contains(&h) {
                            return false;
                        }
                    }
                }
                node_compatible(needle, n, haystack, h, config, type_perms)
            })
            .collect();

        let mut list: Vec<NodeIndex> = match initial_mapping.get(&n) {
            Some(allowed) => {
                let allowed: Vec<NodeIndex> = allowed.iter().copied().collect();
                intersect_sets(vec![default_domain, allowed]).into_iter().collect()
            }
            None => default_domain,
        };
        list.sort_by_key(NodeIndex::index);
        candidates.insert(n, list);
    }
    candidates
}

/// Repeatedly prunes candidates whose neighbors have no remaining candidate
/// that could plausibly connect to them, until a fixed point is reached
/// Pruning-only: never adds candidates, never commits to a
/// permutation.
pub(super) fn refine(
    needle: &Graph,
    haystack: &Graph,
    perms: &HashMap<String, Vec<Permutation>>,
    candidates: &mut HashMap<NodeIndex, Vec<NodeIndex>>,
    hooks: &dyn Hooks,
) {
    loop {
        let mut changed = false;
        for n in needle.node_indices() {
            let neighbors: Vec<NodeIndex> = needle.neighbors(n).map(|(nn, _)| nn).collect();
            let perms_n = &perms[needle.node(n).type_name()];

            let mut retained = Vec::new();
            for &h in &candidates[&n] {
                let mut ok = true;
                for &nn in &neighbors {
                    let perms_nn = &perms[needle.node(nn).type_name()];
                    let has_support = candidates[&nn]
                        .iter()
                        .any(|&hh| edge_consistent_exists(needle, n, nn, perms_n, perms_nn, haystack, h, hh, hooks));
                    if !has_support {
                        ok = false;
                        break;
                    }
                }
                if ok {
                    retained.push(h);
                } else {
                    changed = true;
                }
            }
            candidates.insert(n, retained);
        }
        if !changed {
            break;
        }
    }
}

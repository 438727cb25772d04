//! Constant-driver and extern/intern signal containment checks.

use std::collections::HashSet;

use crate::graph::Graph;
use crate::ids::{NodeIndex, PortIndex, SignalIndex};
use crate::solver::{Config, Permutation};

/// Checks that every constant driver required by a needle node's ports is
/// satisfied by a compatible constant driver at the corresponding haystack
/// bit. Bits beyond the haystack port's actual width fail if the needle bit
/// itself demands a constant (there is no haystack bit to drive it).
pub(super) fn constants_ok(needle: &Graph, n: NodeIndex, haystack: &Graph, h: NodeIndex, perm: &Permutation, config: &Config) -> bool {
    for (port_idx, port) in needle.node(n).ports().iter().enumerate() {
        let port_idx = PortIndex::new(port_idx);
        let haystack_name = perm.apply(port.name());
        let Some(hp) = haystack.port_by_name(h, haystack_name) else {
            return false;
        };
        let haystack_width = haystack.node(h).ports()[hp.index()].width();

        for bit in 0..port.width() {
            let Some(sig) = needle.signal_at(n, port_idx, bit) else {
                continue;
            };
            let Some(needle_const) = needle.signal(sig).constant() else {
                continue;
            };
            if bit >= haystack_width {
                return false;
            }
            let Some(hsig) = haystack.signal_at(h, hp, bit) else {
                return false;
            };
            match haystack.signal(hsig).constant() {
                Some(haystack_const) if config.is_constant_compatible(needle_const, haystack_const) => {}
                _ => return false,
            }
        }
    }
    true
}

/// For every internal (non-extern) needle signal, verifies that the
/// corresponding haystack signal is either extern itself or entirely
/// contained within the set of mapped haystack nodes.
pub(super) fn containment_ok(
    needle: &Graph,
    haystack: &Graph,
    needle_to_haystack: &std::collections::HashMap<NodeIndex, NodeIndex>,
    needle_to_perm: &std::collections::HashMap<NodeIndex, Permutation>,
) -> bool {
    let mapped_haystack_nodes: HashSet<NodeIndex> = needle_to_haystack.values().copied().collect();

    'signal: for idx in 0..needle.signal_count() {
        let sig = needle.signal(SignalIndex::new(idx));
        if sig.is_extern() {
            continue;
        }

        for &bit in sig.bits() {
            let Some(&h) = needle_to_haystack.get(&bit.node) else {
                continue;
            };
            let perm = &needle_to_perm[&bit.node];
            let port_name = needle.node(bit.node).ports()[bit.port.index()].name();
            let haystack_name = perm.apply(port_name);
            let Some(hp) = haystack.port_by_name(h, haystack_name) else {
                return false;
            };
            let haystack_width = haystack.node(h).ports()[hp.index()].width();
            if bit.bit >= haystack_width {
                continue;
            }
            let Some(hsig_idx) = haystack.signal_at(h, hp, bit.bit) else {
                return false;
            };
            let hsig = haystack.signal(hsig_idx);
            if hsig.is_extern() {
                continue 'signal;
            }
            if hsig.bits().iter().all(|hbit| mapped_haystack_nodes.contains(&hbit.node)) {
                continue 'signal;
            }
            return false;
        }
    }
    true
}

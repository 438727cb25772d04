//! Port-swap permutation construction.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;

/// A renaming of needle port names used when looking up a node's connections
/// against the haystack. Ports not present in the map are
/// left unchanged (identity on that port).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Permutation(HashMap<String, String>);

impl Permutation {
    /// The identity permutation: every port maps to itself.
    #[must_use]
    pub fn identity() -> Self {
        Self(HashMap::new())
    }

    /// Builds a permutation directly from an explicit renaming map (used for
    /// extra permutations registered via
    /// [`crate::solver::Config::add_swappable_ports_permutation`]).
    #[must_use]
    pub(crate) fn from_map(map: HashMap<String, String>) -> Self {
        Self(map)
    }

    /// Looks up the haystack-side port name a needle port should be matched
    /// against under this permutation.
    #[must_use]
    pub fn apply<'a>(&'a self, port: &'a str) -> &'a str {
        self.0.get(port).map(String::as_str).unwrap_or(port)
    }

    /// Returns true if this permutation renames no port.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.0.is_empty()
    }

    /// Exposes the explicit (non-identity) renaming pairs, for building a
    /// [`crate::result::MatchResult`] port map.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Composes two permutations as `p ∘ g`: `(p ∘ g)(x) == p(g(x))`.
    #[must_use]
    pub fn compose(p: &Self, g: &Self) -> Self {
        let mut keys: HashSet<&str> = HashSet::new();
        keys.extend(p.0.keys().map(String::as_str));
        keys.extend(g.0.keys().map(String::as_str));

        let mut out = HashMap::new();
        for k in keys {
            let via_g = g.apply(k);
            let via_p = p.apply(via_g).to_string();
            if via_p != k {
                out.insert(k.to_string(), via_p);
            }
        }
        Self(out)
    }

    fn canonical(&self) -> Vec<(String, String)> {
        let mut v: Vec<_> = self.0.iter().map(|(a, b)| (a.clone(), b.clone())).collect();
        v.sort();
        v
    }
}

/// Builds the `k!` permutations of a single swap group, with the identity
/// ordering forced to the front: the identity permutation is always
/// enumerated first.
fn group_permutations(group: &[String]) -> Vec<Permutation> {
    let k = group.len();
    let mut orderings: Vec<Vec<usize>> = (0..k).permutations(k).collect();
    if let Some(pos) = orderings
        .iter()
        .position(|p| p.iter().enumerate().all(|(i, &v)| i == v))
    {
        orderings.swap(0, pos);
    }

    orderings
        .into_iter()
        .map(|ordering| {
            let mut map = HashMap::new();
            for (orig_pos, &new_pos) in ordering.iter().enumerate() {
                if group[orig_pos] != group[new_pos] {
                    map.insert(group[orig_pos].clone(), group[new_pos].clone());
                }
            }
            Permutation(map)
        })
        .collect()
}

/// Cartesian product of every registered swap group's own permutations
/// (disjoint groups compose by simple union).
fn implicit_group_permutations(groups: &[Vec<String>]) -> Vec<Permutation> {
    let mut acc = vec![Permutation::identity()];
    for group in groups {
        let this_group = group_permutations(group);
        let mut next = Vec::with_capacity(acc.len() * this_group.len());
        for a in &acc {
            for g in &this_group {
                next.push(Permutation::compose(g, a));
            }
        }
        acc = next;
    }
    if let Some(pos) = acc.iter().position(Permutation::is_identity) {
        acc.swap(0, pos);
    }
    acc
}

/// Computes `Π(type)` for a single node type: the deduplicated union of the
/// implicit swap-group permutations and each registered extra permutation
/// composed with every swap-group permutation. Identity is
/// always first.
#[must_use]
pub fn permutations_for(groups: &[Vec<String>], extras: &[Permutation]) -> Vec<Permutation> {
    let group_perms = implicit_group_permutations(groups);

    let mut seen: HashSet<Vec<(String, String)>> = HashSet::new();
    let mut result = Vec::new();

    for g in &group_perms {
        if seen.insert(g.canonical()) {
            result.push(g.clone());
        }
    }
    for p in extras {
        for g in &group_perms {
            let composed = Permutation::compose(p, g);
            if seen.insert(composed.canonical()) {
                result.push(composed);
            }
        }
    }

    if let Some(pos) = result.iter().position(Permutation::is_identity) {
        result.swap(0, pos);
    }
    result
}

//! Registry of node-type/constant compatibility and port-swap configuration.
//!
//! A single struct holding every cross-cutting matcher setting, built up
//! via small additive `add_*` calls rather than one constructor with a
//! dozen arguments.

use std::collections::{HashMap, HashSet};

use crate::error::ConfigError;
use crate::solver::perm::{permutations_for, Permutation};

/// Node-type/constant compatibility tables, swap-group/permutation
/// registrations, and the derived-and-cached `Π(type)` permutation sets.
#[derive(Default)]
pub struct Config {
    /// needle type -> set of haystack types it may match (a type is always
    /// implicitly compatible with itself).
    compatible_types: HashMap<String, HashSet<String>>,
    /// needle constant -> set of haystack constants it may match (a constant
    /// is always implicitly compatible with itself).
    compatible_constants: HashMap<char, HashSet<char>>,
    /// type -> disjoint groups of ports that may be freely permuted among
    /// themselves.
    swap_groups: HashMap<String, Vec<Vec<String>>>,
    /// type -> additional, explicitly supplied permutations composed with
    /// the implicit swap-group permutations.
    extra_permutations: HashMap<String, Vec<Permutation>>,
    /// `Π(type)` cache, invalidated whenever swap configuration changes.
    permutation_cache: HashMap<String, Vec<Permutation>>,
}

impl Config {
    /// Creates an empty configuration: no cross-type compatibility, no
    /// constant compatibility beyond identity, no swap groups.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `haystack_type` as an acceptable match for `needle_type`,
    /// in addition to the always-implicit identity match.
    pub fn add_compatible_types(&mut self, needle_type: impl Into<String>, haystack_type: impl Into<String>) {
        self.compatible_types
            .entry(needle_type.into())
            .or_default()
            .insert(haystack_type.into());
    }

    /// Registers `haystack_const` as an acceptable match for `needle_const`,
    /// in addition to the always-implicit identity match.
    pub fn add_compatible_constants(&mut self, needle_const: char, haystack_const: char) {
        self.compatible_constants
            .entry(needle_const)
            .or_default()
            .insert(haystack_const);
    }

    /// Returns true if a needle node of `needle_type` may match a haystack
    /// node of `haystack_type`.
    #[must_use]
    pub fn is_type_compatible(&self, needle_type: &str, haystack_type: &str) -> bool {
        needle_type == haystack_type
            || self
                .compatible_types
                .get(needle_type)
                .is_some_and(|set| set.contains(haystack_type))
    }

    /// Returns true if a needle constant driver may match a haystack
    /// constant driver.
    #[must_use]
    pub fn is_constant_compatible(&self, needle_const: char, haystack_const: char) -> bool {
        needle_const == haystack_const
            || self
                .compatible_constants
                .get(&needle_const)
                .is_some_and(|set| set.contains(&haystack_const))
    }

    /// Registers a group of ports on `type_name` that may be freely permuted
    /// among themselves. Invalidates the permutation cache
    /// for `type_name`.
    ///
    /// # Errors
    /// Returns [`ConfigError::EmptySwapGroup`] if fewer than two ports are given.
    pub fn add_swappable_ports(
        &mut self,
        type_name: impl Into<String>,
        ports: Vec<String>,
    ) -> Result<(), ConfigError> {
        let type_name = type_name.into();
        if ports.len() < 2 {
            return Err(ConfigError::EmptySwapGroup(type_name));
        }
        self.swap_groups.entry(type_name.clone()).or_default().push(ports);
        self.permutation_cache.remove(&type_name);
        Ok(())
    }

    /// Registers an explicit permutation `lhs[i] -> rhs[i]` for `type_name`,
    /// composed with every implicit swap-group permutation when `Π(type)` is
    /// computed. Invalidates the permutation cache for
    /// `type_name`.
    ///
    /// # Errors
    /// Returns [`ConfigError::MalformedPermutation`] if `lhs` and `rhs`
    /// differ in length or either contains a duplicate port name.
    pub fn add_swappable_ports_permutation(
        &mut self,
        type_name: impl Into<String>,
        lhs: Vec<String>,
        rhs: Vec<String>,
    ) -> Result<(), ConfigError> {
        let type_name = type_name.into();
        if lhs.len() != rhs.len() {
            return Err(ConfigError::MalformedPermutation(type_name));
        }
        let lhs_set: HashSet<&String> = lhs.iter().collect();
        let rhs_set: HashSet<&String> = rhs.iter().collect();
        if lhs_set.len() != lhs.len() || rhs_set.len() != rhs.len() || lhs_set != rhs_set {
            return Err(ConfigError::MalformedPermutation(type_name));
        }

        let mut map = HashMap::new();
        for (l, r) in lhs.iter().zip(rhs.iter()) {
            if l != r {
                map.insert(l.clone(), r.clone());
            }
        }
        self.extra_permutations
            .entry(type_name.clone())
            .or_default()
            .push(Permutation::from_map(map));
        self.permutation_cache.remove(&type_name);
        Ok(())
    }

    /// Clears every compatibility table, swap group, extra permutation, and
    /// cached `Π(type)`.
    pub fn clear_config(&mut self) {
        self.compatible_types.clear();
        self.compatible_constants.clear();
        self.swap_groups.clear();
        self.extra_permutations.clear();
        self.permutation_cache.clear();
    }

    /// Returns `Π(type)`, computing and caching it on first use for this
    /// type: permutation sets are computed once per solve, not
    /// once per node.
    pub fn permutations_for(&mut self, type_name: &str) -> &[Permutation] {
        if !self.permutation_cache.contains_key(type_name) {
            let groups = self.swap_groups.get(type_name).cloned().unwrap_or_default();
            let extras = self.extra_permutations.get(type_name).cloned().unwrap_or_default();
            let computed = permutations_for(&groups, &extras);
            self.permutation_cache.insert(type_name.to_string(), computed);
        }
        &self.permutation_cache[type_name]
    }
}

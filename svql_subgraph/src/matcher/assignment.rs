//! Bidirectional needle/haystack node mapping for one backtracking search.
//!
//! A single struct keeping both directions of an injective mapping
//! consistent, with `contracts` pre/postconditions enforced in debug builds
//! rather than re-derived ad hoc at every call site.

use ahash::AHashMap;

use crate::ids::NodeIndex;

/// The current partial mapping of needle nodes to haystack nodes for one
/// `solve` call. Injective by construction: inserting `n -> h` first clears
/// any prior assignment of `n`, and each `h` is held by at most one `n`
/// (each haystack node is claimed at most once).
#[derive(Clone, Debug, Default)]
pub(super) struct Assignment {
    needle_to_haystack: AHashMap<NodeIndex, NodeIndex>,
    haystack_to_needle: AHashMap<NodeIndex, NodeIndex>,
}

impl Assignment {
    /// Checks that both directions agree on exactly the same set of pairs.
    fn is_consistent(&self) -> bool {
        if self.needle_to_haystack.len() != self.haystack_to_needle.len() {
            return false;
        }
        self.needle_to_haystack
            .iter()
            .all(|(&n, &h)| self.haystack_to_needle.get(&h) == Some(&n))
    }

    /// Creates an empty assignment.
    #[contracts::debug_ensures(ret.is_empty())]
    pub(super) fn new() -> Self {
        Self {
            needle_to_haystack: AHashMap::default(),
            haystack_to_needle: AHashMap::default(),
        }
    }

    /// Records `needle -> haystack`, injectively: `haystack` must not already
    /// be held by a different needle node (callers check
    /// [`Assignment::haystack_is_free`] before calling this).
    #[contracts::debug_requires(self.haystack_is_free(haystack))]
    #[contracts::debug_ensures(self.is_consistent())]
    pub(super) fn insert(&mut self, needle: NodeIndex, haystack: NodeIndex) {
        self.needle_to_haystack.insert(needle, haystack);
        self.haystack_to_needle.insert(haystack, needle);
    }

    /// Undoes [`Assignment::insert`] for `needle`, restoring both maps.
    #[contracts::debug_ensures(self.is_consistent())]
    pub(super) fn remove(&mut self, needle: NodeIndex) {
        if let Some(haystack) = self.needle_to_haystack.remove(&needle) {
            self.haystack_to_needle.remove(&haystack);
        }
    }

    /// The haystack node currently assigned to `needle`, if any.
    #[must_use]
    pub(super) fn haystack_of(&self, needle: NodeIndex) -> Option<NodeIndex> {
        self.needle_to_haystack.get(&needle).copied()
    }

    /// Returns true if no needle node currently maps to `haystack`.
    #[must_use]
    pub(super) fn haystack_is_free(&self, haystack: NodeIndex) -> bool {
        !self.haystack_to_needle.contains_key(&haystack)
    }

    /// Returns true if `needle` is already assigned.
    #[must_use]
    pub(super) fn contains_needle(&self, needle: NodeIndex) -> bool {
        self.needle_to_haystack.contains_key(&needle)
    }

    /// The number of needle nodes currently assigned.
    #[contracts::debug_requires(self.is_consistent())]
    #[must_use]
    pub(super) fn len(&self) -> usize {
        self.needle_to_haystack.len()
    }

    /// Returns true if no needle node is currently assigned.
    #[must_use]
    pub(super) fn is_empty(&self) -> bool {
        self.needle_to_haystack.is_empty()
    }

    /// Every `(needle, haystack)` pair currently assigned, in no particular
    /// order; callers that need a deterministic order sort on the needle side.
    pub(super) fn pairs(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        self.needle_to_haystack.iter().map(|(&n, &h)| (n, h))
    }

    /// The assigned haystack nodes, for overlap-history bookkeeping.
    pub(super) fn haystack_nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.haystack_to_needle.keys().copied()
    }
}

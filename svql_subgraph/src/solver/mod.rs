//! The long-lived matching context: registered graphs, compatibility
//! configuration, callback hooks, and cross-solve non-overlap bookkeeping.

mod config;
mod hooks;
mod perm;

pub use config::Config;
pub use hooks::{DefaultHooks, Hooks};
pub use perm::Permutation;

use std::collections::{HashMap, HashSet};

use crate::error::{ConfigError, SolveError};
use crate::graph::Graph;
use crate::ids::NodeIndex;

/// Owns every graph registered for matching, the shared compatibility
/// configuration, and the non-overlap history accumulated across repeated
/// `solve` calls against the same haystack.
///
/// Splits a long-lived driver/session object from the per-call matcher:
/// `Solver` is the thing a caller builds once and reuses;
/// [`crate::matcher::solve`] and [`crate::miner::mine`] are the stateless
/// operations run against it.
pub struct Solver {
    graphs: HashMap<String, Graph>,
    config: Config,
    hooks: Box<dyn Hooks>,
    overlap_history: HashMap<String, HashSet<NodeIndex>>,
    verbose: bool,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    /// Creates an empty solver: no registered graphs, default (permissive)
    /// configuration and hooks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graphs: HashMap::new(),
            config: Config::new(),
            hooks: Box::new(DefaultHooks),
            overlap_history: HashMap::new(),
            verbose: false,
        }
    }

    /// Registers a frozen graph under `name` for later use as a needle or
    /// haystack.
    ///
    /// # Errors
    /// Returns [`ConfigError::DuplicateGraph`] if `name` is already registered.
    pub fn add_graph(&mut self, name: impl Into<String>, graph: Graph) -> Result<(), ConfigError> {
        let name = name.into();
        if self.graphs.contains_key(&name) {
            return Err(ConfigError::DuplicateGraph(name));
        }
        self.graphs.insert(name, graph);
        Ok(())
    }

    /// Looks up a registered graph by name.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownGraph`] if `name` was never registered.
    pub fn graph(&self, name: &str) -> Result<&Graph, ConfigError> {
        self.graphs
            .get(name)
            .ok_or_else(|| ConfigError::UnknownGraph(name.to_string()))
    }

    /// Iterates over every registered graph's name.
    pub fn graph_names(&self) -> impl Iterator<Item = &str> {
        self.graphs.keys().map(String::as_str)
    }

    /// Read access to the compatibility/swap configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable access to the compatibility/swap configuration.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Installs a custom set of callback hooks, replacing [`DefaultHooks`].
    pub fn set_hooks(&mut self, hooks: impl Hooks + 'static) {
        self.hooks = Box::new(hooks);
    }

    /// The currently installed callback hooks.
    #[must_use]
    pub fn hooks(&self) -> &dyn Hooks {
        self.hooks.as_ref()
    }

    /// Enables or disables verbose tracing of the search.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Whether verbose tracing is currently enabled.
    #[must_use]
    pub const fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Forgets every non-overlap record for every haystack graph.
    pub fn clear_overlap_history(&mut self) {
        self.overlap_history.clear();
    }

    /// Forgets the non-overlap record for a single haystack graph.
    pub fn clear_overlap_history_for(&mut self, haystack: &str) {
        self.overlap_history.remove(haystack);
    }

    /// Nodes of `haystack` already claimed by a prior non-overlapping solve
    /// for a non-overlapping solve. `None` means nothing has
    /// been claimed yet.
    #[must_use]
    pub(crate) fn used_nodes(&self, haystack: &str) -> Option<&HashSet<NodeIndex>> {
        self.overlap_history.get(haystack)
    }

    /// Records additional claimed nodes for a haystack graph after a
    /// non-overlapping solve reports a match.
    pub(crate) fn mark_used(&mut self, haystack: &str, nodes: impl IntoIterator<Item = NodeIndex>) {
        self.overlap_history
            .entry(haystack.to_string())
            .or_default()
            .extend(nodes);
    }

    /// Looks up a registered graph by name and clones it, so callers (the
    /// matcher, the miner) can hold an owned copy for the lifetime of a
    /// search without keeping `self` borrowed the whole time: the search
    /// also needs `&mut self` partway through, for hooks and overlap
    /// bookkeeping.
    ///
    /// # Errors
    /// Returns [`SolveError::UnknownGraph`] if `name` is not registered.
    pub(crate) fn clone_graph(&self, name: &str) -> Result<Graph, SolveError> {
        self.graphs
            .get(name)
            .cloned()
            .ok_or_else(|| SolveError::UnknownGraph(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    fn tiny_graph() -> Graph {
        let mut b = GraphBuilder::new();
        b.create_node("n0", "buf", None, false).unwrap();
        b.freeze()
    }

    #[test]
    fn duplicate_graph_name_is_rejected() {
        let mut solver = Solver::new();
        solver.add_graph("g", tiny_graph()).unwrap();
        let err = solver.add_graph("g", tiny_graph()).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateGraph("g".to_string()));
    }

    #[test]
    fn unknown_graph_lookup_fails() {
        let solver = Solver::new();
        let err = solver.graph("missing").unwrap_err();
        assert_eq!(err, ConfigError::UnknownGraph("missing".to_string()));
    }

    #[test]
    fn overlap_history_tracks_per_haystack() {
        let mut solver = Solver::new();
        let n0 = NodeIndex::new(0);
        solver.mark_used("h1", [n0]);
        assert!(solver.used_nodes("h1").unwrap().contains(&n0));
        assert!(solver.used_nodes("h2").is_none());
        solver.clear_overlap_history_for("h1");
        assert!(solver.used_nodes("h1").is_none());
    }
}

use std::collections::HashMap;
use std::hash::Hash;

/// A bidirectional string-to-integer interner.
///
/// `GraphBuilder` uses one of these per graph to turn node names, type
/// names, and port names into small dense ids at freeze time (see
/// `svql_subgraph::graph::Graph::freeze`), so the matcher never compares
/// strings on the hot path.
#[derive(Debug, Clone, Default)]
pub struct Interner<K> {
    by_key: HashMap<K, u32>,
    by_id: Vec<K>,
}

impl<K> Interner<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty interner.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_key: HashMap::new(),
            by_id: Vec::new(),
        }
    }

    /// Interns `key`, returning its existing id if already seen.
    pub fn intern(&mut self, key: K) -> u32 {
        if let Some(&id) = self.by_key.get(&key) {
            return id;
        }
        let id = self.by_id.len() as u32;
        self.by_id.push(key.clone());
        self.by_key.insert(key, id);
        id
    }

    /// Looks up the id of an already-interned key without inserting it.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<u32> {
        self.by_key.get(key).copied()
    }

    /// Resolves an id back to its key.
    #[must_use]
    pub fn resolve(&self, id: u32) -> Option<&K> {
        self.by_id.get(id as usize)
    }

    /// Returns the number of distinct keys interned so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns true if no keys have been interned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

//! Deterministic in-memory registry doubles.
//!
//! Backing storage is a `BTreeMap`, so child listings come back in a stable
//! lexical order and assertions on dump ordering stay reliable.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::{CachedEntry, CachedMirror, RegistryError, RegistryReader};

/// In-memory coordination tree.
///
/// Nodes exist implicitly: inserting `/job/a/b` makes `a` visible as a child
/// of `/job` even when `/job/a` holds no payload of its own, matching how a
/// hierarchical registry materialises intermediate nodes.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    nodes: RwLock<BTreeMap<String, String>>,
}

impl InMemoryRegistry {
    /// Builds an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` at `path`.
    pub fn put(&self, path: &str, value: &str) {
        let mut nodes = self.nodes.write().unwrap_or_else(|e| e.into_inner());
        nodes.insert(path.to_owned(), value.to_owned());
    }

    /// Removes the payload stored at `path`.
    pub fn remove(&self, path: &str) {
        let mut nodes = self.nodes.write().unwrap_or_else(|e| e.into_inner());
        nodes.remove(path);
    }
}

impl RegistryReader for InMemoryRegistry {
    fn get(&self, path: &str) -> Result<Option<String>, RegistryError> {
        let nodes = self.nodes.read().unwrap_or_else(|e| e.into_inner());
        Ok(nodes.get(path).cloned())
    }

    fn children_keys(&self, path: &str) -> Result<Vec<String>, RegistryError> {
        let nodes = self.nodes.read().unwrap_or_else(|e| e.into_inner());
        let prefix = format!("{path}/");
        let mut keys: Vec<String> = Vec::new();
        for rest in nodes.keys().filter_map(|key| key.strip_prefix(&prefix)) {
            let Some(first) = rest.split('/').next() else {
                continue;
            };
            if first.is_empty() || keys.iter().any(|key| key == first) {
                continue;
            }
            keys.push(first.to_owned());
        }
        Ok(keys)
    }
}

/// In-memory watch mirror primed explicitly by tests.
///
/// Entries are recorded under a logical lookup path but carry their own
/// (path, value) pair, so tests can stage path divergence as well as value
/// divergence and missing entries.
#[derive(Debug, Default)]
pub struct InMemoryMirror {
    entries: RwLock<BTreeMap<String, CachedEntry>>,
}

impl InMemoryMirror {
    /// Builds an empty mirror.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the mirror's view of the node at `path`.
    pub fn record(&self, path: &str, entry: CachedEntry) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(path.to_owned(), entry);
    }

    /// Drops the mirror's view of the node at `path`.
    pub fn forget(&self, path: &str) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(path);
    }
}

impl CachedMirror for InMemoryMirror {
    fn current_entry(&self, path: &str) -> Option<CachedEntry> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(path).cloned()
    }
}

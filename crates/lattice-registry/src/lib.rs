//! Seam to the coordination-service client used by a lattice node.
//!
//! The node keeps its job state in a hierarchical, watch-capable registry.
//! Two views of that tree exist at runtime: direct synchronous reads against
//! the backend, and a locally cached mirror kept current by watch events.
//! This crate defines the traits through which node components consume both
//! views, without implementing the client itself. The `test-support` feature
//! adds deterministic in-memory implementations for tests and embedder
//! harnesses.

use std::sync::Arc;

use thiserror::Error;

#[cfg(any(test, feature = "test-support"))]
mod memory;
pub mod path;

#[cfg(any(test, feature = "test-support"))]
pub use memory::{InMemoryMirror, InMemoryRegistry};

/// Errors surfaced by the coordination-service client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Backend failed a direct read.
    #[error("registry read of '{path}' failed: {message}")]
    Read {
        /// Path the read targeted.
        path: String,
        /// Client-reported failure detail.
        message: String,
    },
    /// Backend failed a child listing.
    #[error("registry listing of '{path}' failed: {message}")]
    List {
        /// Path the listing targeted.
        path: String,
        /// Client-reported failure detail.
        message: String,
    },
}

/// Synchronous read access to the coordination tree.
pub trait RegistryReader: Send + Sync {
    /// Reads the node's payload; `None` when the node is absent.
    fn get(&self, path: &str) -> Result<Option<String>, RegistryError>;

    /// Lists direct child keys of `path`, in backend order.
    fn children_keys(&self, path: &str) -> Result<Vec<String>, RegistryError>;
}

/// Last-seen view held by the watch-driven mirror.
///
/// The mirror may lag the authoritative backend; callers compare its entries
/// against direct reads to detect staleness.
pub trait CachedMirror: Send + Sync {
    /// The mirror's current record for the node, when it has observed one.
    fn current_entry(&self, path: &str) -> Option<CachedEntry>;
}

/// A (path, value) pair as recorded by the mirror.
///
/// The recorded path is the mirror's own representation of the node and is
/// reported alongside the value: a path mismatch is a divergence in its own
/// right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry {
    /// Path under which the mirror filed the node.
    pub path: String,
    /// Payload the mirror last saw for the node.
    pub value: String,
}

impl CachedEntry {
    /// Builds an entry from its parts.
    #[must_use]
    pub fn new(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }
}

impl<T> RegistryReader for Arc<T>
where
    T: RegistryReader,
{
    fn get(&self, path: &str) -> Result<Option<String>, RegistryError> {
        (**self).get(path)
    }

    fn children_keys(&self, path: &str) -> Result<Vec<String>, RegistryError> {
        (**self).children_keys(path)
    }
}

impl<T> CachedMirror for Arc<T>
where
    T: CachedMirror,
{
    fn current_entry(&self, path: &str) -> Option<CachedEntry> {
        (**self).current_entry(path)
    }
}

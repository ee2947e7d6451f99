//! Consistency dump of the job's registry subtree.
//!
//! The walk reconciles two views of the same tree: direct synchronous reads
//! against the backend and the watch-driven cached mirror. Each node yields
//! one report line; nodes where the views disagree carry all four fields so
//! an operator can see exactly what the mirror holds.

use std::fmt;

use lattice_registry::{CachedMirror, RegistryError, RegistryReader, path};

/// One line of dump output for a single registry node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpEntry {
    /// Direct read and mirror agree on both path and value.
    Consistent {
        /// Path of the node.
        path: String,
        /// Agreed value.
        value: String,
    },
    /// Direct read and mirror disagree on path, value, or both.
    ///
    /// Empty cached fields mean the mirror has not observed the node at all.
    Divergent {
        /// Path of the node as walked.
        path: String,
        /// Value from the direct backend read.
        direct_value: String,
        /// Path under which the mirror filed the node.
        cached_path: String,
        /// Value the mirror last saw.
        cached_value: String,
    },
}

impl fmt::Display for DumpEntry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Consistent { path, value } => write!(formatter, "{path} | {value}"),
            Self::Divergent {
                path,
                direct_value,
                cached_path,
                cached_value,
            } => write!(
                formatter,
                "{path} | {direct_value} | {cached_path} | {cached_value}"
            ),
        }
    }
}

/// Dumps the subtree rooted at `root`, depth-first and pre-order.
///
/// Children are visited in whatever order the backend lists them; a node's
/// own comparison line precedes its children's. A node the mirror has not
/// observed is reported as divergent with empty cached fields, and a node
/// without payload reads as the empty string, so one stale or racing node
/// never aborts the rest of the report. Backend faults do abort the walk.
pub fn dump_tree(
    registry: &dyn RegistryReader,
    mirror: &dyn CachedMirror,
    root: &str,
) -> Result<Vec<DumpEntry>, RegistryError> {
    let mut entries = Vec::new();
    for key in registry.children_keys(root)? {
        let child = path::child_of(root, &key);
        let direct_value = registry.get(&child)?.unwrap_or_default();
        entries.push(compare(&child, direct_value, mirror));
        entries.extend(dump_tree(registry, mirror, &child)?);
    }
    Ok(entries)
}

fn compare(child: &str, direct_value: String, mirror: &dyn CachedMirror) -> DumpEntry {
    match mirror.current_entry(child) {
        Some(entry) if entry.value == direct_value && entry.path == child => {
            DumpEntry::Consistent {
                path: child.to_owned(),
                value: direct_value,
            }
        }
        Some(entry) => DumpEntry::Divergent {
            path: child.to_owned(),
            direct_value,
            cached_path: entry.path,
            cached_value: entry.value,
        },
        None => DumpEntry::Divergent {
            path: child.to_owned(),
            direct_value,
            cached_path: String::new(),
            cached_value: String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_registry::{CachedEntry, InMemoryMirror, InMemoryRegistry};

    fn rendered(entries: &[DumpEntry]) -> Vec<String> {
        entries.iter().map(ToString::to_string).collect()
    }

    fn mirror_exact(mirror: &InMemoryMirror, path: &str, value: &str) {
        mirror.record(path, CachedEntry::new(path, value));
    }

    #[test]
    fn agreeing_views_yield_consistent_entries_in_pre_order() {
        let registry = InMemoryRegistry::new();
        let mirror = InMemoryMirror::new();
        registry.put("/job/config", "cron=@daily");
        registry.put("/job/servers/alpha", "ready");
        registry.put("/job/servers/beta", "ready");
        mirror_exact(&mirror, "/job/config", "cron=@daily");
        mirror_exact(&mirror, "/job/servers", "");
        mirror_exact(&mirror, "/job/servers/alpha", "ready");
        mirror_exact(&mirror, "/job/servers/beta", "ready");

        let entries = dump_tree(&registry, &mirror, "/job").expect("dump succeeds");
        assert_eq!(
            rendered(&entries),
            vec![
                "/job/config | cron=@daily",
                "/job/servers | ",
                "/job/servers/alpha | ready",
                "/job/servers/beta | ready",
            ]
        );
    }

    #[test]
    fn stale_value_reports_all_four_fields_and_descendants_still_compare() {
        let registry = InMemoryRegistry::new();
        let mirror = InMemoryMirror::new();
        registry.put("/job/servers", "2");
        registry.put("/job/servers/alpha", "ready");
        mirror.record("/job/servers", CachedEntry::new("/job/servers", "1"));
        mirror_exact(&mirror, "/job/servers/alpha", "ready");

        let entries = dump_tree(&registry, &mirror, "/job").expect("dump succeeds");
        assert_eq!(
            rendered(&entries),
            vec![
                "/job/servers | 2 | /job/servers | 1",
                "/job/servers/alpha | ready",
            ]
        );
    }

    #[test]
    fn mismatched_cached_path_is_divergent_even_when_values_agree() {
        let registry = InMemoryRegistry::new();
        let mirror = InMemoryMirror::new();
        registry.put("/job/a", "1");
        mirror.record("/job/a", CachedEntry::new("/stale/a", "1"));

        let entries = dump_tree(&registry, &mirror, "/job").expect("dump succeeds");
        assert_eq!(rendered(&entries), vec!["/job/a | 1 | /stale/a | 1"]);
    }

    #[test]
    fn unobserved_node_is_divergent_with_empty_cached_fields() {
        let registry = InMemoryRegistry::new();
        let mirror = InMemoryMirror::new();
        registry.put("/job/fresh", "1");

        let entries = dump_tree(&registry, &mirror, "/job").expect("dump succeeds");
        assert_eq!(rendered(&entries), vec!["/job/fresh | 1 |  | "]);
    }

    #[test]
    fn empty_subtree_dumps_nothing() {
        let registry = InMemoryRegistry::new();
        let mirror = InMemoryMirror::new();

        let entries = dump_tree(&registry, &mirror, "/job").expect("dump succeeds");
        assert!(entries.is_empty());
    }

    #[test]
    fn sample_job_scenario_matches_the_wire_format() {
        let registry = InMemoryRegistry::new();
        let mirror = InMemoryMirror::new();
        registry.put("/sampleJob/a", "1");
        registry.put("/sampleJob/b", "2");
        mirror.record("/sampleJob/a", CachedEntry::new("/sampleJob/a", "1"));
        mirror.record("/sampleJob/b", CachedEntry::new("/sampleJob/b", "9"));

        let entries = dump_tree(&registry, &mirror, "/sampleJob").expect("dump succeeds");
        assert_eq!(
            rendered(&entries),
            vec!["/sampleJob/a | 1", "/sampleJob/b | 2 | /sampleJob/b | 9"]
        );
    }
}

//! Path arithmetic for the job's registry subtree.
//!
//! Registry paths are slash-separated and rooted at `/<jobName>`; a child
//! path is its parent plus `/` plus the child key.

/// Root path of the named job's subtree.
#[must_use]
pub fn job_root(job_name: &str) -> String {
    format!("/{job_name}")
}

/// Path of `key` directly below `parent`.
#[must_use]
pub fn child_of(parent: &str, key: &str) -> String {
    format!("{parent}/{key}")
}

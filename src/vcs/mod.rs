// src/vcs/mod.rs

//! Version-control capabilities the attribution pipeline consumes.
//!
//! Everything above this module talks to a repository only through
//! [`VcsProvider`], so another backend can be swapped in without touching
//! the extractor.

mod git2_provider;

pub use git2_provider::Git2Provider;

use crate::error::VcsError;
use crate::model::{BlameMap, CommitId, CommitInfo, FileChange};

pub trait VcsProvider {
    /// Resolves a revision specifier (full or abbreviated id, ref name, `id~1`, ...).
    fn resolve_revision(&self, spec: &str) -> Result<CommitId, VcsError>;

    /// Commits reachable from `start`, newest first.
    fn enumerate_commits(&self, start: &str) -> Result<Vec<CommitId>, VcsError>;

    fn commit_info(&self, id: &str) -> Result<CommitInfo, VcsError>;

    /// File-level changes between two commits, with rename detection.
    fn diff_trees(&self, old: &str, new: &str) -> Result<Vec<FileChange>, VcsError>;

    /// Raw contents of `path` at `revision`.
    fn fetch_blob(&self, revision: &str, path: &str) -> Result<String, VcsError>;

    /// Per-line origin of `path` as of `start`, following renames and
    /// ignoring whitespace-only changes.
    fn blame(&self, start: &str, path: &str) -> Result<BlameMap, VcsError>;
}

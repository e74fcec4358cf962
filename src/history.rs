// src/history.rs

use crate::error::VcsError;
use crate::model::CommitId;
use crate::vcs::VcsProvider;
use std::collections::HashSet;
use std::io::{self, BufRead};
use tracing::{debug, warn};

/// The externally supplied set of bug-fixing commit ids.
///
/// Only membership is ever asked of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixCommitSet {
    ids: HashSet<CommitId>,
}

impl FixCommitSet {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CommitId>,
    {
        Self { ids: ids.into_iter().map(Into::into).collect() }
    }

    /// One id per line. The first comma- or whitespace-separated token of a
    /// line is the id; blank lines and `#` comments are skipped.
    pub fn from_reader<R: BufRead>(input: R) -> io::Result<Self> {
        let mut ids = HashSet::new();
        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(token) = line.split(|c: char| c == ',' || c.is_whitespace()).next() {
                if !token.is_empty() {
                    ids.insert(token.to_string());
                }
            }
        }
        Ok(Self { ids })
    }

    /// Expands every id to the full id the provider resolves it to.
    /// Ids that do not resolve are logged and dropped.
    pub fn resolve<P: VcsProvider + ?Sized>(self, provider: &P) -> Self {
        let ids = self
            .ids
            .into_iter()
            .filter_map(|id| match provider.resolve_revision(&id) {
                Ok(full) => Some(full),
                Err(e) => {
                    warn!(id = %id, error = %e, "dropping unresolvable fix commit");
                    None
                }
            })
            .collect();
        Self { ids }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Result of walking the history once
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryScan {
    /// Number of commits enumerated
    pub scanned: usize,
    /// Fix commits in log order (newest first)
    pub fix_commits: Vec<CommitId>,
}

/// Walks history from `start` and keeps the commits in `fixes`.
pub fn find_fix_commits<P: VcsProvider + ?Sized>(
    provider: &P,
    start: &str,
    fixes: &FixCommitSet,
) -> Result<HistoryScan, VcsError> {
    let commits = provider.enumerate_commits(start)?;
    let scanned = commits.len();
    let fix_commits: Vec<CommitId> = commits.into_iter().filter(|id| fixes.contains(id)).collect();
    debug!(scanned, fixes = fix_commits.len(), "history walked");
    Ok(HistoryScan { scanned, fix_commits })
}

// src/pairs.rs

//! Before/after file versions around each bug-inducing and bug-fixing commit.

use crate::error::VcsError;
use crate::model::{CommitId, FileChange};
use crate::record::BicRecord;
use crate::vcs::VcsProvider;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// The file states on both sides of an inducing change and of its fix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangePair {
    /// Path before the inducing commit, `None` when that commit created the file
    pub before_bic_path: Option<String>,
    pub bic_path: String,
    pub before_bic_id: CommitId,
    pub bic_id: CommitId,
    pub before_fix_path: String,
    pub fix_path: String,
    pub before_fix_id: CommitId,
    pub fix_id: CommitId,
}

#[derive(Debug, Clone, Default)]
pub struct PairCollection {
    pub pairs: Vec<ChangePair>,
    pub skipped: usize,
}

impl PairCollection {
    /// Number of pairs handed to later stages
    pub fn instance_count(&self) -> usize {
        self.pairs.len()
    }
}

/// Where a path came from across one commit, if the commit touched it.
enum PathOrigin {
    Untouched,
    Created,
    From(String),
}

struct PairBuilder<'a, P: VcsProvider + ?Sized> {
    provider: &'a P,
    diffs: HashMap<(CommitId, CommitId), Vec<FileChange>>,
}

impl<'a, P: VcsProvider + ?Sized> PairBuilder<'a, P> {
    /// First parent of `commit` and the origin of `path` across it.
    /// `Ok(None)` for root commits.
    fn trace(&mut self, commit: &str, path: &str) -> Result<Option<(CommitId, PathOrigin)>, VcsError> {
        let info = self.provider.commit_info(commit)?;
        let Some(parent) = info.first_parent().cloned() else {
            return Ok(None);
        };

        let key = (parent.clone(), info.id.clone());
        if !self.diffs.contains_key(&key) {
            let changes = self.provider.diff_trees(&parent, &info.id)?;
            self.diffs.insert(key.clone(), changes);
        }
        let origin = self.diffs[&key]
            .iter()
            .find(|c| c.new_path.as_deref() == Some(path))
            .map(|c| match &c.old_path {
                Some(old) => PathOrigin::From(old.clone()),
                None => PathOrigin::Created,
            })
            .unwrap_or(PathOrigin::Untouched);
        Ok(Some((parent, origin)))
    }

    fn pair(&mut self, record: &BicRecord) -> Result<Option<ChangePair>, VcsError> {
        let Some((before_bic_id, bic_origin)) = self.trace(&record.origin_commit_id, &record.origin_path)? else {
            debug!(commit = %record.origin_commit_id, "inducing commit has no parent");
            return Ok(None);
        };
        let before_bic_path = match bic_origin {
            PathOrigin::Untouched => {
                debug!(commit = %record.origin_commit_id, path = %record.origin_path, "inducing commit does not touch path");
                return Ok(None);
            }
            PathOrigin::Created => None,
            PathOrigin::From(path) => Some(path),
        };

        let Some((before_fix_id, fix_origin)) = self.trace(&record.fix_commit_id, &record.current_path)? else {
            debug!(commit = %record.fix_commit_id, "fix commit has no parent");
            return Ok(None);
        };
        let PathOrigin::From(before_fix_path) = fix_origin else {
            debug!(commit = %record.fix_commit_id, path = %record.current_path, "fix commit has no prior version of path");
            return Ok(None);
        };

        Ok(Some(ChangePair {
            before_bic_path,
            bic_path: record.origin_path.clone(),
            before_bic_id,
            bic_id: record.origin_commit_id.clone(),
            before_fix_path,
            fix_path: record.current_path.clone(),
            before_fix_id,
            fix_id: record.fix_commit_id.clone(),
        }))
    }
}

/// One pair per distinct `(origin path, origin commit)`, in record order.
/// Records that cannot be paired are counted in `skipped`.
pub fn collect_pairs<P: VcsProvider + ?Sized>(provider: &P, records: &[BicRecord]) -> PairCollection {
    let mut builder = PairBuilder { provider, diffs: HashMap::new() };
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut collection = PairCollection::default();

    for record in records {
        if !seen.insert((record.origin_path.clone(), record.origin_commit_id.clone())) {
            continue;
        }
        match builder.pair(record) {
            Ok(Some(pair)) => collection.pairs.push(pair),
            Ok(None) => collection.skipped += 1,
            Err(e) => {
                collection.skipped += 1;
                warn!(commit = %record.origin_commit_id, error = %e, "cannot pair record");
            }
        }
    }
    collection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::MemoryProvider;
    use pretty_assertions::assert_eq;

    fn record(origin: &str, origin_path: &str, fix: &str, current_path: &str) -> BicRecord {
        BicRecord {
            origin_commit_id: origin.to_string(),
            origin_path: origin_path.to_string(),
            current_path: current_path.to_string(),
            fix_commit_id: fix.to_string(),
            line_in_origin: 1,
            line_in_pre_fix: 1,
            ..BicRecord::default()
        }
    }

    fn history() -> MemoryProvider {
        let mut provider = MemoryProvider::new();
        provider
            .commit("p0", &[], 0, &[("A.java", "class A {}\n")])
            .commit("b1", &["p0"], 10, &[("A.java", "class A { int a; }\n"), ("B.java", "class B {}\n")])
            .commit("c1", &["b1"], 20, &[("A.java", "class A { long a; }\n"), ("C.java", "class B { int b; }\n")])
            .rename("c1", "B.java", "C.java");
        provider
    }

    #[test]
    fn pairs_inducing_and_fixing_versions() {
        let provider = history();
        let collection = collect_pairs(&provider, &[record("b1", "A.java", "c1", "A.java")]);
        assert_eq!(collection.skipped, 0);
        assert_eq!(
            collection.pairs,
            vec![ChangePair {
                before_bic_path: Some("A.java".to_string()),
                bic_path: "A.java".to_string(),
                before_bic_id: "p0".to_string(),
                bic_id: "b1".to_string(),
                before_fix_path: "A.java".to_string(),
                fix_path: "A.java".to_string(),
                before_fix_id: "b1".to_string(),
                fix_id: "c1".to_string(),
            }]
        );
    }

    #[test]
    fn created_file_has_no_before_path_and_rename_is_followed() {
        let provider = history();
        let collection = collect_pairs(&provider, &[record("b1", "B.java", "c1", "C.java")]);
        assert_eq!(collection.instance_count(), 1);
        let pair = &collection.pairs[0];
        assert_eq!(pair.before_bic_path, None);
        assert_eq!(pair.before_fix_path, "B.java");
        assert_eq!(pair.fix_path, "C.java");
    }

    #[test]
    fn duplicates_collapse_and_root_origins_are_skipped() {
        let provider = history();
        let records = vec![
            record("b1", "A.java", "c1", "A.java"),
            record("b1", "A.java", "c1", "A.java"),
            record("p0", "A.java", "c1", "A.java"),
        ];
        let collection = collect_pairs(&provider, &records);
        assert_eq!(collection.instance_count(), 1);
        assert_eq!(collection.skipped, 1);
    }
}

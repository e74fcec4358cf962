// src/testkit.rs

//! In-memory [`VcsProvider`] for unit tests.

use crate::error::VcsError;
use crate::model::{BlameLine, BlameMap, ChangeKind, CommitId, CommitInfo, FileChange};
use crate::vcs::VcsProvider;
use std::collections::{BTreeMap, HashMap};

#[derive(Default)]
pub struct MemoryProvider {
    /// Oldest first
    commits: Vec<CommitInfo>,
    trees: HashMap<CommitId, BTreeMap<String, String>>,
    renames: HashMap<CommitId, Vec<(String, String)>>,
    blames: HashMap<(CommitId, String), BlameMap>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a commit whose tree holds exactly `files`.
    pub fn commit(&mut self, id: &str, parents: &[&str], time: i64, files: &[(&str, &str)]) -> &mut Self {
        self.commits.push(CommitInfo {
            id: id.to_string(),
            parents: parents.iter().map(|p| p.to_string()).collect(),
            author_time: time,
            author_offset_minutes: 0,
            committer_offset_minutes: 0,
        });
        self.trees.insert(
            id.to_string(),
            files.iter().map(|(p, c)| (p.to_string(), c.to_string())).collect(),
        );
        self
    }

    /// Marks `old -> new` as a rename inside commit `id`.
    pub fn rename(&mut self, id: &str, old: &str, new: &str) -> &mut Self {
        self.renames
            .entry(id.to_string())
            .or_default()
            .push((old.to_string(), new.to_string()));
        self
    }

    /// Blames every line of `path` at `rev` to `(commit, path, same line)`.
    pub fn blame_all(&mut self, rev: &str, path: &str, origin: &str, lines: usize) -> &mut Self {
        let mut map = BlameMap::default();
        for index in 0..lines {
            map.lines.insert(
                index,
                BlameLine { commit_id: origin.to_string(), path: path.to_string(), line: index + 1 },
            );
        }
        self.blames.insert((rev.to_string(), path.to_string()), map);
        self
    }
}

impl VcsProvider for MemoryProvider {
    fn resolve_revision(&self, spec: &str) -> Result<CommitId, VcsError> {
        let mut matches = self.commits.iter().filter(|c| c.id.starts_with(spec));
        match (matches.next(), matches.next()) {
            (Some(c), None) => Ok(c.id.clone()),
            _ => Err(VcsError::UnresolvedRevision(spec.to_string())),
        }
    }

    fn enumerate_commits(&self, _start: &str) -> Result<Vec<CommitId>, VcsError> {
        if self.commits.is_empty() {
            return Err(VcsError::EmptyHistory);
        }
        Ok(self.commits.iter().rev().map(|c| c.id.clone()).collect())
    }

    fn commit_info(&self, id: &str) -> Result<CommitInfo, VcsError> {
        self.commits
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| VcsError::UnresolvedRevision(id.to_string()))
    }

    fn diff_trees(&self, old: &str, new: &str) -> Result<Vec<FileChange>, VcsError> {
        let old_tree = self.trees.get(old).ok_or_else(|| VcsError::UnresolvedRevision(old.to_string()))?;
        let new_tree = self.trees.get(new).ok_or_else(|| VcsError::UnresolvedRevision(new.to_string()))?;
        let renames = self.renames.get(new).map(Vec::as_slice).unwrap_or_default();

        let mut changes = Vec::new();
        for (old_path, new_path) in renames {
            changes.push(FileChange {
                old_path: Some(old_path.clone()),
                new_path: Some(new_path.clone()),
                kind: ChangeKind::Renamed,
            });
        }
        let renamed_from = |p: &String| renames.iter().any(|(o, _)| o == p);
        let renamed_to = |p: &String| renames.iter().any(|(_, n)| n == p);

        for (path, content) in new_tree {
            if renamed_to(path) {
                continue;
            }
            match old_tree.get(path) {
                None => changes.push(FileChange { old_path: None, new_path: Some(path.clone()), kind: ChangeKind::Added }),
                Some(before) if before != content => changes.push(FileChange {
                    old_path: Some(path.clone()),
                    new_path: Some(path.clone()),
                    kind: ChangeKind::Modified,
                }),
                Some(_) => {}
            }
        }
        for path in old_tree.keys() {
            if !new_tree.contains_key(path) && !renamed_from(path) {
                changes.push(FileChange { old_path: Some(path.clone()), new_path: None, kind: ChangeKind::Deleted });
            }
        }
        Ok(changes)
    }

    fn fetch_blob(&self, revision: &str, path: &str) -> Result<String, VcsError> {
        self.trees
            .get(revision)
            .and_then(|t| t.get(path))
            .cloned()
            .ok_or_else(|| VcsError::MissingBlob { revision: revision.to_string(), path: path.to_string() })
    }

    fn blame(&self, start: &str, path: &str) -> Result<BlameMap, VcsError> {
        self.blames
            .get(&(start.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| VcsError::UnresolvedRevision(format!("{start}:{path}")))
    }
}

// src/vcs/git2_provider.rs

use super::VcsProvider;
use crate::error::VcsError;
use crate::model::{BlameLine, BlameMap, ChangeKind, CommitId, CommitInfo, FileChange};
use git2::{BlameOptions, Commit, Delta, DiffFindOptions, DiffOptions, ErrorCode, Repository, Sort};
use std::collections::HashMap;
use std::path::Path;

/// [`VcsProvider`] backed by libgit2
pub struct Git2Provider {
    repo: Repository,
}

impl Git2Provider {
    /// Opens the repository containing `path`.
    pub fn open(path: &Path) -> Result<Self, VcsError> {
        let repo = Repository::discover(path)?;
        Ok(Self { repo })
    }

    pub fn from_repository(repo: Repository) -> Self {
        Self { repo }
    }

    fn find_commit(&self, spec: &str) -> Result<Commit<'_>, VcsError> {
        let object = self.repo.revparse_single(spec).map_err(|e| match e.code() {
            ErrorCode::NotFound | ErrorCode::Ambiguous | ErrorCode::InvalidSpec | ErrorCode::UnbornBranch => {
                if spec == "HEAD" && self.repo.is_empty().unwrap_or(false) {
                    VcsError::EmptyHistory
                } else {
                    VcsError::UnresolvedRevision(spec.to_string())
                }
            }
            _ => VcsError::Git(e),
        })?;
        object
            .peel_to_commit()
            .map_err(|_| VcsError::UnresolvedRevision(spec.to_string()))
    }
}

fn path_string(path: Option<&Path>) -> Option<String> {
    path.and_then(|p| p.to_str()).map(String::from)
}

fn change_kind(status: Delta) -> ChangeKind {
    match status {
        Delta::Added => ChangeKind::Added,
        Delta::Deleted => ChangeKind::Deleted,
        Delta::Modified | Delta::Typechange => ChangeKind::Modified,
        Delta::Renamed => ChangeKind::Renamed,
        Delta::Copied => ChangeKind::Copied,
        _ => ChangeKind::Other,
    }
}

impl VcsProvider for Git2Provider {
    fn resolve_revision(&self, spec: &str) -> Result<CommitId, VcsError> {
        Ok(self.find_commit(spec)?.id().to_string())
    }

    fn enumerate_commits(&self, start: &str) -> Result<Vec<CommitId>, VcsError> {
        let head = self.find_commit(start)?.id();
        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(head)?;
        revwalk.set_sorting(Sort::TIME)?;

        let mut commits = Vec::new();
        for oid in revwalk {
            commits.push(oid?.to_string());
        }
        Ok(commits)
    }

    fn commit_info(&self, id: &str) -> Result<CommitInfo, VcsError> {
        let commit = self.find_commit(id)?;
        let author = commit.author().when();
        let committer = commit.committer().when();
        Ok(CommitInfo {
            id: commit.id().to_string(),
            parents: commit.parent_ids().map(|p| p.to_string()).collect(),
            author_time: author.seconds(),
            author_offset_minutes: author.offset_minutes(),
            committer_offset_minutes: committer.offset_minutes(),
        })
    }

    fn diff_trees(&self, old: &str, new: &str) -> Result<Vec<FileChange>, VcsError> {
        let old_tree = self.find_commit(old)?.tree()?;
        let new_tree = self.find_commit(new)?.tree()?;

        let mut diff_opts = DiffOptions::new();
        diff_opts.include_untracked(false);
        diff_opts.ignore_filemode(true);
        diff_opts.ignore_whitespace(true);

        let mut diff = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut diff_opts))?;

        let mut find_opts = DiffFindOptions::new();
        find_opts.renames(true);
        find_opts.ignore_whitespace(true);
        diff.find_similar(Some(&mut find_opts))?;

        let changes = diff
            .deltas()
            .map(|delta| {
                let kind = change_kind(delta.status());
                let old_path = match kind {
                    ChangeKind::Added => None,
                    _ => path_string(delta.old_file().path()),
                };
                let new_path = match kind {
                    ChangeKind::Deleted => None,
                    _ => path_string(delta.new_file().path()),
                };
                FileChange { old_path, new_path, kind }
            })
            .collect();
        Ok(changes)
    }

    fn fetch_blob(&self, revision: &str, path: &str) -> Result<String, VcsError> {
        let tree = self.find_commit(revision)?.tree()?;
        let entry = tree.get_path(Path::new(path)).map_err(|_| VcsError::MissingBlob {
            revision: revision.to_string(),
            path: path.to_string(),
        })?;
        let blob = self.repo.find_blob(entry.id())?;
        Ok(String::from_utf8_lossy(blob.content()).into_owned())
    }

    fn blame(&self, start: &str, path: &str) -> Result<BlameMap, VcsError> {
        let newest = self.find_commit(start)?.id();

        let mut opts = BlameOptions::new();
        opts.newest_commit(newest).ignore_whitespace(true);

        let blame = self.repo.blame_file(Path::new(path), Some(&mut opts))?;

        let mut lines = HashMap::new();
        for hunk in blame.iter() {
            let commit_id = hunk.final_commit_id().to_string();
            let origin_path = path_string(hunk.path()).unwrap_or_else(|| path.to_string());
            // Both start lines are 1-based.
            let final_start = hunk.final_start_line();
            let orig_start = hunk.orig_start_line();

            for offset in 0..hunk.lines_in_hunk() {
                lines.insert(
                    final_start.saturating_sub(1) + offset,
                    BlameLine {
                        commit_id: commit_id.clone(),
                        path: origin_path.clone(),
                        line: orig_start + offset,
                    },
                );
            }
        }
        Ok(BlameMap { lines })
    }
}

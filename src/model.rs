// src/model.rs

use crate::error::VcsError;
use chrono::{FixedOffset, Offset, TimeZone, Utc};
use std::collections::HashMap;
use std::ops::Range;

/// Full hexadecimal object id of a commit
pub type CommitId = String;

/// Format shared by every timestamp written into a BIC record
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How a contiguous span of lines differs between two texts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// Lines exist only in the new text
    Insert,
    /// Lines exist only in the old text
    Delete,
    /// Old lines were rewritten into new lines
    Replace,
}

/// A changed span, as half-open 0-based line ranges on both sides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditRegion {
    pub kind: EditKind,
    pub begin_old: usize,
    pub end_old: usize,
    pub begin_new: usize,
    pub end_new: usize,
}

impl EditRegion {
    pub fn old_range(&self) -> Range<usize> {
        self.begin_old..self.end_old
    }

    pub fn new_range(&self) -> Range<usize> {
        self.begin_new..self.end_new
    }

    /// True when the region touches lines of the old text
    pub fn removes_lines(&self) -> bool {
        self.kind != EditKind::Insert
    }
}

/// File-level change kind reported by a tree diff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Deleted,
    Modified,
    Renamed,
    Copied,
    Other,
}

/// One entry of a tree diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// Path in the old tree, `None` when the file did not exist there
    pub old_path: Option<String>,
    /// Path in the new tree, `None` when the file was removed
    pub new_path: Option<String>,
    pub kind: ChangeKind,
}

/// The parts of a commit the pipeline needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub id: CommitId,
    pub parents: Vec<CommitId>,
    /// Author time in seconds since the epoch
    pub author_time: i64,
    pub author_offset_minutes: i32,
    pub committer_offset_minutes: i32,
}

impl CommitInfo {
    pub fn first_parent(&self) -> Option<&CommitId> {
        self.parents.first()
    }

    /// Author time rendered in the committer's time zone.
    pub fn formatted_date(&self) -> Result<String, VcsError> {
        let offset = FixedOffset::east_opt(self.committer_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix());
        match offset.timestamp_opt(self.author_time, 0).single() {
            Some(time) => Ok(time.format(DATE_FORMAT).to_string()),
            None => Err(VcsError::InvalidTimestamp {
                commit: self.id.clone(),
                seconds: self.author_time,
            }),
        }
    }
}

/// Where a single line came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlameLine {
    pub commit_id: CommitId,
    /// Path of the file in the origin commit
    pub path: String,
    /// 1-based line number in the origin commit
    pub line: usize,
}

/// Line attribution for one file at one revision, keyed by 0-based line index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlameMap {
    pub lines: HashMap<usize, BlameLine>,
}

impl BlameMap {
    pub fn get(&self, index: usize) -> Option<&BlameLine> {
        self.lines.get(&index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A fix commit together with its parent and the eligible file changes between them
#[derive(Debug, Clone)]
pub struct FixCommitContext {
    pub fix: CommitInfo,
    pub parent: CommitInfo,
    pub changes: Vec<FileChange>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(time: i64, committer_offset: i32) -> CommitInfo {
        CommitInfo {
            id: "abc".to_string(),
            parents: vec![],
            author_time: time,
            author_offset_minutes: 0,
            committer_offset_minutes: committer_offset,
        }
    }

    #[test]
    fn formats_in_utc() {
        assert_eq!(commit(1_577_836_800, 0).formatted_date().unwrap(), "2020-01-01 00:00:00");
    }

    #[test]
    fn formats_in_committer_zone() {
        // +09:00
        assert_eq!(commit(1_577_836_800, 540).formatted_date().unwrap(), "2020-01-01 09:00:00");
        // -05:00
        assert_eq!(commit(1_577_836_800, -300).formatted_date().unwrap(), "2019-12-31 19:00:00");
    }

    #[test]
    fn out_of_range_timestamp_is_an_error() {
        let err = commit(i64::MAX, 0).formatted_date().unwrap_err();
        assert!(matches!(err, VcsError::InvalidTimestamp { seconds: i64::MAX, .. }));
    }

    #[test]
    fn insert_regions_do_not_remove_lines() {
        let region = EditRegion { kind: EditKind::Insert, begin_old: 2, end_old: 2, begin_new: 2, end_new: 4 };
        assert!(!region.removes_lines());
        assert!(region.old_range().is_empty());
        assert_eq!(region.new_range().len(), 2);
    }
}

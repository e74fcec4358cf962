// src/diff.rs

use crate::model::{EditKind, EditRegion};
use similar::{capture_diff_slices, Algorithm, DiffTag};

/// Comparison key for a line: the line with every whitespace character removed.
///
/// Two lines are "the same" for diffing whenever their keys are equal, so
/// re-indentation and spacing changes never register as edits.
pub fn line_key(line: &str) -> String {
    line.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Splits text into lines the same way for diffing and for lookups.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

/// Whitespace-insensitive Myers line diff.
///
/// Regions come back in ascending old-text order. Adjacent deletions and
/// insertions are merged into a single `Replace` region.
pub fn diff(old_text: &str, new_text: &str) -> Vec<EditRegion> {
    let old: Vec<String> = split_lines(old_text).into_iter().map(line_key).collect();
    let new: Vec<String> = split_lines(new_text).into_iter().map(line_key).collect();

    let mut regions: Vec<EditRegion> = Vec::new();
    for op in capture_diff_slices(Algorithm::Myers, &old, &new) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        let kind = match tag {
            DiffTag::Equal => continue,
            DiffTag::Insert => EditKind::Insert,
            DiffTag::Delete => EditKind::Delete,
            DiffTag::Replace => EditKind::Replace,
        };
        let region = EditRegion {
            kind,
            begin_old: old_range.start,
            end_old: old_range.end,
            begin_new: new_range.start,
            end_new: new_range.end,
        };

        match regions.last_mut() {
            Some(last) if last.end_old == region.begin_old && last.end_new == region.begin_new => {
                last.end_old = region.end_old;
                last.end_new = region.end_new;
                last.kind = merged_kind(last);
            }
            _ => regions.push(region),
        }
    }
    regions
}

fn merged_kind(region: &EditRegion) -> EditKind {
    match (region.old_range().is_empty(), region.new_range().is_empty()) {
        (true, _) => EditKind::Insert,
        (false, true) => EditKind::Delete,
        (false, false) => EditKind::Replace,
    }
}

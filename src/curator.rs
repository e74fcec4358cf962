// src/curator.rs

use crate::record::BicRecord;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::info;

/// What to do with records that share a `(current path, fix commit)` key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupPolicy {
    /// Keep every record
    Off,
    /// Keep the first record of each key, in encounter order
    KeepFirst,
    /// Drop every record whose key occurs more than once
    #[default]
    DropAll,
}

/// The final record sequence and how many records deduplication removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Curated {
    pub records: Vec<BicRecord>,
    pub dropped: usize,
}

/// Origin date, then current path, then fix date, then origin line number.
pub fn compare(a: &BicRecord, b: &BicRecord) -> Ordering {
    a.origin_date
        .cmp(&b.origin_date)
        .then_with(|| a.current_path.cmp(&b.current_path))
        .then_with(|| a.fix_date.cmp(&b.fix_date))
        .then_with(|| a.line_in_origin.cmp(&b.line_in_origin))
}

/// Deduplicates by `policy`, then sorts. The sort is stable, so records equal
/// on all four keys stay in encounter order.
pub fn curate(records: Vec<BicRecord>, policy: DedupPolicy) -> Curated {
    let before = records.len();
    let mut records = dedup(records, policy);
    records.sort_by(compare);

    let dropped = before - records.len();
    if dropped > 0 {
        info!(dropped, ?policy, "removed duplicate (path, fix commit) records");
    }
    Curated { records, dropped }
}

fn dedup(records: Vec<BicRecord>, policy: DedupPolicy) -> Vec<BicRecord> {
    match policy {
        DedupPolicy::Off => records,
        DedupPolicy::KeepFirst => {
            let mut seen: HashSet<(String, String)> = HashSet::new();
            records
                .into_iter()
                .filter(|r| seen.insert((r.current_path.clone(), r.fix_commit_id.clone())))
                .collect()
        }
        DedupPolicy::DropAll => {
            let keep: Vec<bool> = {
                let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
                for r in &records {
                    *counts.entry((r.current_path.as_str(), r.fix_commit_id.as_str())).or_default() += 1;
                }
                records
                    .iter()
                    .map(|r| counts[&(r.current_path.as_str(), r.fix_commit_id.as_str())] == 1)
                    .collect()
            };
            records
                .into_iter()
                .zip(keep)
                .filter_map(|(r, keep)| keep.then_some(r))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(origin_date: &str, path: &str, fix: &str, line: usize) -> BicRecord {
        BicRecord {
            origin_date: origin_date.to_string(),
            current_path: path.to_string(),
            fix_commit_id: fix.to_string(),
            fix_date: "2021-01-01 00:00:00".to_string(),
            line_in_origin: line,
            line_in_pre_fix: line,
            is_substantive_edit: true,
            ..BicRecord::default()
        }
    }

    #[test]
    fn orders_by_date_then_path() {
        let r1 = record("2020-01-01 00:00:00", "B.java", "f1", 1);
        let r2 = record("2020-01-02 00:00:00", "A.java", "f2", 1);
        let r3 = record("2020-01-01 00:00:00", "A.java", "f3", 1);
        let curated = curate(vec![r1.clone(), r2.clone(), r3.clone()], DedupPolicy::Off);
        assert_eq!(curated.records, vec![r3, r1, r2]);
        assert_eq!(curated.dropped, 0);
    }

    #[test]
    fn fix_date_and_line_break_ties() {
        let mut late = record("2020-01-01 00:00:00", "A.java", "f1", 1);
        late.fix_date = "2022-01-01 00:00:00".to_string();
        let line9 = record("2020-01-01 00:00:00", "A.java", "f2", 9);
        let line2 = record("2020-01-01 00:00:00", "A.java", "f3", 2);
        let curated = curate(vec![late.clone(), line9.clone(), line2.clone()], DedupPolicy::Off);
        assert_eq!(curated.records, vec![line2, line9, late]);
    }

    #[test]
    fn full_ties_keep_encounter_order() {
        let mut a = record("2020-01-01 00:00:00", "A.java", "f1", 3);
        a.line_text = "first".to_string();
        let mut b = a.clone();
        b.line_text = "second".to_string();
        let curated = curate(vec![a.clone(), b.clone()], DedupPolicy::Off);
        assert_eq!(curated.records, vec![a, b]);
    }

    #[test]
    fn drop_all_removes_every_member_of_a_duplicated_key() {
        let records = vec![
            record("2020-01-01 00:00:00", "A.java", "f1", 1),
            record("2020-01-01 00:00:00", "A.java", "f1", 2),
            record("2020-01-01 00:00:00", "B.java", "f1", 1),
        ];
        let curated = curate(records, DedupPolicy::DropAll);
        assert_eq!(curated.records.len(), 1);
        assert_eq!(curated.records[0].current_path, "B.java");
        assert_eq!(curated.dropped, 2);
    }

    #[test]
    fn keep_first_keeps_one_per_key() {
        let records = vec![
            record("2020-01-03 00:00:00", "A.java", "f1", 5),
            record("2020-01-01 00:00:00", "A.java", "f1", 2),
            record("2020-01-01 00:00:00", "A.java", "f2", 1),
        ];
        let curated = curate(records, DedupPolicy::KeepFirst);
        assert_eq!(curated.dropped, 1);
        let lines: Vec<usize> = curated.records.iter().map(|r| r.line_in_origin).collect();
        assert_eq!(lines, vec![1, 5]);
    }
}

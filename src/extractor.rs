// src/extractor.rs

use crate::blame::BlameAttributor;
use crate::comments::{self, CommentScanner, JavaCommentScanner};
use crate::diff::{self, split_lines};
use crate::error::{CommentError, Error, VcsError};
use crate::history::{self, FixCommitSet};
use crate::model::*;
use crate::record::BicRecord;
use crate::vcs::VcsProvider;
use indicatif::ProgressBar;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Which files of a fix commit are worth attributing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Suffix a path must end with, e.g. `.java`
    pub source_extension: String,
    /// Paths containing this are treated as tests and skipped
    pub test_marker: String,
    pub use_blame_cache: bool,
    pub show_progress: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            source_extension: ".java".to_string(),
            test_marker: "Test".to_string(),
            use_blame_cache: true,
            show_progress: false,
        }
    }
}

impl ExtractorConfig {
    /// A change is eligible when the file existed before the fix, still exists
    /// after it, is not a test, and is a source file of the target language.
    pub fn is_eligible(&self, change: &FileChange) -> bool {
        let (Some(_), Some(new_path)) = (&change.old_path, &change.new_path) else {
            return false;
        };
        if matches!(change.kind, ChangeKind::Added | ChangeKind::Deleted) {
            return false;
        }
        !new_path.contains(self.test_marker.as_str()) && new_path.ends_with(self.source_extension.as_str())
    }
}

/// Counters describing one extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub commits_scanned: usize,
    pub fix_commits: usize,
    pub root_fix_commits: usize,
    pub failed_fix_commits: usize,
    pub files_considered: usize,
    pub files_ineligible: usize,
    pub files_failed: usize,
    pub deleted_lines: usize,
    /// Lines only inserted by a fix; counted, never attributed
    pub inserted_lines: usize,
    pub blank_lines_rejected: usize,
    pub unattributed_lines: usize,
    pub blame_cache_hits: usize,
    pub records: usize,
}

/// Records produced by a run, before curation
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub records: Vec<BicRecord>,
    pub stats: ExtractionStats,
}

/// Old-side indices of deleted or replaced lines and new-side indices of
/// purely inserted lines, both 0-based and ascending
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinePartition {
    pub deleted: Vec<usize>,
    pub inserted: Vec<usize>,
}

pub fn partition_regions(regions: &[EditRegion]) -> LinePartition {
    let mut partition = LinePartition::default();
    for region in regions {
        if region.removes_lines() {
            partition.deleted.extend(region.old_range());
        } else {
            partition.inserted.extend(region.new_range());
        }
    }
    partition
}

pub struct BicExtractor<'a, P: VcsProvider + ?Sized> {
    provider: &'a P,
    config: ExtractorConfig,
    scanner: Box<dyn CommentScanner>,
    blame: BlameAttributor<'a, P>,
    origin_dates: HashMap<CommitId, String>,
}

impl<'a, P: VcsProvider + ?Sized> BicExtractor<'a, P> {
    /// Extractor for Java sources.
    pub fn new(provider: &'a P, config: ExtractorConfig) -> Result<Self, CommentError> {
        let scanner = JavaCommentScanner::new()?;
        Ok(Self::with_scanner(provider, config, Box::new(scanner)))
    }

    pub fn with_scanner(provider: &'a P, config: ExtractorConfig, scanner: Box<dyn CommentScanner>) -> Self {
        let blame = BlameAttributor::new(provider, config.use_blame_cache);
        Self {
            provider,
            config,
            scanner,
            blame,
            origin_dates: HashMap::new(),
        }
    }

    /// Attributes every line removed by a fix commit reachable from `start`.
    pub fn run(&mut self, start: &str, fixes: &FixCommitSet) -> Result<Extraction, VcsError> {
        // 1. Find the fix commits in log order
        let scan = history::find_fix_commits(self.provider, start, fixes)?;
        info!(scanned = scan.scanned, fixes = scan.fix_commits.len(), "collecting bug-inducing changes");

        let mut extraction = Extraction::default();
        extraction.stats.commits_scanned = scan.scanned;

        let bar = if self.config.show_progress {
            ProgressBar::new(scan.fix_commits.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        bar.set_message("Attributing fix commits");

        // 2. Attribute each fix commit on its own; failures only cost that commit
        for fix_id in &scan.fix_commits {
            extraction.stats.fix_commits += 1;
            match self.fix_context(fix_id, &mut extraction.stats) {
                Ok(Some(context)) => {
                    let records = self.extract_commit(&context, &mut extraction.stats);
                    extraction.records.extend(records);
                }
                Ok(None) => {
                    extraction.stats.root_fix_commits += 1;
                    debug!(commit = %fix_id, "skipping root fix commit");
                }
                Err(e) => {
                    extraction.stats.failed_fix_commits += 1;
                    warn!(commit = %fix_id, error = %e, "skipping fix commit");
                }
            }
            bar.inc(1);
        }
        bar.finish_with_message("Attribution complete");

        extraction.stats.blame_cache_hits = self.blame.cache_hits();
        extraction.stats.records = extraction.records.len();
        Ok(extraction)
    }

    /// Loads the fix commit, its first parent and the eligible file changes.
    /// Returns `None` for a root commit.
    pub fn fix_context(&self, fix_id: &str, stats: &mut ExtractionStats) -> Result<Option<FixCommitContext>, VcsError> {
        let fix = self.provider.commit_info(fix_id)?;
        let Some(parent_id) = fix.first_parent() else {
            return Ok(None);
        };
        let parent = self.provider.commit_info(parent_id)?;

        let all = self.provider.diff_trees(&parent.id, &fix.id)?;
        let total = all.len();
        let changes: Vec<FileChange> = all.into_iter().filter(|c| self.config.is_eligible(c)).collect();
        stats.files_considered += total;
        stats.files_ineligible += total - changes.len();

        Ok(Some(FixCommitContext { fix, parent, changes }))
    }

    /// Records for every eligible file of one fix commit.
    pub fn extract_commit(&mut self, context: &FixCommitContext, stats: &mut ExtractionStats) -> Vec<BicRecord> {
        let mut records = Vec::new();
        for change in &context.changes {
            match self.extract_file(context, change, stats) {
                Ok(file_records) => records.extend(file_records),
                Err(e) => {
                    stats.files_failed += 1;
                    warn!(
                        commit = %context.fix.id,
                        path = change.new_path.as_deref().unwrap_or_default(),
                        error = %e,
                        "skipping file"
                    );
                }
            }
        }
        records
    }

    fn extract_file(
        &mut self,
        context: &FixCommitContext,
        change: &FileChange,
        stats: &mut ExtractionStats,
    ) -> Result<Vec<BicRecord>, Error> {
        let (Some(old_path), Some(new_path)) = (change.old_path.as_deref(), change.new_path.as_deref()) else {
            return Ok(Vec::new());
        };

        // 1. Comment-free text on both sides of the fix
        let pre_fix_raw = self.provider.fetch_blob(&context.parent.id, old_path)?;
        let fix_raw = self.provider.fetch_blob(&context.fix.id, new_path)?;
        let pre_fix = comments::normalize(&pre_fix_raw, self.scanner.as_mut())?;
        let fixed = comments::normalize(&fix_raw, self.scanner.as_mut())?;

        // 2. Which old lines the fix removed or rewrote
        let regions = diff::diff(&pre_fix, &fixed);
        let partition = partition_regions(&regions);
        stats.deleted_lines += partition.deleted.len();
        stats.inserted_lines += partition.inserted.len();
        debug!(
            path = new_path,
            regions = regions.len(),
            deleted = partition.deleted.len(),
            inserted = partition.inserted.len(),
            "diffed file"
        );
        if partition.deleted.is_empty() {
            return Ok(Vec::new());
        }

        // 3. Blame the pre-fix file once and look each removed line up
        let blame = self.blame.blame(&context.parent.id, old_path)?;
        let pre_fix_lines = split_lines(&pre_fix);
        let fix_date = context.fix.formatted_date()?;

        let mut records = Vec::new();
        for index in partition.deleted {
            let text = pre_fix_lines.get(index).map(|l| l.trim()).unwrap_or_default();
            if text.is_empty() {
                stats.blank_lines_rejected += 1;
                continue;
            }
            let Some(origin) = blame.get(index) else {
                stats.unattributed_lines += 1;
                debug!(path = old_path, line = index + 1, "no blame for line");
                continue;
            };

            records.push(BicRecord {
                origin_commit_id: origin.commit_id.clone(),
                origin_path: origin.path.clone(),
                current_path: new_path.to_string(),
                fix_commit_id: context.fix.id.clone(),
                origin_date: self.origin_date(&origin.commit_id)?,
                fix_date: fix_date.clone(),
                line_in_origin: origin.line,
                line_in_pre_fix: index + 1,
                is_substantive_edit: true,
                line_text: text.to_string(),
            });
        }
        Ok(records)
    }

    fn origin_date(&mut self, commit_id: &str) -> Result<String, VcsError> {
        if let Some(date) = self.origin_dates.get(commit_id) {
            return Ok(date.clone());
        }
        let date = self.provider.commit_info(commit_id)?.formatted_date()?;
        self.origin_dates.insert(commit_id.to_string(), date.clone());
        Ok(date)
    }
}

// src/vectorize.rs

//! Structural edit-action counts from an external AST differencing tool.

use crate::error::VectorizeError;
use crate::model::CommitId;
use crate::pairs::ChangePair;
use crate::vcs::VcsProvider;
use indicatif::ProgressBar;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tracing::warn;

/// Edit-action name to number of occurrences
pub type ActionCounts = BTreeMap<String, u64>;

pub trait ChangeVectorizer {
    fn vectorize(&self, old_text: &str, new_text: &str) -> Result<ActionCounts, VectorizeError>;
}

/// Runs `program [args..] <old file> <new file>` and reads `<action> <count>`
/// lines from its standard output.
#[derive(Debug, Clone)]
pub struct CommandVectorizer {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Suffix of the staged files, so the tool can pick a parser
    pub suffix: String,
}

impl CommandVectorizer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            suffix: ".java".to_string(),
        }
    }

    fn stage(&self, text: &str) -> Result<tempfile::NamedTempFile, VectorizeError> {
        let mut file = tempfile::Builder::new().suffix(&self.suffix).tempfile()?;
        file.write_all(text.as_bytes())?;
        file.flush()?;
        Ok(file)
    }
}

impl ChangeVectorizer for CommandVectorizer {
    fn vectorize(&self, old_text: &str, new_text: &str) -> Result<ActionCounts, VectorizeError> {
        let old = self.stage(old_text)?;
        let new = self.stage(new_text)?;

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(old.path())
            .arg(new.path())
            .output()?;

        if !output.status.success() {
            return Err(VectorizeError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        parse_action_counts(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parses `<action> <count>` lines. `<action>:` is accepted too, and repeated
/// actions are summed.
pub fn parse_action_counts(text: &str) -> Result<ActionCounts, VectorizeError> {
    let mut counts = ActionCounts::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let mut parts = line.split_whitespace();
        let (Some(action), Some(count), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(VectorizeError::MalformedOutput(line.to_string()));
        };
        let count: u64 = count
            .parse()
            .map_err(|_| VectorizeError::MalformedOutput(line.to_string()))?;
        let action = action.trim_end_matches(':');
        if action.is_empty() {
            return Err(VectorizeError::MalformedOutput(line.to_string()));
        }
        *counts.entry(action.to_string()).or_default() += count;
    }
    Ok(counts)
}

/// Action counts for the inducing change of one pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeVector {
    /// Position of the pair in its collection
    pub index: usize,
    pub bic_id: CommitId,
    pub bic_path: String,
    pub counts: ActionCounts,
}

/// Vectorizes the before-BIC to BIC change of every pair. Pairs whose files
/// cannot be loaded or whose vectorizer run fails are skipped.
pub fn vectorize_pairs<P: VcsProvider + ?Sized>(
    provider: &P,
    vectorizer: &dyn ChangeVectorizer,
    pairs: &[ChangePair],
    instance_count: usize,
    show_progress: bool,
) -> Vec<ChangeVector> {
    let bar = if show_progress {
        ProgressBar::new(instance_count as u64)
    } else {
        ProgressBar::hidden()
    };
    bar.set_message("Vectorizing changes");

    let mut vectors = Vec::with_capacity(instance_count);
    for (index, pair) in pairs.iter().enumerate() {
        match vectorize_pair(provider, vectorizer, pair) {
            Ok(counts) => vectors.push(ChangeVector {
                index,
                bic_id: pair.bic_id.clone(),
                bic_path: pair.bic_path.clone(),
                counts,
            }),
            Err(e) => warn!(commit = %pair.bic_id, path = %pair.bic_path, error = %e, "skipping change pair"),
        }
        bar.inc(1);
    }
    bar.finish_with_message("Vectorizing complete");
    vectors
}

fn vectorize_pair<P: VcsProvider + ?Sized>(
    provider: &P,
    vectorizer: &dyn ChangeVectorizer,
    pair: &ChangePair,
) -> crate::error::Result<ActionCounts> {
    let before = match &pair.before_bic_path {
        Some(path) => provider.fetch_blob(&pair.before_bic_id, path)?,
        None => String::new(),
    };
    let after = provider.fetch_blob(&pair.bic_id, &pair.bic_path)?;
    Ok(vectorizer.vectorize(&before, &after)?)
}

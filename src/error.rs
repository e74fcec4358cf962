// src/error.rs

use thiserror::Error;

/// Failures raised by a version-control provider.
///
/// All of these are recoverable from the pipeline's point of view: the
/// caller drops the file (or commit) that triggered them and moves on.
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("cannot resolve revision `{0}`")]
    UnresolvedRevision(String),
    #[error("`{path}` does not exist at {revision}")]
    MissingBlob { revision: String, path: String },
    #[error("repository has no history")]
    EmptyHistory,
    #[error("commit {commit} has an out-of-range timestamp {seconds}")]
    InvalidTimestamp { commit: String, seconds: i64 },
    #[error(transparent)]
    Git(#[from] git2::Error),
}

/// Failures while locating comments in a source file
#[derive(Debug, Error)]
pub enum CommentError {
    #[error("comment scanner could not be initialised: {0}")]
    Language(String),
    #[error("source could not be parsed")]
    Unparsable,
    #[error("malformed source near byte {offset}")]
    Malformed { offset: usize },
}

/// A persisted BIC record that does not match any supported layout
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordParseError {
    #[error("expected 2, 9 or at least 10 tab-separated fields, found {0}")]
    FieldCount(usize),
    #[error("field `{field}` is not a line number: `{value}`")]
    LineNumber { field: &'static str, value: String },
    #[error("field `{field}` is not a boolean: `{value}`")]
    Flag { field: &'static str, value: String },
}

/// Failures of the external change vectorizer
#[derive(Debug, Error)]
pub enum VectorizeError {
    #[error("failed to stage input files: {0}")]
    Io(#[from] std::io::Error),
    #[error("vectorizer exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("malformed vectorizer output line `{0}`")]
    MalformedOutput(String),
}

/// Errors surfaced to callers of the pipeline
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Vcs(#[from] VcsError),
    #[error(transparent)]
    Comment(#[from] CommentError),
    #[error(transparent)]
    Record(#[from] RecordParseError),
    #[error(transparent)]
    Vectorize(#[from] VectorizeError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

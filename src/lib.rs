// src/lib.rs

//! Attribution of bug-fixing commits back to the commits that introduced the
//! lines they removed.

pub mod blame;
pub mod comments;
pub mod curator;
pub mod diff;
pub mod error;
pub mod extractor;
pub mod history;
pub mod model;
pub mod pairs;
pub mod record;
pub mod vcs;
pub mod vectorize;

#[cfg(test)]
pub(crate) mod testkit;

pub use curator::{curate, Curated, DedupPolicy};
pub use error::{Error, Result};
pub use extractor::{BicExtractor, Extraction, ExtractionStats, ExtractorConfig};
pub use history::FixCommitSet;
pub use record::{read_records, write_records, BicRecord, OutputFormat};
pub use vcs::{Git2Provider, VcsProvider};

// src/cli.rs

use bic_miner::{DedupPolicy, OutputFormat};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the git repository to mine
    #[arg(short, long, env = "BIC_REPO")]
    pub repo: PathBuf,

    /// File listing bug-fixing commit ids, one per line
    #[arg(short, long, env = "BIC_FIX_COMMITS")]
    pub fix_commits: PathBuf,

    /// Where to write the records (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Revision the history walk starts from
    #[arg(long, default_value = "HEAD")]
    pub rev: String,

    /// Only files ending with this suffix are attributed
    #[arg(long, default_value = ".java")]
    pub extension: String,

    /// Files whose path contains this are skipped as tests
    #[arg(long, default_value = "Test")]
    pub test_marker: String,

    /// Handling of records sharing a path and fix commit
    #[arg(long, value_enum, default_value_t = Dedup::DropAll)]
    pub dedup: Dedup,

    /// Record output format
    #[arg(long, value_enum, default_value_t = Format::Tsv)]
    pub format: Format,

    /// Blame every file again instead of reusing earlier results
    #[arg(long)]
    pub no_blame_cache: bool,

    /// Write before/after change pairs as JSON lines to this file
    #[arg(long)]
    pub pairs: Option<PathBuf>,

    /// External program producing edit-action counts for a pair of files
    #[arg(long, requires = "vectors")]
    pub vectorizer: Option<PathBuf>,

    /// Extra argument passed to the vectorizer before the two file paths
    #[arg(long = "vectorizer-arg", allow_hyphen_values = true)]
    pub vectorizer_args: Vec<String>,

    /// Write change vectors as JSON lines to this file
    #[arg(long, requires = "vectorizer")]
    pub vectors: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors, and hide progress bars
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug, Copy)]
pub enum Dedup {
    /// Keep every record
    Off,
    /// Keep the first record of each path and fix commit
    KeepFirst,
    /// Drop all records of a path and fix commit that occurs more than once
    DropAll,
}

impl From<Dedup> for DedupPolicy {
    fn from(dedup: Dedup) -> Self {
        match dedup {
            Dedup::Off => DedupPolicy::Off,
            Dedup::KeepFirst => DedupPolicy::KeepFirst,
            Dedup::DropAll => DedupPolicy::DropAll,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug, Copy)]
pub enum Format {
    /// Tab-separated with a header line
    Tsv,
    /// One JSON object per line
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Tsv => OutputFormat::Tsv,
            Format::Json => OutputFormat::JsonLines,
        }
    }
}

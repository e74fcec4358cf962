// src/main.rs

mod cli;

use anyhow::Context;
use bic_miner::pairs::collect_pairs;
use bic_miner::vectorize::{vectorize_pairs, CommandVectorizer};
use bic_miner::{curate, write_records, BicExtractor, ExtractorConfig, FixCommitSet, Git2Provider};
use clap::Parser;
use cli::Args;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args);
    let start_time = Instant::now();

    let provider = Git2Provider::open(&args.repo)
        .with_context(|| format!("cannot open repository {}", args.repo.display()))?;
    let fix_file = File::open(&args.fix_commits)
        .with_context(|| format!("cannot read fix commits from {}", args.fix_commits.display()))?;
    let fixes = FixCommitSet::from_reader(BufReader::new(fix_file))?.resolve(&provider);
    eprintln!("Loaded {} fix commits.", fixes.len());

    let config = ExtractorConfig {
        source_extension: args.extension.clone(),
        test_marker: args.test_marker.clone(),
        use_blame_cache: !args.no_blame_cache,
        show_progress: !args.quiet,
    };
    let mut extractor = BicExtractor::new(&provider, config)?;
    let extraction = extractor
        .run(&args.rev, &fixes)
        .with_context(|| format!("cannot walk history from {}", args.rev))?;
    let stats = &extraction.stats;
    eprintln!(
        "Attribution finished in {:.2?}. Scanned {} commits, {} fix commits, {} records.",
        start_time.elapsed(),
        stats.commits_scanned,
        stats.fix_commits,
        stats.records
    );
    tracing::debug!(?stats, "extraction stats");

    let curated = curate(extraction.records, args.dedup.into());
    match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path).with_context(|| format!("cannot create {}", path.display()))?);
            write_records(&mut out, &curated.records, args.format.into())?;
        }
        None => write_records(&mut io::stdout().lock(), &curated.records, args.format.into())?,
    }
    eprintln!("Wrote {} records ({} dropped as duplicates).", curated.records.len(), curated.dropped);

    if args.pairs.is_some() || args.vectors.is_some() {
        let pair_start = Instant::now();
        let collection = collect_pairs(&provider, &curated.records);
        eprintln!(
            "Collected {} change pairs in {:.2?} ({} skipped).",
            collection.instance_count(),
            pair_start.elapsed(),
            collection.skipped
        );
        if let Some(path) = &args.pairs {
            write_json_lines(path, &collection.pairs)?;
        }

        if let (Some(program), Some(path)) = (&args.vectorizer, &args.vectors) {
            let mut vectorizer = CommandVectorizer::new(program);
            vectorizer.args = args.vectorizer_args.clone();
            vectorizer.suffix = args.extension.clone();
            let vectors = vectorize_pairs(
                &provider,
                &vectorizer,
                &collection.pairs,
                collection.instance_count(),
                !args.quiet,
            );
            write_json_lines(path, &vectors)?;
            eprintln!("Wrote {} change vectors.", vectors.len());
        }
    }

    eprintln!("Total time: {:.2?}", start_time.elapsed());
    Ok(())
}

fn init_logging(args: &Args) {
    let default_level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn write_json_lines<T: Serialize>(path: &Path, items: &[T]) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for item in items {
        serde_json::to_writer(&mut out, item)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

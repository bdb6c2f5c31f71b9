//! Historic Prices to CSV
//!
//! Batch tool that reduces per-market snapshot files (newline-delimited
//! JSON market books, one file per market) into CSV rows of preplay and
//! in-play trading statistics per runner.
//!
//! Usage:
//!   cargo run --release --bin prices_to_csv -- data/2021_10_Oct/ -o output.csv
//!   cargo run --release --bin prices_to_csv -- market.ndjson --country NZ --include-harness

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use tracing::{info, warn};

use betfair_histdata::histdata::emit::CSV_HEADER;
use betfair_histdata::histdata::normalize::SourceStats;
use betfair_histdata::histdata::reducer::{reduce_market, MarketOutcome, RunSummary};
use betfair_histdata::histdata::source::{
    market_files, NdjsonSnapshotStream, SnapshotSourceExt,
};
use betfair_histdata::histdata::EligibilityConfig;

/// Reduce historic market snapshot files to per-runner trading statistics.
#[derive(Parser, Debug)]
#[command(name = "prices_to_csv")]
#[command(about = "Convert historic market snapshot files to per-runner price statistics CSV")]
struct Cli {
    /// Market files or directories to walk for .json/.ndjson market files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output CSV path
    #[arg(short, long, default_value = "prices.csv")]
    output: PathBuf,

    /// Required country code
    #[arg(long, default_value = "AU")]
    country: String,

    /// Required market type
    #[arg(long, default_value = "WIN")]
    market_type: String,

    /// Keep harness (trot/pace) races instead of excluding them
    #[arg(long)]
    include_harness: bool,

    /// Process markets sequentially instead of in parallel
    #[arg(long)]
    sequential: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let eligibility = EligibilityConfig {
        country_code: cli.country.clone(),
        market_type: cli.market_type.clone(),
        excluded_race_types: if cli.include_harness {
            vec![]
        } else {
            EligibilityConfig::default().excluded_race_types
        },
    };

    let files = market_files(&cli.inputs)?;
    info!(markets = files.len(), "Resolved input market files");

    let process = |path: &PathBuf| -> (MarketOutcome, SourceStats) {
        match NdjsonSnapshotStream::open(path) {
            Ok(mut stream) => {
                let outcome = reduce_market(stream.iter(), &eligibility);
                (outcome, *stream.stats())
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "Skipping unreadable market file");
                (MarketOutcome::Incomplete, SourceStats::default())
            }
        }
    };

    // Markets are independent; results are collected back in input order so
    // the output is identical whether or not workers run in parallel.
    let results: Vec<(MarketOutcome, SourceStats)> = if cli.sequential {
        files.iter().map(process).collect()
    } else {
        files.par_iter().map(process).collect()
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&cli.output)
        .with_context(|| format!("Failed to create output file: {}", cli.output.display()))?;
    writer.write_record(CSV_HEADER)?;

    let mut summary = RunSummary::default();
    let mut source_stats = SourceStats::default();
    for (outcome, stats) in &results {
        summary.record(outcome);
        source_stats.merge(stats);
        if let MarketOutcome::Rows(rows) = outcome {
            for row in rows {
                writer.serialize(row)?;
            }
        }
    }
    writer.flush().context("Failed to flush output file")?;

    info!(
        markets_scanned = summary.markets_scanned,
        markets_ineligible = summary.markets_ineligible,
        markets_incomplete = summary.markets_incomplete,
        rows_emitted = summary.rows_emitted,
        snapshots_parsed = source_stats.snapshots_parsed,
        parse_errors = source_stats.parse_errors,
        output = %cli.output.display(),
        "Run complete"
    );

    Ok(())
}

/// Initialize tracing with env-filter overrides.
fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "betfair_histdata=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

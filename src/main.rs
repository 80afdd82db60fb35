//! # News Ledger
//!
//! Persists daily news digests produced by an upstream analysis stage and
//! derives a summary index for a front end.
//!
//! ## Features
//!
//! - Appends every news item to an append-only CSV ledger
//! - Stores each digest verbatim as a pretty-printed JSON snapshot per date
//! - Computes per-date, per-category and per-importance counts from the ledger
//! - Rebuilds `index.json` (snapshot dates + statistics) after every ingest
//!
//! ## Usage
//!
//! ```sh
//! news_ledger -d ./data ingest ./digest.json
//! ```
//!
//! ## Architecture
//!
//! An ingest is a fixed sequence:
//! 1. **Snapshot**: Write `daily/<date>.json`, replacing any earlier one
//! 2. **Ledger**: Append one CSV row per item
//! 3. **Index**: Rescan the ledger and snapshot directory, rewrite `index.json`

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod ingest;
mod models;
mod storage;
mod utils;

use cli::{Cli, Command};
use config::StorageConfig;
use ingest::{load_digest, save_news};
use storage::indexes::IndexBuilder;
use storage::json::SnapshotStore;
use storage::ledger::LedgerStore;
use storage::stats::compute_statistics;
use utils::{ensure_writable_dir, truncate_for_log};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = match &args.config {
        Some(path) => StorageConfig::load(path).await?,
        None => StorageConfig::from_data_dir(&args.data_dir),
    };
    info!(data_dir = %config.data_dir.display(), "Using storage layout");

    match args.command {
        Command::Ingest { digest } => {
            if let Err(e) = ensure_writable_dir(&config.data_dir).await {
                error!(
                    path = %config.data_dir.display(),
                    error = %e,
                    "Data directory is not writable (fix perms or choose a different path)"
                );
                return Err(e.into());
            }

            let digest = load_digest(&digest).await?;
            info!(
                date = %digest.date(),
                domestic = digest.domestic().len(),
                international = digest.international().len(),
                summary = %truncate_for_log(digest.summary().unwrap_or_default(), 120),
                "Loaded digest"
            );

            let report = save_news(config, &digest).await?;
            println!(
                "Saved {} ({} rows appended, {} dates indexed)",
                report.snapshot_path.display(),
                report.rows_appended,
                report.index.dates.len()
            );
        }
        Command::Show { date } => {
            let snapshots = SnapshotStore::new(&config.snapshot_dir);
            match snapshots.read(&date).await? {
                Some(digest) => println!("{}", serde_json::to_string_pretty(&digest)?),
                None => {
                    info!(%date, "No snapshot stored for date");
                    println!("No digest stored for {date}");
                }
            }
        }
        Command::Dates => {
            let snapshots = SnapshotStore::new(&config.snapshot_dir);
            for date in snapshots.list_dates().await? {
                println!("{date}");
            }
        }
        Command::Stats => {
            let ledger = LedgerStore::new(&config.ledger_file);
            let stats = compute_statistics(&ledger).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Reindex => {
            config.ensure_dirs().await?;
            let builder = IndexBuilder::from_config(&config);
            let index = builder.build().await?;
            println!(
                "Rebuilt {} ({} dates, {} ledger days)",
                builder.path().display(),
                index.dates.len(),
                index.statistics.total_days
            );
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

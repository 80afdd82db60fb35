//! Command-line interface definitions for News Ledger.
//!
//! This module defines the CLI arguments and subcommands using the `clap` crate.
//! Storage locations can be provided via flags or environment variables.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the News Ledger application.
///
/// # Examples
///
/// ```sh
/// # Ingest a digest produced by the analysis stage
/// news_ledger -d ./data ingest ./out/2024-12-09.json
///
/// # Use a YAML config instead of the default layout
/// news_ledger --config ./news_ledger.yaml stats
///
/// # Rebuild index.json after a partial failure
/// news_ledger reindex
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Base data directory (ledger, snapshots and index live under it)
    #[arg(short, long, env = "NEWS_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Optional path to a YAML config file; overrides --data-dir
    #[arg(short, long, env = "NEWS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Store a digest JSON file: snapshot, ledger rows, index
    Ingest {
        /// Path to the digest JSON document
        digest: PathBuf,
    },
    /// Print the stored snapshot for a date
    Show {
        /// Date in YYYY-MM-DD format
        date: String,
    },
    /// List snapshot dates, newest first
    Dates,
    /// Print statistics computed from the ledger
    Stats,
    /// Rebuild the index file from the ledger and snapshots
    Reindex,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_ingest_parsing() {
        let cli = Cli::parse_from([
            "news_ledger",
            "--data-dir",
            "./data",
            "ingest",
            "./digest.json",
        ]);

        assert_eq!(cli.data_dir, PathBuf::from("./data"));
        assert_eq!(
            cli.command,
            Command::Ingest {
                digest: PathBuf::from("./digest.json")
            }
        );
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["news_ledger", "-d", "/tmp/news", "-c", "/tmp/cfg.yaml", "stats"]);

        assert_eq!(cli.data_dir, PathBuf::from("/tmp/news"));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/cfg.yaml")));
        assert_eq!(cli.command, Command::Stats);
    }

    #[test]
    fn test_cli_show_requires_date() {
        assert!(Cli::try_parse_from(["news_ledger", "show"]).is_err());
        let cli = Cli::parse_from(["news_ledger", "show", "2024-12-09"]);
        assert_eq!(
            cli.command,
            Command::Show {
                date: "2024-12-09".to_string()
            }
        );
    }
}

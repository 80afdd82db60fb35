//! Summary index for the front end.
//!
//! The index combines two independent sources:
//! - `dates` comes from the snapshot directory
//! - `statistics` comes from the ledger
//!
//! The two may disagree (a snapshot with no ledger rows, or ledger rows for a
//! date whose snapshot was removed). That is expected and not reconciled.
//!
//! # Replace Semantics
//!
//! Unlike the append-only ledger, the index file is rewritten in full on
//! every build. Rebuilding is always safe and, apart from `last_updated`,
//! produces the same document for the same ledger and snapshot state.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

use crate::config::StorageConfig;
use crate::error::{Result, StorageError};
use crate::models::Index;
use crate::storage::json::SnapshotStore;
use crate::storage::ledger::LedgerStore;
use crate::storage::stats::compute_statistics;
use crate::utils::now_timestamp;

/// Builds and persists [`Index`] documents.
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    snapshots: SnapshotStore,
    ledger: LedgerStore,
    path: PathBuf,
}

impl IndexBuilder {
    pub fn new(snapshots: SnapshotStore, ledger: LedgerStore, path: impl Into<PathBuf>) -> Self {
        IndexBuilder {
            snapshots,
            ledger,
            path: path.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        IndexBuilder::new(
            SnapshotStore::new(&config.snapshot_dir),
            LedgerStore::new(&config.ledger_file),
            &config.index_file,
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Compose the index from the current snapshot and ledger state without
    /// writing it.
    pub async fn compose(&self) -> Result<Index> {
        let dates = self.snapshots.list_dates().await?;
        let statistics = compute_statistics(&self.ledger).await?;
        Ok(Index {
            last_updated: now_timestamp(),
            dates,
            statistics,
        })
    }

    /// Compose the index and overwrite the index file with it.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub async fn build(&self) -> Result<Index> {
        let index = self.compose().await?;
        let json = serde_json::to_string_pretty(&index)?;
        fs::write(&self.path, json)
            .await
            .map_err(|e| StorageError::fs(&self.path, e))?;
        info!(
            dates = index.dates.len(),
            days = index.statistics.total_days,
            "Updated index file"
        );
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Digest;
    use serde_json::{Value, json};

    fn digest(date: &str, domestic: usize, international: usize) -> Digest {
        let items = |n: usize| -> Vec<Value> {
            (0..n)
                .map(|i| json!({"index": i + 1, "title": format!("item {i}"), "importance": "中"}))
                .collect()
        };
        serde_json::from_value(json!({
            "date": date,
            "domestic": items(domestic),
            "international": items(international),
        }))
        .unwrap()
    }

    async fn setup() -> (tempfile::TempDir, StorageConfig) {
        let tmp = tempfile::tempdir().unwrap();
        let config = StorageConfig::from_data_dir(tmp.path().join("data"));
        config.ensure_dirs().await.unwrap();
        (tmp, config)
    }

    #[tokio::test]
    async fn test_build_on_empty_state() {
        let (_tmp, config) = setup().await;
        let index = IndexBuilder::from_config(&config).build().await.unwrap();

        assert!(index.dates.is_empty());
        assert_eq!(index.statistics.total_days, 0);
        assert!(config.index_file.exists());
    }

    #[tokio::test]
    async fn test_dates_and_statistics_come_from_different_sources() {
        let (_tmp, config) = setup().await;
        let snapshots = SnapshotStore::new(&config.snapshot_dir);
        let ledger = LedgerStore::new(&config.ledger_file);

        // Snapshot without ledger rows.
        snapshots.write(&digest("2024-12-10", 1, 0)).await.unwrap();
        // Ledger rows without a snapshot.
        ledger.ensure_ledger().await.unwrap();
        ledger
            .append_rows(&digest("2024-12-08", 2, 1).ledger_rows("2024-12-08 16:00:00"))
            .await
            .unwrap();

        let index = IndexBuilder::from_config(&config).build().await.unwrap();
        assert_eq!(index.dates, vec!["2024-12-10"]);
        assert_eq!(index.statistics.total_days, 1);
        assert_eq!(index.statistics.by_date[0].date, "2024-12-08");
        assert_eq!(index.statistics.total_domestic, 2);
        assert_eq!(index.statistics.total_international, 1);
    }

    #[tokio::test]
    async fn test_build_overwrites_and_is_stable() {
        let (_tmp, config) = setup().await;
        let snapshots = SnapshotStore::new(&config.snapshot_dir);
        snapshots.write(&digest("2024-12-09", 0, 0)).await.unwrap();

        let builder = IndexBuilder::from_config(&config);
        let first = builder.build().await.unwrap();
        let second = builder.build().await.unwrap();
        assert_eq!(first.dates, second.dates);
        assert_eq!(first.statistics, second.statistics);

        let raw = std::fs::read_to_string(builder.path()).unwrap();
        let on_disk: Index = serde_json::from_str(&raw).unwrap();
        assert_eq!(on_disk, second);
        assert!(raw.contains("\"高\": 0"));
    }
}

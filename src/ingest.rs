//! Orchestration of a single digest ingest.
//!
//! Steps run in a fixed order:
//! 1. Write the snapshot (replacing any earlier one for the date)
//! 2. Append every item to the ledger under one shared `created_at`
//! 3. Rebuild the index
//!
//! Nothing is rolled back. If step 2 or 3 fails the snapshot stays on disk
//! and the ledger or index is stale until the whole ingest is retried.
//! Only one writer process is assumed; concurrent ingests can interleave
//! ledger lines and clobber the index.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

use crate::config::StorageConfig;
use crate::error::{Result, StorageError};
use crate::models::{Digest, Index};
use crate::storage::indexes::IndexBuilder;
use crate::storage::json::SnapshotStore;
use crate::storage::ledger::LedgerStore;
use crate::utils::now_timestamp;

/// What a completed ingest produced.
#[derive(Debug)]
pub struct IngestReport {
    pub snapshot_path: PathBuf,
    pub rows_appended: usize,
    pub index: Index,
}

/// Wires the three stores together around one [`StorageConfig`].
#[derive(Debug, Clone)]
pub struct NewsStorage {
    snapshots: SnapshotStore,
    ledger: LedgerStore,
    index: IndexBuilder,
}

impl NewsStorage {
    /// Bootstrap directories and the ledger header, then return the handle.
    #[instrument(level = "info", skip_all, fields(data_dir = %config.data_dir.display()))]
    pub async fn open(config: StorageConfig) -> Result<Self> {
        config.ensure_dirs().await?;
        let ledger = LedgerStore::new(&config.ledger_file);
        ledger.ensure_ledger().await?;

        Ok(NewsStorage {
            snapshots: SnapshotStore::new(&config.snapshot_dir),
            index: IndexBuilder::from_config(&config),
            ledger,
        })
    }

    /// Persist `digest`: snapshot, then ledger rows, then the index.
    #[instrument(level = "info", skip_all, fields(date = %digest.date(), items = digest.item_count()))]
    pub async fn ingest(&self, digest: &Digest) -> Result<IngestReport> {
        let snapshot_path = self.snapshots.write(digest).await?;

        let created_at = now_timestamp();
        let rows = digest.ledger_rows(&created_at);
        let rows_appended = self.ledger.append_rows(&rows).await.inspect_err(|e| {
            error!(error = %e, snapshot = %snapshot_path.display(), "Ledger append failed after snapshot was written");
        })?;

        let index = self.index.build().await.inspect_err(|e| {
            error!(error = %e, "Index rebuild failed; rerun ingest or reindex");
        })?;

        info!(
            snapshot = %snapshot_path.display(),
            rows = rows_appended,
            dates = index.dates.len(),
            "Digest ingested"
        );
        Ok(IngestReport {
            snapshot_path,
            rows_appended,
            index,
        })
    }
}

/// Read a digest JSON document from disk.
pub async fn load_digest(path: &Path) -> Result<Digest> {
    let raw = fs::read_to_string(path)
        .await
        .map_err(|e| StorageError::fs(path, e))?;
    serde_json::from_str(&raw).map_err(|source| StorageError::Snapshot {
        path: path.to_path_buf(),
        source,
    })
}

/// Open storage at `config` and ingest a single digest.
pub async fn save_news(config: StorageConfig, digest: &Digest) -> Result<IngestReport> {
    NewsStorage::open(config).await?.ingest(digest).await
}

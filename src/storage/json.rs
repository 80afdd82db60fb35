//! Per-date JSON snapshots of submitted digests.
//!
//! # Output Structure
//!
//! One pretty-printed file per digest date, overwritten on every save:
//! ```text
//! snapshot_dir/
//! ├── 2024-12-08.json
//! └── 2024-12-09.json
//! ```
//!
//! Dates are listed by sorting file stems as strings, which matches
//! chronological order only for zero-padded `YYYY-MM-DD` dates.

use itertools::Itertools;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, StorageError};
use crate::models::Digest;

const SNAPSHOT_EXTENSION: &str = ".json";

/// Handle on the snapshot directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SnapshotStore { dir: dir.into() }
    }

    /// Path of the snapshot for `date`.
    pub fn path_for(&self, date: &str) -> PathBuf {
        self.dir.join(format!("{date}{SNAPSHOT_EXTENSION}"))
    }

    /// Write `digest` to `<dir>/<date>.json`, replacing any earlier snapshot
    /// for the same date. The submitted document is written unchanged: key
    /// order, `null`s and unknown keys survive. Returns the written path.
    #[instrument(level = "info", skip_all, fields(date = %digest.date()))]
    pub async fn write(&self, digest: &Digest) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(digest)?;
        let path = self.path_for(digest.date());

        info!(path = %path.display(), "Writing snapshot");
        fs::write(&path, json)
            .await
            .map_err(|e| StorageError::fs(&path, e))?;
        Ok(path)
    }

    /// Read the snapshot for `date`. A missing file is `Ok(None)`.
    #[instrument(level = "debug", skip(self))]
    pub async fn read(&self, date: &str) -> Result<Option<Digest>> {
        let path = self.path_for(date);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No snapshot for date");
                return Ok(None);
            }
            Err(e) => return Err(StorageError::fs(&path, e)),
        };

        let digest = serde_json::from_str(&raw)
            .map_err(|source| StorageError::Snapshot { path, source })?;
        Ok(Some(digest))
    }

    /// Dates of every `*.json` file in the snapshot directory, newest first.
    ///
    /// A missing directory yields an empty list.
    #[instrument(level = "debug", skip_all, fields(dir = %self.dir.display()))]
    pub async fn list_dates(&self) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Snapshot directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(StorageError::fs(&self.dir, e)),
        };

        let mut dates = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::fs(&self.dir, e))?
        {
            let name = entry.file_name();
            if let Some(date) = name.to_str().and_then(|n| n.strip_suffix(SNAPSHOT_EXTENSION)) {
                dates.push(date.to_string());
            }
        }

        Ok(dates.into_iter().sorted_by(|a, b| b.cmp(a)).collect())
    }
}

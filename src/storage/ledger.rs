//! Append-only CSV ledger of every ingested news item.
//!
//! The ledger is the only source for [`Statistics`](crate::models::Statistics).
//! Rows are never rewritten or deduplicated: ingesting the same date twice
//! adds a second set of rows.
//!
//! Fields are encoded with the `csv` crate, so a comma-joined `tags` cell is
//! written as a single quoted field. Records end in `\r\n`.

use csv::{Terminator, WriterBuilder};
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

use crate::error::{Result, StorageError};
use crate::models::{LEDGER_COLUMNS, LedgerRow};

/// Handle on the ledger file.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LedgerStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the ledger with its header row if the file does not exist.
    ///
    /// Returns `true` when the file was created by this call.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub async fn ensure_ledger(&self) -> Result<bool> {
        let exists = fs::try_exists(&self.path)
            .await
            .map_err(|e| StorageError::fs(&self.path, e))?;
        if exists {
            debug!("Ledger already present");
            return Ok(false);
        }

        let mut writer = record_writer();
        writer.write_record(LEDGER_COLUMNS)?;
        let header = finish(writer)?;
        fs::write(&self.path, header)
            .await
            .map_err(|e| StorageError::fs(&self.path, e))?;
        info!("Created ledger with header");
        Ok(true)
    }

    /// Append one line per row, in order. Returns the number of rows written.
    ///
    /// No validation is performed and nothing is rolled back if the write
    /// fails part way through.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display(), rows = rows.len()))]
    pub async fn append_rows(&self, rows: &[LedgerRow]) -> Result<usize> {
        let mut writer = record_writer();
        for row in rows {
            writer.serialize(row)?;
        }
        let encoded = finish(writer)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StorageError::fs(&self.path, e))?;
        file.write_all(&encoded)
            .await
            .map_err(|e| StorageError::fs(&self.path, e))?;
        file.flush()
            .await
            .map_err(|e| StorageError::fs(&self.path, e))?;

        info!(rows = rows.len(), "Appended rows to ledger");
        Ok(rows.len())
    }

    /// Raw ledger bytes, or `None` when the ledger has not been created yet.
    pub async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::fs(&self.path, e)),
        }
    }
}

fn record_writer() -> csv::Writer<Vec<u8>> {
    WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| StorageError::Ledger(e.into_error().into()))
}

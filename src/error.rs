//! Error type shared by the ledger, snapshot and index stores.
//!
//! Missing snapshots are not errors (they come back as `Ok(None)`), and a
//! ledger line with the wrong column count is skipped during aggregation
//! rather than surfaced here.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures that abort a storage operation and propagate to the caller.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Permission or I/O failure on any read or write.
    #[error("filesystem error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A snapshot or digest file that does not hold a valid digest.
    #[error("invalid digest JSON in {path}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The ledger stream itself could not be encoded or decoded.
    #[error("ledger encoding error: {0}")]
    Ledger(#[from] csv::Error),

    /// JSON serialization of an in-memory value failed.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The YAML configuration file could not be parsed.
    #[error("invalid config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl StorageError {
    pub fn fs(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        StorageError::Filesystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

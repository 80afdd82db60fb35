//! Storage locations for the ledger, snapshots and index.
//!
//! Paths are passed explicitly to every store through [`StorageConfig`]. The
//! config can be derived from a single data directory or loaded from a YAML
//! file that overrides individual paths.
//!
//! # Default Layout
//!
//! ```text
//! data_dir/
//! ├── news.csv        # append-only ledger
//! ├── index.json      # summary for the front end
//! └── daily/
//!     ├── 2024-12-08.json
//!     └── 2024-12-09.json
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};

use crate::error::{Result, StorageError};

pub const LEDGER_FILE_NAME: &str = "news.csv";
pub const SNAPSHOT_DIR_NAME: &str = "daily";
pub const INDEX_FILE_NAME: &str = "index.json";

/// Resolved file and directory paths used by the stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub ledger_file: PathBuf,
    pub snapshot_dir: PathBuf,
    pub index_file: PathBuf,
}

/// On-disk shape of the YAML config. Only `data_dir` is required.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    data_dir: PathBuf,
    ledger_file: Option<PathBuf>,
    snapshot_dir: Option<PathBuf>,
    index_file: Option<PathBuf>,
}

impl StorageConfig {
    /// Default layout rooted at `data_dir`.
    pub fn from_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        StorageConfig {
            ledger_file: data_dir.join(LEDGER_FILE_NAME),
            snapshot_dir: data_dir.join(SNAPSHOT_DIR_NAME),
            index_file: data_dir.join(INDEX_FILE_NAME),
            data_dir,
        }
    }

    /// Load a YAML config file.
    ///
    /// ```yaml
    /// data_dir: ./data
    /// snapshot_dir: ./data/daily   # optional
    /// ```
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .await
            .map_err(|e| StorageError::fs(path, e))?;
        let file: ConfigFile = serde_yaml::from_str(&raw).map_err(|source| StorageError::Config {
            path: path.to_path_buf(),
            source,
        })?;

        let defaults = StorageConfig::from_data_dir(file.data_dir);
        let config = StorageConfig {
            ledger_file: file.ledger_file.unwrap_or(defaults.ledger_file),
            snapshot_dir: file.snapshot_dir.unwrap_or(defaults.snapshot_dir),
            index_file: file.index_file.unwrap_or(defaults.index_file),
            data_dir: defaults.data_dir,
        };
        debug!(?config, "Loaded storage config");
        Ok(config)
    }

    /// Create the data and snapshot directories, plus the parent directories
    /// of the ledger and index files, if missing.
    pub async fn ensure_dirs(&self) -> Result<()> {
        let parents = [&self.ledger_file, &self.index_file]
            .into_iter()
            .filter_map(|file| file.parent())
            .filter(|dir| !dir.as_os_str().is_empty());
        for dir in [self.data_dir.as_path(), self.snapshot_dir.as_path()]
            .into_iter()
            .chain(parents)
        {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| StorageError::fs(dir, e))?;
        }
        Ok(())
    }
}

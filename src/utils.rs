//! Utility functions for timestamps, log formatting, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Local date and timestamp formatting for snapshots, ledger rows and the index
//! - String truncation for logging
//! - File system validation for the data directory

use chrono::Local;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

use crate::error::{Result, StorageError};

/// Format used for `created_at` and `last_updated`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Today's local date as `YYYY-MM-DD`.
pub fn today_iso() -> String {
    Local::now().date_naive().to_string()
}

/// Current local time formatted with [`TIMESTAMP_FORMAT`].
pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at the last character boundary at or before `max`
/// bytes and get `"…(+N bytes)"` appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a scratch file.
///
/// # Errors
///
/// Returns [`StorageError::Filesystem`] if the directory cannot be created
/// or is not writable (permission denied, read-only filesystem, etc.).
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| StorageError::fs(path, e))?;

    let scratch_path = path.join("..__write_check__");
    fs::write(&scratch_path, b"")
        .await
        .map_err(|e| StorageError::fs(&scratch_path, e))?;
    let _ = fs::remove_file(&scratch_path).await;
    info!("Data directory is writable");
    Ok(())
}

// file: src/netconfig/backup.rs
// version: 1.0.0
// guid: b3956111-40ae-4bb3-a685-05d7d102fbdb

//! Timestamped backups taken before a tracked file is modified

use crate::Result;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A copy of a configuration file taken before mutation.
///
/// Backups are never removed automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    pub original: PathBuf,
    pub backup: PathBuf,
}

/// `<path>.backup.<YYYYmmdd_HHMMSS>`
pub fn backup_path_for(path: &Path, at: DateTime<Local>) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".backup.{}", at.format("%Y%m%d_%H%M%S")));
    PathBuf::from(name)
}

/// Copy `path` next to itself with a timestamp suffix.
///
/// Returns `None` when there is nothing to back up.
pub fn backup_file(path: &Path) -> Result<Option<BackupRecord>> {
    if !path.exists() {
        debug!("No backup needed, {} does not exist", path.display());
        return Ok(None);
    }

    let backup = backup_path_for(path, Local::now());
    fs::copy(path, &backup)?;
    debug!("Backed up {} to {}", path.display(), backup.display());

    Ok(Some(BackupRecord {
        original: path.to_path_buf(),
        backup,
    }))
}

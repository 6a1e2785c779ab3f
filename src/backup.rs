//! Snapshot copies of the store's on-disk root.
//!
//! Repair never touches collection state before a snapshot exists. A backup
//! is a plain recursive copy of the store root into a timestamped directory
//! under the configured backups path — no archive format, no byte-level
//! repair, the underlying store owns on-disk integrity.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use thiserror::Error;
use walkdir::WalkDir;

/// Errors that can occur while snapshotting the store root
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Store root does not exist: {path}")]
    MissingRoot { path: String },

    #[error("Failed to create backup directory {path}: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to copy {path}: {source}")]
    Copy {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to walk store root: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result of a completed snapshot
#[derive(Debug, Clone, Serialize)]
pub struct BackupResult {
    /// Path of the created backup directory
    pub backup_path: PathBuf,
    /// Number of files copied
    pub files_backed_up: usize,
    /// Total bytes copied
    pub backup_size: u64,
    /// Snapshot creation time, seconds since epoch
    pub created_at: u64,
}

/// Copy every file and directory under `store_root` into a timestamped
/// directory beneath `backups_dir`.
///
/// Directory names carry a second-granularity timestamp: sequential repairs
/// get unique paths, two snapshots within the same second collide.
pub fn create_backup(store_root: &Path, backups_dir: &Path) -> Result<BackupResult, BackupError> {
    if !store_root.exists() {
        return Err(BackupError::MissingRoot {
            path: store_root.display().to_string(),
        });
    }

    let created_at = unix_seconds();
    let backup_path = backups_dir.join(format!("memory_backup_{created_at}"));
    fs::create_dir_all(&backup_path).map_err(|source| BackupError::CreateDir {
        path: backup_path.display().to_string(),
        source,
    })?;

    let (files_backed_up, backup_size) = copy_tree(store_root, &backup_path)?;

    log::info!(
        "Backup created: {} files, {} bytes at {}",
        files_backed_up,
        backup_size,
        backup_path.display()
    );

    Ok(BackupResult {
        backup_path,
        files_backed_up,
        backup_size,
        created_at,
    })
}

/// Recursively copy `source` into `destination`, returning the file count
/// and total bytes copied.
fn copy_tree(source: &Path, destination: &Path) -> Result<(usize, u64), BackupError> {
    let mut files_copied = 0;
    let mut bytes_copied = 0;

    for entry in WalkDir::new(source) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .expect("walked entries live under the walk root");
        if relative.as_os_str().is_empty() {
            continue;
        }

        let target = destination.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|source| BackupError::CreateDir {
                path: target.display().to_string(),
                source,
            })?;
        } else {
            bytes_copied += fs::copy(entry.path(), &target).map_err(|source| BackupError::Copy {
                path: entry.path().display().to_string(),
                source,
            })?;
            files_copied += 1;
        }
    }

    Ok((files_copied, bytes_copied))
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

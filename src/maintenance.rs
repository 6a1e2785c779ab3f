//! Collection validation and repair.
//!
//! `validate_store` is a lightweight liveness probe; `repair_store` is the
//! conservative recovery path: snapshot the on-disk root, destructively
//! re-open the collection with its original configuration, then re-validate.
//! Neither operation ever propagates an error to its caller — both convert
//! every fault into their documented failure value. Repair mutates the live
//! collection handle in place; callers must serialize it against all other
//! access to the same store.

use std::path::PathBuf;

use serde::Serialize;

use crate::backup;
use crate::store::MemoryStoreHandle;

/// Outcome of a validation probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub message: String,
}

/// Outcome of a repair attempt.
#[derive(Debug, Clone, Serialize)]
pub struct RepairOutcome {
    pub success: bool,
    pub message: String,
    /// Path of the pre-repair snapshot, when one was created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,
}

/// Probe the collection for liveness by counting its records.
pub async fn validate_store(handle: &MemoryStoreHandle) -> ValidationResult {
    match handle.collection().count().await {
        Ok(count) => ValidationResult {
            is_valid: true,
            message: format!("Database validated successfully. Contains {count} memories."),
        },
        Err(error) => {
            log::error!("Database validation error: {error}");
            ValidationResult {
                is_valid: false,
                message: format!("Database validation failed: {error}"),
            }
        }
    }
}

/// Attempt to repair the collection: backup, re-create, re-validate.
///
/// The snapshot always happens first; if collection re-creation fails
/// afterwards, the outcome still reports the backup path so the snapshot can
/// be recovered manually.
pub async fn repair_store(handle: &MemoryStoreHandle) -> RepairOutcome {
    let config = handle.config();

    let backup = match backup::create_backup(&config.store_root, &config.backups_dir) {
        Ok(result) => result,
        Err(error) => {
            log::error!("Database repair error: {error}");
            return RepairOutcome {
                success: false,
                message: format!("Database repair failed: {error}"),
                backup_path: None,
            };
        }
    };

    if let Err(error) = handle
        .collection()
        .recreate_collection(&config.collection())
        .await
    {
        log::error!("Database repair error: {error}");
        return RepairOutcome {
            success: false,
            message: format!("Database repair failed: {error}"),
            backup_path: Some(backup.backup_path),
        };
    }

    let validation = validate_store(handle).await;
    if validation.is_valid {
        RepairOutcome {
            success: true,
            message: format!(
                "Database repaired successfully. Backup created at {}",
                backup.backup_path.display()
            ),
            backup_path: Some(backup.backup_path),
        }
    } else {
        RepairOutcome {
            success: false,
            message: format!(
                "Repair attempt completed but validation still fails: {}",
                validation.message
            ),
            backup_path: Some(backup.backup_path),
        }
    }
}

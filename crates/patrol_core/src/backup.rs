//! Whole-file backup copies next to the save. Backups are opaque bytes and
//! are never parsed.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;
use tracing::info;

use crate::core_api::CoreError;

pub const SAVE_EXTENSION: &str = "save";
pub const BACKUP_EXTENSION: &str = "bak";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupInfo {
    pub path: PathBuf,
    pub created: SystemTime,
    pub len: u64,
}

/// `newgame.save` -> `newgame.bak`; any other name gets `.bak` appended.
pub fn backup_path_for(save: &Path) -> PathBuf {
    if save.extension().is_some_and(|ext| ext == SAVE_EXTENSION) {
        return save.with_extension(BACKUP_EXTENSION);
    }
    let mut name = save.as_os_str().to_os_string();
    name.push(".");
    name.push(BACKUP_EXTENSION);
    PathBuf::from(name)
}

/// Replaces any existing backup with the current save bytes.
pub fn create_backup(save: &Path) -> Result<PathBuf, CoreError> {
    let backup = backup_path_for(save);
    let bytes = fs::read(save).map_err(|e| CoreError::from_io(&e, "read", save))?;
    if backup.exists() {
        fs::remove_file(&backup).map_err(|e| CoreError::io(&e, "remove", &backup))?;
    }
    fs::write(&backup, bytes).map_err(|e| CoreError::io(&e, "write", &backup))?;
    info!(backup = %backup.display(), "created backup");
    Ok(backup)
}

/// Copies the backup bytes over the save.
pub fn restore_backup(save: &Path) -> Result<PathBuf, CoreError> {
    let backup = backup_path_for(save);
    let bytes = fs::read(&backup).map_err(|e| CoreError::from_io(&e, "read", &backup))?;
    fs::write(save, bytes).map_err(|e| CoreError::io(&e, "write", save))?;
    info!(backup = %backup.display(), "restored backup");
    Ok(backup)
}

pub fn backup_info(save: &Path) -> Result<Option<BackupInfo>, CoreError> {
    let backup = backup_path_for(save);
    let meta = match fs::metadata(&backup) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(CoreError::io(&e, "inspect", &backup)),
    };
    let created = meta
        .created()
        .or_else(|_| meta.modified())
        .map_err(|e| CoreError::io(&e, "inspect", &backup))?;

    Ok(Some(BackupInfo {
        path: backup,
        created,
        len: meta.len(),
    }))
}

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::backup::{self, BackupInfo};
use crate::edits::{self, GlobalEdit, GlobalFallback, WeaponUnlockSummary};
use crate::record::{FIELD_LEVELS_UNLOCKED, FIELD_MONEY, Record};
use crate::store::{self, LoadReport, LoadedDocument, RecordCollection, WriteStrategy};

use super::error::{CoreError, CoreErrorCode};
use super::types::Snapshot;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    pub global_fallback: GlobalFallback,
    pub write_strategy: WriteStrategy,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine {
    options: EngineOptions,
}

/// One open save: the resolved path plus its records, owned for the length
/// of an edit session.
#[derive(Debug, Clone)]
pub struct Session {
    path: PathBuf,
    records: RecordCollection,
    report: LoadReport,
    options: EngineOptions,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    pub fn open_path(&self, path: impl AsRef<Path>) -> Result<Session, CoreError> {
        let path = path.as_ref();
        let doc = store::load(path)?;
        Ok(self.session(path.to_path_buf(), doc))
    }

    /// Opens `primary`; if it does not exist, asks `prompt` for another path
    /// and tries that once. The returned session remembers whichever path
    /// actually loaded.
    pub fn open_path_or_prompt<F>(&self, primary: &Path, prompt: F) -> Result<Session, CoreError>
    where
        F: FnOnce(&Path) -> Option<PathBuf>,
    {
        match self.open_path(primary) {
            Err(e) if e.code == CoreErrorCode::NotFound => {
                warn!(path = %primary.display(), "save not found");
                let Some(fallback) = prompt(primary) else {
                    return Err(e);
                };
                self.open_path(&fallback)
            }
            other => other,
        }
    }

    pub fn open_text(&self, text: &str, path: impl Into<PathBuf>) -> Session {
        self.session(path.into(), store::parse_document(text))
    }

    fn session(&self, path: PathBuf, doc: LoadedDocument) -> Session {
        Session {
            path,
            records: doc.records,
            report: doc.report,
            options: self.options,
        }
    }
}

impl Session {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &RecordCollection {
        &self.records
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    pub fn snapshot(&self) -> Snapshot {
        let global = self.global();
        Snapshot {
            levels_unlocked: global.get_or(FIELD_LEVELS_UNLOCKED, JsonValue::from(0)),
            weapons_unlocked: edits::count_unlocked_weapons(&self.records),
            weapon_count: edits::weapon_count(&self.records),
            money: global.get_or(FIELD_MONEY, JsonValue::from(0)),
            has_global: edits::global_key(&self.records).is_some(),
            record_count: self.records.len(),
            warning_count: self.report.warnings.len(),
            dropped_count: self.report.dropped.len(),
        }
    }

    pub fn global(&self) -> Cow<'_, Record> {
        edits::global(&self.records)
    }

    pub fn count_unlocked_weapons(&self) -> usize {
        edits::count_unlocked_weapons(&self.records)
    }

    pub fn set_levels_unlocked(&mut self, levels: i64) -> Result<GlobalEdit, CoreError> {
        edits::set_levels_unlocked(&mut self.records, levels, self.options.global_fallback)
    }

    pub fn set_money(&mut self, input: &str) -> Result<GlobalEdit, CoreError> {
        edits::set_money(&mut self.records, input, self.options.global_fallback)
    }

    pub fn unlock_all_weapons(&mut self) -> WeaponUnlockSummary {
        edits::unlock_all_weapons(&mut self.records)
    }

    pub fn to_document_text(&self) -> String {
        self.records.to_document_text()
    }

    /// Writes every record back to the session path. On failure the
    /// in-memory records are still intact and can be saved again.
    pub fn save(&self) -> Result<(), CoreError> {
        store::save(&self.path, &self.records, self.options.write_strategy)
    }

    /// Re-reads the save from disk, discarding unsaved edits.
    pub fn reload(&mut self) -> Result<(), CoreError> {
        let doc = store::load(&self.path)?;
        self.records = doc.records;
        self.report = doc.report;
        Ok(())
    }

    pub fn create_backup(&self) -> Result<PathBuf, CoreError> {
        backup::create_backup(&self.path)
    }

    /// Copies the backup over the save and reloads from it.
    pub fn restore_backup(&mut self) -> Result<PathBuf, CoreError> {
        let backup = backup::restore_backup(&self.path)?;
        self.reload()?;
        Ok(backup)
    }

    pub fn backup_info(&self) -> Result<Option<BackupInfo>, CoreError> {
        backup::backup_info(&self.path)
    }
}

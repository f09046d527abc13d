use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{LoadedDocument, RecordCollection, parse_document};
use crate::core_api::{CoreError, CoreErrorCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WriteStrategy {
    /// Write a sibling temp file, then rename it over the save.
    #[default]
    Atomic,
    /// Truncate the save and rewrite it in place. A crash mid-write leaves a
    /// partial file.
    Truncate,
}

pub fn load(path: &Path) -> Result<LoadedDocument, CoreError> {
    let text = fs::read_to_string(path).map_err(|e| CoreError::from_io(&e, "read", path))?;
    let doc = parse_document(&text);
    info!(
        path = %path.display(),
        records = doc.records.len(),
        warnings = doc.report.warnings.len(),
        dropped = doc.report.dropped.len(),
        "loaded save"
    );
    Ok(doc)
}

pub fn save(
    path: &Path,
    records: &RecordCollection,
    strategy: WriteStrategy,
) -> Result<(), CoreError> {
    let text = records.to_document_text();
    match strategy {
        WriteStrategy::Truncate => {
            fs::write(path, text.as_bytes()).map_err(|e| CoreError::io(&e, "write", path))?;
        }
        WriteStrategy::Atomic => write_atomic(path, text.as_bytes())?,
    }
    info!(path = %path.display(), records = records.len(), ?strategy, "saved");
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CoreError> {
    let tmp = temp_path_for(path)?;
    let result = File::create(&tmp)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp, path));

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(CoreError::io(&e, "write", path));
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> Result<PathBuf, CoreError> {
    let Some(name) = path.file_name() else {
        return Err(CoreError::new(
            CoreErrorCode::Io,
            format!("save path {} has no file name", path.display()),
        ));
    };
    let mut tmp_name = OsString::from(".");
    tmp_name.push(name);
    tmp_name.push(".tmp");
    Ok(path.with_file_name(tmp_name))
}

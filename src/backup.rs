//! Backup document codec.
//!
//! A backup is a single JSON object holding the whole student collection and
//! the settings record. Files written by older builds carry no
//! `schemaVersion`; they are decoded by probing the known fields.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};
use crate::registry::Student;
use crate::settings::{self, Settings};

pub const BACKUP_SCHEMA_VERSION: u64 = 1;
pub const BACKUP_FILE_PREFIX: &str = "pluitpass_backup_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupFormat {
    /// No version tag.
    Legacy,
    V1,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BackupDocumentRef<'a> {
    students: &'a [Student],
    settings: &'a Settings,
    schema_version: u64,
}

/// What a backup decoded to. `None` slices leave the live state untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBackup {
    pub format: BackupFormat,
    pub students: Option<Vec<Student>>,
    pub settings: Option<Settings>,
}

pub fn export(students: &[Student], settings: &Settings) -> StoreResult<String> {
    let doc = BackupDocumentRef {
        students,
        settings,
        schema_version: BACKUP_SCHEMA_VERSION,
    };
    Ok(serde_json::to_string(&doc)?)
}

/// Decode `text` against the importing instance's `current` settings.
///
/// Settings in the document are overlaid on `current` and then backfilled
/// from `defaults`, so a field the backup lacks keeps its current value.
/// Nothing is returned unless the whole document decodes.
pub fn decode(text: &str, current: &Settings, defaults: &Settings) -> StoreResult<DecodedBackup> {
    let doc: Value = serde_json::from_str(text)?;
    let Some(obj) = doc.as_object() else {
        return Err(StoreError::ParseFailure(
            "backup must be a JSON object".to_string(),
        ));
    };

    let format = match obj.get("schemaVersion") {
        None | Some(Value::Null) => BackupFormat::Legacy,
        Some(v) => match v.as_u64() {
            Some(n) if n > BACKUP_SCHEMA_VERSION => {
                return Err(StoreError::UnsupportedVersion(n));
            }
            Some(_) => BackupFormat::V1,
            None => {
                return Err(StoreError::ParseFailure(
                    "schemaVersion must be a non-negative integer".to_string(),
                ))
            }
        },
    };

    let students = match obj.get("students") {
        Some(v @ Value::Array(_)) => Some(
            serde_json::from_value::<Vec<Student>>(v.clone())
                .map_err(|e| StoreError::ParseFailure(format!("invalid student record: {}", e)))?,
        ),
        _ => None,
    };

    let settings = match obj.get("settings") {
        Some(Value::Object(incoming)) => {
            let merged = settings::overlay(current, incoming);
            Some(settings::migrate(&merged, defaults))
        }
        _ => None,
    };

    Ok(DecodedBackup {
        format,
        students,
        settings,
    })
}

pub fn backup_file_name(date: NaiveDate) -> String {
    format!("{}{}.json", BACKUP_FILE_PREFIX, date.format("%Y-%m-%d"))
}

pub fn write_backup_file(dir: &Path, text: &str, date: NaiveDate) -> StoreResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(backup_file_name(date));
    std::fs::write(&path, text)?;
    Ok(path)
}

pub fn read_backup_file(path: &Path) -> StoreResult<String> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes)
        .map_err(|_| StoreError::ParseFailure("backup file is not valid UTF-8".to_string()))
}

//! Key/value persistence behind the data store.
//!
//! Students and settings live under independent keys and are written
//! independently; there is no atomicity across keys.

use rusqlite::Connection;
use std::collections::HashMap;
use std::path::Path;

use crate::db;
use crate::error::{StoreError, StoreResult};

pub const STUDENTS_KEY: &str = "students";
pub const SETTINGS_KEY: &str = "settings";

pub trait KvStore {
    fn load(&self, key: &str) -> StoreResult<Option<String>>;
    fn save(&mut self, key: &str, text: &str) -> StoreResult<()>;
}

/// SQLite-backed store living in a workspace directory.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(workspace: &Path) -> StoreResult<Self> {
        let conn = db::open_db(workspace)
            .map_err(|e| StoreError::Storage(format!("{e:#}")))?;
        Ok(Self { conn })
    }
}

impl KvStore for SqliteStore {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(db::kv_get(&self.conn, key)?)
    }

    fn save(&mut self, key: &str, text: &str) -> StoreResult<()> {
        db::kv_set(&self.conn, key, text)?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, text: &str) -> Self {
        self.entries.insert(key.to_string(), text.to_string());
        self
    }
}

impl KvStore for MemoryStore {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, text: &str) -> StoreResult<()> {
        self.entries.insert(key.to_string(), text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_store_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let mut store = SqliteStore::open(dir.path()).expect("open");
            store.save(SETTINGS_KEY, r#"{"schoolName":"A"}"#).expect("save");
        }
        let store = SqliteStore::open(dir.path()).expect("reopen");
        assert_eq!(
            store.load(SETTINGS_KEY).expect("load").as_deref(),
            Some(r#"{"schoolName":"A"}"#)
        );
        assert_eq!(store.load(STUDENTS_KEY).expect("load"), None);
    }

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryStore::new();
        store.save(STUDENTS_KEY, "[]").expect("save");
        assert_eq!(store.load(STUDENTS_KEY).expect("load").as_deref(), Some("[]"));
    }
}

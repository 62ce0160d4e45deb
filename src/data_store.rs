//! The single state container: student registry plus settings, bound to a
//! key/value store. Every mutation re-serializes the slice it touched.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::backup::{self, BackupFormat};
use crate::error::{StoreError, StoreResult};
use crate::registry::{NewStudent, Registry, Student, StudentPatch};
use crate::settings::{self, Settings, SettingsPatch};
use crate::store::{KvStore, SETTINGS_KEY, STUDENTS_KEY};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub format: BackupFormat,
    pub students_replaced: bool,
    pub student_count: usize,
    pub settings_replaced: bool,
}

/// Operations the IPC surface needs; handlers only see this trait.
pub trait ResultsStore {
    fn students(&self) -> &[Student];
    fn settings(&self) -> &Settings;
    fn add_student(&mut self, candidate: NewStudent) -> StoreResult<Student>;
    /// `Ok(None)` when no student has this identity.
    fn update_student(&mut self, id: &str, patch: StudentPatch) -> StoreResult<Option<Student>>;
    /// `Ok(false)` when no student has this identity.
    fn delete_student(&mut self, id: &str) -> StoreResult<bool>;
    fn replace_all_students(&mut self, students: Vec<Student>) -> StoreResult<()>;
    fn find_by_nisn(&self, nisn: &str) -> Option<&Student>;
    fn update_settings(&mut self, patch: SettingsPatch) -> StoreResult<&Settings>;
    fn export_backup(&self) -> StoreResult<String>;
    fn import_backup(&mut self, text: &str) -> StoreResult<ImportSummary>;
}

pub struct DataStore<S: KvStore> {
    store: S,
    registry: Registry,
    settings: Settings,
    defaults: Settings,
}

impl<S: KvStore> DataStore<S> {
    /// Load persisted state, migrate settings and write both slices back.
    pub fn open(store: S) -> StoreResult<Self> {
        Self::open_at(store, Utc::now())
    }

    /// Like [`DataStore::open`] with an explicit clock for the defaults.
    pub fn open_at(store: S, now: DateTime<Utc>) -> StoreResult<Self> {
        let defaults = Settings::defaults_at(now);

        let students = match store.load(STUDENTS_KEY)? {
            Some(text) => serde_json::from_str::<Vec<Student>>(&text).map_err(|e| {
                error!(key = STUDENTS_KEY, error = %e, "persisted students are corrupt");
                StoreError::ParseFailure(format!("persisted students: {}", e))
            })?,
            None => Vec::new(),
        };

        let settings = match store.load(SETTINGS_KEY)? {
            Some(text) => match serde_json::from_str::<Value>(&text) {
                Ok(raw) => {
                    let (migrated, backfilled) = settings::migrate_with_report(&raw, &defaults);
                    if !backfilled.is_empty() {
                        info!(backfilled = ?backfilled, "backfilled settings from defaults");
                    }
                    migrated
                }
                Err(e) => {
                    warn!(key = SETTINGS_KEY, error = %e, "persisted settings are corrupt, using defaults");
                    defaults.clone()
                }
            },
            None => {
                info!("no persisted settings, initializing defaults");
                defaults.clone()
            }
        };

        let mut data = Self {
            store,
            registry: Registry::new(students),
            settings,
            defaults,
        };
        data.persist_students()?;
        data.persist_settings()?;
        info!(students = data.registry.len(), "data store opened");
        Ok(data)
    }

    pub fn defaults(&self) -> &Settings {
        &self.defaults
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist_students(&mut self) -> StoreResult<()> {
        let text = serde_json::to_string(self.registry.students())?;
        self.store.save(STUDENTS_KEY, &text)
    }

    fn persist_settings(&mut self) -> StoreResult<()> {
        let text = serde_json::to_string(&self.settings)?;
        self.store.save(SETTINGS_KEY, &text)
    }
}

impl<S: KvStore> ResultsStore for DataStore<S> {
    fn students(&self) -> &[Student] {
        self.registry.students()
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn add_student(&mut self, candidate: NewStudent) -> StoreResult<Student> {
        let student = self.registry.add(candidate);
        self.persist_students()?;
        Ok(student)
    }

    fn update_student(&mut self, id: &str, patch: StudentPatch) -> StoreResult<Option<Student>> {
        let Some(updated) = self.registry.update(id, patch) else {
            return Ok(None);
        };
        self.persist_students()?;
        Ok(Some(updated))
    }

    fn delete_student(&mut self, id: &str) -> StoreResult<bool> {
        if !self.registry.remove(id) {
            return Ok(false);
        }
        self.persist_students()?;
        Ok(true)
    }

    fn replace_all_students(&mut self, students: Vec<Student>) -> StoreResult<()> {
        self.registry.replace_all(students);
        self.persist_students()
    }

    fn find_by_nisn(&self, nisn: &str) -> Option<&Student> {
        self.registry.find(nisn)
    }

    fn update_settings(&mut self, patch: SettingsPatch) -> StoreResult<&Settings> {
        let mut next = self.settings.clone();
        next.apply_patch(patch);
        self.settings = settings::migrate(&next.to_value(), &self.defaults);
        self.persist_settings()?;
        Ok(&self.settings)
    }

    fn export_backup(&self) -> StoreResult<String> {
        backup::export(self.registry.students(), &self.settings)
    }

    fn import_backup(&mut self, text: &str) -> StoreResult<ImportSummary> {
        let decoded = backup::decode(text, &self.settings, &self.defaults)?;

        let students_replaced = decoded.students.is_some();
        let settings_replaced = decoded.settings.is_some();
        if let Some(students) = decoded.students {
            self.registry.replace_all(students);
            self.persist_students()?;
        }
        if let Some(settings) = decoded.settings {
            self.settings = settings;
            self.persist_settings()?;
        }

        let summary = ImportSummary {
            format: decoded.format,
            students_replaced,
            student_count: self.registry.len(),
            settings_replaced,
        };
        info!(?summary, "backup imported");
        Ok(summary)
    }
}

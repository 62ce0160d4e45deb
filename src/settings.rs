//! Site settings: hardcoded defaults, backfill migration and patch merge.
//!
//! Persisted settings may come from older builds that did not know every
//! field. Whatever is loaded goes through [`migrate`] so the record held in
//! memory is always fully populated.

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_SCHOOL_NAME: &str = "SMP REMAJA PLUIT";
pub const DEFAULT_LOGO_URL: &str = "https://via.placeholder.com/150";
pub const DEFAULT_SCHOOL_YEAR: &str = "2024/2025";
pub const DEFAULT_ADDITIONAL_INFO: &str = "Untuk informasi lebih lanjut, silakan hubungi pihak sekolah melalui nomor telepon (021) 6620123 atau email info@remajapluit.sch.id.";
pub const DEFAULT_ANNOUNCEMENT_LEAD_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub school_name: String,
    pub announcement_date: String,
    pub show_results: bool,
    pub logo_url: String,
    pub school_year: String,
    pub additional_info: String,
}

/// Partial update submitted from the settings form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsPatch {
    pub school_name: Option<String>,
    pub announcement_date: Option<String>,
    pub show_results: Option<bool>,
    pub logo_url: Option<String>,
    pub school_year: Option<String>,
    pub additional_info: Option<String>,
}

impl Settings {
    /// Defaults as of `now`; the announcement is scheduled a week ahead.
    pub fn defaults_at(now: DateTime<Utc>) -> Self {
        let announcement = now + Duration::days(DEFAULT_ANNOUNCEMENT_LEAD_DAYS);
        Self {
            school_name: DEFAULT_SCHOOL_NAME.to_string(),
            announcement_date: announcement.to_rfc3339_opts(SecondsFormat::Millis, true),
            show_results: false,
            logo_url: DEFAULT_LOGO_URL.to_string(),
            school_year: DEFAULT_SCHOOL_YEAR.to_string(),
            additional_info: DEFAULT_ADDITIONAL_INFO.to_string(),
        }
    }

    /// Parsed announcement instant.
    ///
    /// Accepts RFC 3339 instants and bare `YYYY-MM-DD` dates (midnight UTC).
    /// Anything else yields `None`, which callers treat as already announced.
    pub fn announcement_at(&self) -> Option<DateTime<Utc>> {
        parse_announcement(&self.announcement_date)
    }

    pub fn apply_patch(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.school_name {
            self.school_name = v;
        }
        if let Some(v) = patch.announcement_date {
            self.announcement_date = v;
        }
        if let Some(v) = patch.show_results {
            self.show_results = v;
        }
        if let Some(v) = patch.logo_url {
            self.logo_url = v;
        }
        if let Some(v) = patch.school_year {
            self.school_year = v;
        }
        if let Some(v) = patch.additional_info {
            self.additional_info = v;
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

pub fn parse_announcement(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Produce a fully populated record from an arbitrary persisted shape.
///
/// A field survives only when present, of the right JSON type, and truthy
/// (non-empty string, `true`); everything else takes the default.
pub fn migrate(raw: &Value, defaults: &Settings) -> Settings {
    migrate_with_report(raw, defaults).0
}

/// Like [`migrate`], also returning the keys that were backfilled.
pub fn migrate_with_report(raw: &Value, defaults: &Settings) -> (Settings, Vec<&'static str>) {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);
    let mut backfilled = Vec::new();

    let mut text = |key: &'static str, default: &str| -> String {
        match obj.get(key).and_then(Value::as_str) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => {
                backfilled.push(key);
                default.to_string()
            }
        }
    };

    let school_name = text("schoolName", &defaults.school_name);
    let announcement_date = text("announcementDate", &defaults.announcement_date);
    let logo_url = text("logoUrl", &defaults.logo_url);
    let school_year = text("schoolYear", &defaults.school_year);
    let additional_info = text("additionalInfo", &defaults.additional_info);

    let show_results = match obj.get("showResults").and_then(Value::as_bool) {
        Some(true) => true,
        _ => {
            if defaults.show_results {
                backfilled.push("showResults");
            }
            defaults.show_results
        }
    };

    (
        Settings {
            school_name,
            announcement_date,
            show_results,
            logo_url,
            school_year,
            additional_info,
        },
        backfilled,
    )
}

/// Overlay `incoming` onto `current` field by field.
///
/// Keys the incoming object lacks keep their current value. A wrong-typed
/// value is ignored; `null` is taken as-is so migration can backfill it.
pub fn overlay(current: &Settings, incoming: &Map<String, Value>) -> Value {
    let mut merged = match current.to_value() {
        Value::Object(m) => m,
        _ => Map::new(),
    };
    for key in [
        "schoolName",
        "announcementDate",
        "logoUrl",
        "schoolYear",
        "additionalInfo",
    ] {
        match incoming.get(key) {
            Some(v @ Value::String(_)) | Some(v @ Value::Null) => {
                merged.insert(key.to_string(), v.clone());
            }
            _ => {}
        }
    }
    match incoming.get("showResults") {
        Some(v @ Value::Bool(_)) | Some(v @ Value::Null) => {
            merged.insert("showResults".to_string(), v.clone());
        }
        _ => {}
    }
    Value::Object(merged)
}

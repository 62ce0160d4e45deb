use chrono::{TimeZone, Utc};
use pluitpass::data_store::{DataStore, ResultsStore};
use pluitpass::settings::{self, Settings, DEFAULT_ADDITIONAL_INFO, DEFAULT_SCHOOL_YEAR};
use pluitpass::store::{KvStore, MemoryStore, SETTINGS_KEY};
use serde_json::json;

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap()
}

#[test]
fn older_settings_shape_is_backfilled_on_open() {
    // Written by a build that predates schoolYear and additionalInfo.
    let older = json!({
        "schoolName": "SMP Lama",
        "announcementDate": "2025-06-01T00:00:00.000Z",
        "showResults": true,
        "logoUrl": "https://example.test/logo.png"
    });
    let store = MemoryStore::new().with_entry(SETTINGS_KEY, &older.to_string());
    let data = DataStore::open_at(store, now()).expect("open");

    let s = data.settings();
    assert_eq!(s.school_name, "SMP Lama");
    assert!(s.show_results);
    assert_eq!(s.school_year, DEFAULT_SCHOOL_YEAR);
    assert_eq!(s.additional_info, DEFAULT_ADDITIONAL_INFO);

    // The upgraded record is written straight back.
    let saved = data.store().load(SETTINGS_KEY).expect("load").expect("saved");
    let saved: Settings = serde_json::from_str(&saved).expect("full record");
    assert_eq!(&saved, s);
}

#[test]
fn falsy_fields_take_defaults() {
    let defaults = Settings::defaults_at(now());
    let migrated = settings::migrate(
        &json!({ "schoolName": "", "showResults": false, "schoolYear": 2025 }),
        &defaults,
    );
    assert_eq!(migrated, defaults);
}

#[test]
fn migrating_twice_changes_nothing() {
    let defaults = Settings::defaults_at(now());
    let once = settings::migrate(&json!({ "schoolName": "SMP A" }), &defaults);
    let twice = settings::migrate(&once.to_value(), &defaults);
    assert_eq!(once, twice);
}

#[test]
fn unparseable_announcement_counts_as_announced() {
    let mut s = Settings::defaults_at(now());
    s.announcement_date = "besok pagi".to_string();
    assert_eq!(s.announcement_at(), None);
    assert!(pluitpass::countdown::countdown(s.announcement_at(), now()).is_expired());
}

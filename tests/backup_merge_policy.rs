use chrono::{TimeZone, Utc};
use pluitpass::backup::BackupFormat;
use pluitpass::data_store::{DataStore, ResultsStore};
use pluitpass::error::StoreError;
use pluitpass::registry::{NewStudent, StudentStatus};
use pluitpass::settings::SettingsPatch;
use pluitpass::store::MemoryStore;
use serde_json::json;

fn seeded() -> DataStore<MemoryStore> {
    let now = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
    let mut data = DataStore::open_at(MemoryStore::new(), now).expect("open");
    for (name, nisn, status) in [
        ("Ana", "001", StudentStatus::Passed),
        ("Budi", "002", StudentStatus::Failed),
    ] {
        data.add_student(NewStudent {
            name: name.to_string(),
            nisn: nisn.to_string(),
            class: "9A".to_string(),
            status,
            score: Some(70.0),
        })
        .expect("add");
    }
    data.update_settings(SettingsPatch {
        school_year: Some("2025/2026".to_string()),
        show_results: Some(true),
        ..Default::default()
    })
    .expect("settings");
    data
}

#[test]
fn export_then_import_restores_state() {
    let source = seeded();
    let text = source.export_backup().expect("export");
    let doc: serde_json::Value = serde_json::from_str(&text).expect("json");
    assert_eq!(doc["schemaVersion"], json!(1));

    let mut target = DataStore::open(MemoryStore::new()).expect("open");
    let summary = target.import_backup(&text).expect("import");
    assert_eq!(summary.format, BackupFormat::V1);
    assert_eq!(summary.student_count, 2);
    assert_eq!(target.students(), source.students());
    assert_eq!(target.settings(), source.settings());
}

#[test]
fn legacy_backup_without_students_keeps_registry() {
    let mut data = seeded();
    let before = data.students().to_vec();
    let text = json!({ "settings": { "schoolName": "SMP Impor" } }).to_string();

    let summary = data.import_backup(&text).expect("import");
    assert_eq!(summary.format, BackupFormat::Legacy);
    assert!(!summary.students_replaced);
    assert!(summary.settings_replaced);
    assert_eq!(data.students(), before.as_slice());
    assert_eq!(data.settings().school_name, "SMP Impor");
    // Fields absent from the backup keep their current values.
    assert_eq!(data.settings().school_year, "2025/2026");
    assert!(data.settings().show_results);
}

#[test]
fn empty_student_array_clears_registry() {
    let mut data = seeded();
    let summary = data
        .import_backup(&json!({ "students": [] }).to_string())
        .expect("import");
    assert!(summary.students_replaced);
    assert!(!summary.settings_replaced);
    assert!(data.students().is_empty());
}

#[test]
fn backup_from_spreadsheet_era_imports() {
    let mut data = seeded();
    let text = json!({
        "students": [
            { "id": 17171717, "name": "Citra", "nisn": 9981, "class": 9, "status": "LULUS", "score": "88" },
            { "id": "k2", "name": "Dedi", "nisn": "9982", "kelas": "9B", "status": "passed", "score": 71 },
            { "id": "k3", "name": "Eka", "nisn": "9983" }
        ],
        "settings": { "schoolName": "SMP Lama" }
    })
    .to_string();

    let summary = data.import_backup(&text).expect("import");
    assert_eq!(summary.format, BackupFormat::Legacy);
    assert_eq!(summary.student_count, 3);

    let citra = data.find_by_nisn("9981").expect("numeric nisn kept as text");
    assert_eq!(citra.id, "17171717");
    assert_eq!(citra.class, "9");
    assert_eq!(citra.status, StudentStatus::Pending);
    assert_eq!(citra.score, Some(88.0));

    let dedi = data.find_by_nisn("9982").expect("dedi");
    assert_eq!(dedi.class, "");
    assert_eq!(dedi.status, StudentStatus::Passed);
    assert_eq!(dedi.score, Some(71.0));

    let eka = data.find_by_nisn("9983").expect("eka");
    assert_eq!(eka.status, StudentStatus::Pending);
    assert_eq!(eka.score, None);

    // A re-export is canonical and imports to the same state.
    let again = data.export_backup().expect("export");
    let before = data.students().to_vec();
    data.import_backup(&again).expect("reimport");
    assert_eq!(data.students(), before.as_slice());
}

#[test]
fn rejected_documents_change_nothing() {
    let mut data = seeded();
    let students = data.students().to_vec();
    let settings = data.settings().clone();

    assert!(matches!(
        data.import_backup("{ nope"),
        Err(StoreError::ParseFailure(_))
    ));
    assert!(matches!(
        data.import_backup(&json!({ "schemaVersion": 2, "students": [] }).to_string()),
        Err(StoreError::UnsupportedVersion(2))
    ));
    assert!(matches!(
        data.import_backup(&json!({ "students": [{ "name": "tanpa id" }] }).to_string()),
        Err(StoreError::ParseFailure(_))
    ));
    assert_eq!(data.students(), students.as_slice());
    assert_eq!(data.settings(), &settings);
}

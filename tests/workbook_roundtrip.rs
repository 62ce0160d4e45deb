use calamine::{Data, Range};
use pluitpass::error::StoreError;
use pluitpass::registry::{Student, StudentStatus};
use pluitpass::spreadsheet::{read_workbook, rows_from_range, students_from_rows, write_workbook};

fn student(id: &str, name: &str, nisn: &str, status: StudentStatus, score: Option<f64>) -> Student {
    Student {
        id: id.to_string(),
        name: name.to_string(),
        nisn: nisn.to_string(),
        class: "9B".to_string(),
        status,
        score,
    }
}

#[test]
fn written_workbook_reads_back() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("data_siswa.xlsx");
    let students = vec![
        student("a", "Ana", "0012345", StudentStatus::Passed, Some(88.5)),
        student("b", "Budi", "0012346", StudentStatus::Pending, None),
        student("c", "Citra", "0012347", StudentStatus::Failed, Some(54.0)),
    ];

    assert_eq!(write_workbook(&path, &students).expect("write"), 3);
    let back = read_workbook(&path).expect("read");
    assert_eq!(back, students);
}

#[test]
fn alias_headers_map_to_fields() {
    let mut range: Range<Data> = Range::new((0, 0), (2, 4));
    for (col, header) in ["nama", "nisn", "kelas", "status", "nilai"].iter().enumerate() {
        range.set_value((0, col as u32), Data::String(header.to_string()));
    }
    range.set_value((1, 0), Data::String("Dewi".to_string()));
    range.set_value((1, 1), Data::Float(9981.0));
    range.set_value((1, 2), Data::String("9C".to_string()));
    range.set_value((1, 3), Data::String("failed".to_string()));
    range.set_value((1, 4), Data::Int(61));

    let students = students_from_rows(rows_from_range(&range));
    // Row 2 is entirely empty and is skipped.
    assert_eq!(students.len(), 1);
    let s = &students[0];
    assert_eq!(s.name, "Dewi");
    assert_eq!(s.nisn, "9981");
    assert_eq!(s.class, "9C");
    assert_eq!(s.status, StudentStatus::Failed);
    assert_eq!(s.score, Some(61.0));
    assert!(!s.id.is_empty());
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(matches!(
        read_workbook(&dir.path().join("absent.xlsx")),
        Err(StoreError::Io(_))
    ));
}

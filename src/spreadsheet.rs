//! Bulk student entry through `.xlsx` / `.xls` workbooks.
//!
//! Rows are header-keyed maps, one per student. Import accepts either the
//! internal column name or its Indonesian alias for name, class and score.

use calamine::{open_workbook_auto, Data, Range, Reader};
use rust_xlsxwriter::Workbook;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{StoreError, StoreResult};
use crate::registry::{format_number, new_student_id, Student, StudentStatus};

pub const SHEET_NAME: &str = "Students";
pub const DEFAULT_EXPORT_FILE_NAME: &str = "data_siswa.xlsx";
pub const COLUMNS: [&str; 6] = ["id", "name", "nisn", "class", "status", "score"];

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    fn is_truthy(&self) -> bool {
        match self {
            CellValue::Text(s) => !s.is_empty(),
            CellValue::Number(n) => *n != 0.0 && !n.is_nan(),
            CellValue::Bool(b) => *b,
        }
    }

    fn to_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => b.to_string(),
        }
    }

    /// Non-finite values (`"NaN"`, `"inf"`) cannot be persisted and count as
    /// no score.
    fn to_number(&self) -> Option<f64> {
        let n = match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            CellValue::Bool(_) => None,
        };
        n.filter(|n| n.is_finite())
    }
}

pub type SheetRow = HashMap<String, CellValue>;

pub fn students_to_rows(students: &[Student]) -> Vec<SheetRow> {
    students
        .iter()
        .map(|s| {
            let mut row = SheetRow::new();
            row.insert("id".into(), CellValue::Text(s.id.clone()));
            row.insert("name".into(), CellValue::Text(s.name.clone()));
            row.insert("nisn".into(), CellValue::Text(s.nisn.clone()));
            row.insert("class".into(), CellValue::Text(s.class.clone()));
            row.insert("status".into(), CellValue::Text(s.status.as_str().into()));
            if let Some(score) = s.score {
                row.insert("score".into(), CellValue::Number(score));
            }
            row
        })
        .collect()
}

fn first_truthy<'a>(row: &'a SheetRow, keys: &[&str]) -> Option<&'a CellValue> {
    keys.iter()
        .filter_map(|k| row.get(*k))
        .find(|v| v.is_truthy())
}

/// Map imported rows to students. Missing cells fall back to an empty
/// string, a fresh id, `pending` status and no score. Scores and school IDs
/// are not validated.
pub fn students_from_rows(rows: Vec<SheetRow>) -> Vec<Student> {
    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| {
            let id = first_truthy(&row, &["id"])
                .map(CellValue::to_text)
                .unwrap_or_else(new_student_id);
            let name = first_truthy(&row, &["name", "nama"])
                .map(CellValue::to_text)
                .unwrap_or_default();
            let nisn = first_truthy(&row, &["nisn"])
                .map(CellValue::to_text)
                .unwrap_or_default();
            let class = first_truthy(&row, &["class", "kelas"])
                .map(CellValue::to_text)
                .unwrap_or_default();
            let status = match first_truthy(&row, &["status"]) {
                None => StudentStatus::Pending,
                Some(cell) => {
                    let raw = cell.to_text();
                    StudentStatus::parse(&raw).unwrap_or_else(|| {
                        warn!(row = idx + 2, status = %raw, "unknown status in workbook, using pending");
                        StudentStatus::Pending
                    })
                }
            };
            let score = first_truthy(&row, &["score", "nilai"]).and_then(CellValue::to_number);
            Student {
                id,
                name,
                nisn,
                class,
                status,
                score,
            }
        })
        .collect()
}

fn cell_from_data(d: &Data) -> Option<CellValue> {
    match d {
        Data::Empty => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::DateTime(dt) => Some(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
        Data::Error(_) => None,
    }
}

/// First row is the header; later rows become maps keyed by it. Empty cells
/// are left out and rows with no cells at all are skipped.
pub fn rows_from_range(range: &Range<Data>) -> Vec<SheetRow> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let headers: Vec<Option<String>> = header
        .iter()
        .map(|d| cell_from_data(d).map(|c| c.to_text().trim().to_string()))
        .collect();

    let mut out = Vec::new();
    for cells in rows {
        let mut row = SheetRow::new();
        for (col, d) in cells.iter().enumerate() {
            let Some(Some(key)) = headers.get(col) else {
                continue;
            };
            if let Some(cell) = cell_from_data(d) {
                row.insert(key.clone(), cell);
            }
        }
        if !row.is_empty() {
            out.push(row);
        }
    }
    out
}

pub fn read_workbook(path: &Path) -> StoreResult<Vec<Student>> {
    // Surface a missing file as an io error rather than a parse failure.
    std::fs::metadata(path)?;
    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| StoreError::ParseFailure("workbook has no sheets".to_string()))?;
    let range = workbook.worksheet_range(&sheet_name)?;
    let students = students_from_rows(rows_from_range(&range));
    info!(path = %path.display(), sheet = %sheet_name, rows = students.len(), "read student workbook");
    Ok(students)
}

pub fn write_workbook(path: &Path, students: &[Student]) -> StoreResult<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in COLUMNS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name)?;
    }
    let rows = students_to_rows(students);
    for (r, row) in rows.iter().enumerate() {
        let excel_row = (r + 1) as u32;
        for (col, name) in COLUMNS.iter().enumerate() {
            match row.get(*name) {
                Some(CellValue::Text(s)) => {
                    worksheet.write_string(excel_row, col as u16, s.as_str())?;
                }
                Some(CellValue::Number(n)) => {
                    worksheet.write_number(excel_row, col as u16, *n)?;
                }
                Some(CellValue::Bool(b)) => {
                    worksheet.write_boolean(excel_row, col as u16, *b)?;
                }
                None => {}
            }
        }
    }

    workbook.save(path)?;
    info!(path = %path.display(), rows = rows.len(), "wrote student workbook");
    Ok(rows.len())
}

//! Public lookup by school ID.
//!
//! What a visitor sees is gated by the `showResults` setting, independent of
//! the student's stored status.

use serde::Serialize;

use crate::data_store::ResultsStore;
use crate::registry::{Student, StudentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PublicStatus {
    Passed,
    Failed,
    /// Results are visible but this student is still pending.
    Processing,
    /// Results are hidden site-wide.
    NotYetAvailable,
}

impl PublicStatus {
    /// The wording shown on the public page.
    pub fn label(self) -> &'static str {
        match self {
            PublicStatus::Passed => "LULUS",
            PublicStatus::Failed => "TIDAK LULUS",
            PublicStatus::Processing => "Sedang diproses",
            PublicStatus::NotYetAvailable => "Hasil belum dapat ditampilkan",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicResult {
    pub name: String,
    pub nisn: String,
    pub class: String,
    pub status: PublicStatus,
    pub status_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The query was blank after trimming.
    EmptyQuery,
    NotFound,
    Found(PublicResult),
}

pub fn present(student: &Student, show_results: bool) -> PublicResult {
    let status = if !show_results {
        PublicStatus::NotYetAvailable
    } else {
        match student.status {
            StudentStatus::Passed => PublicStatus::Passed,
            StudentStatus::Failed => PublicStatus::Failed,
            StudentStatus::Pending => PublicStatus::Processing,
        }
    };
    PublicResult {
        name: student.name.clone(),
        nisn: student.nisn.clone(),
        class: student.class.clone(),
        status,
        status_label: status.label(),
        score: if show_results { student.score } else { None },
    }
}

pub fn lookup(data: &dyn ResultsStore, query: &str) -> SearchOutcome {
    let nisn = query.trim();
    if nisn.is_empty() {
        return SearchOutcome::EmptyQuery;
    }
    match data.find_by_nisn(nisn) {
        Some(student) => SearchOutcome::Found(present(student, data.settings().show_results)),
        None => SearchOutcome::NotFound,
    }
}

//! Student records and the in-memory registry.
//!
//! The registry keeps insertion order and only guarantees that `id` is
//! unique. NISN duplicates and out-of-range scores are accepted as-is.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};
use std::cmp::Ordering;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    Passed,
    Failed,
    #[default]
    Pending,
}

impl StudentStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "passed" => Some(Self::Passed),
            "failed" => Some(Self::Failed),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Pending => "pending",
        }
    }
}

/// Always serialized in the canonical shape. Decoding also accepts what
/// older spreadsheet imports saved: numeric text fields, free-text or
/// missing status, and scores stored as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredStudent")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub nisn: String,
    pub class: String,
    pub status: StudentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(Number),
}

impl TextOrNumber {
    fn into_text(self) -> String {
        match self {
            TextOrNumber::Text(s) => s,
            TextOrNumber::Number(n) => match n.as_f64() {
                Some(f) if n.is_f64() => format_number(f),
                _ => n.to_string(),
            },
        }
    }
}

#[derive(Deserialize)]
struct StoredStudent {
    id: TextOrNumber,
    #[serde(default)]
    name: Option<TextOrNumber>,
    #[serde(default)]
    nisn: Option<TextOrNumber>,
    #[serde(default)]
    class: Option<TextOrNumber>,
    #[serde(default)]
    status: Option<Value>,
    #[serde(default)]
    score: Option<Value>,
}

impl From<StoredStudent> for Student {
    fn from(raw: StoredStudent) -> Self {
        let id = raw.id.into_text();
        let status = match raw.status {
            None | Some(Value::Null) => StudentStatus::Pending,
            Some(Value::String(s)) if s.is_empty() => StudentStatus::Pending,
            Some(other) => {
                let parsed = other.as_str().and_then(StudentStatus::parse);
                parsed.unwrap_or_else(|| {
                    warn!(student_id = %id, status = %other, "unknown stored status, using pending");
                    StudentStatus::Pending
                })
            }
        };
        let score = match raw.score {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|n| n.is_finite());
        Student {
            id,
            name: raw.name.map(TextOrNumber::into_text).unwrap_or_default(),
            nisn: raw.nisn.map(TextOrNumber::into_text).unwrap_or_default(),
            class: raw.class.map(TextOrNumber::into_text).unwrap_or_default(),
            status,
            score,
        }
    }
}

/// Whole numbers render without a fractional part, so a numeric NISN reads
/// back as `"12345"` rather than `"12345.0"`.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// A student as submitted by the add form, before it has an identity.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub nisn: String,
    pub class: String,
    #[serde(default)]
    pub status: StudentStatus,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub nisn: Option<String>,
    pub class: Option<String>,
    pub status: Option<StudentStatus>,
    /// Absent keeps the score, `null` clears it.
    #[serde(default, deserialize_with = "deserialize_score_patch")]
    pub score: Option<Option<f64>>,
}

fn deserialize_score_patch<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

impl Student {
    pub fn apply_patch(&mut self, patch: StudentPatch) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.nisn {
            self.nisn = v;
        }
        if let Some(v) = patch.class {
            self.class = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.score {
            self.score = v;
        }
    }
}

pub fn new_student_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    students: Vec<Student>,
}

impl Registry {
    pub fn new(students: Vec<Student>) -> Self {
        Self { students }
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn add(&mut self, candidate: NewStudent) -> Student {
        let mut id = new_student_id();
        while self.get(&id).is_some() {
            id = new_student_id();
        }
        let student = Student {
            id,
            name: candidate.name,
            nisn: candidate.nisn,
            class: candidate.class,
            status: candidate.status,
            score: candidate.score,
        };
        self.students.push(student.clone());
        student
    }

    pub fn get(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    /// Returns the updated record, or `None` when `id` is unknown.
    pub fn update(&mut self, id: &str, patch: StudentPatch) -> Option<Student> {
        let student = self.students.iter_mut().find(|s| s.id == id)?;
        student.apply_patch(patch);
        Some(student.clone())
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.students.len();
        self.students.retain(|s| s.id != id);
        self.students.len() != before
    }

    pub fn replace_all(&mut self, students: Vec<Student>) {
        self.students = students;
    }

    /// First record with this school ID, in insertion order.
    pub fn find(&self, nisn: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.nisn == nisn)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
}

impl StatusCounts {
    /// Whole-number share of the total, as the dashboard cards show it.
    pub fn percent_of_total(&self, count: usize) -> u32 {
        let denom = self.total.max(1) as f64;
        ((count as f64 / denom) * 100.0).round() as u32
    }
}

pub fn count_by_status(students: &[Student]) -> StatusCounts {
    let mut counts = StatusCounts {
        total: students.len(),
        ..Default::default()
    };
    for s in students {
        match s.status {
            StudentStatus::Passed => counts.passed += 1,
            StudentStatus::Failed => counts.failed += 1,
            StudentStatus::Pending => counts.pending += 1,
        }
    }
    counts
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(StudentStatus),
}

impl StatusFilter {
    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        StudentStatus::parse(s).map(Self::Only)
    }

    fn matches(self, status: StudentStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(want) => want == status,
        }
    }
}

/// Students matching the status filter whose name, NISN or class contains
/// `term` (case-insensitive). An empty term matches everything.
pub fn filter_students<'a>(
    students: &'a [Student],
    filter: StatusFilter,
    term: &str,
) -> Vec<&'a Student> {
    let needle = term.trim().to_lowercase();
    students
        .iter()
        .filter(|s| filter.matches(s.status))
        .filter(|s| {
            needle.is_empty()
                || s.name.to_lowercase().contains(&needle)
                || s.nisn.to_lowercase().contains(&needle)
                || s.class.to_lowercase().contains(&needle)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Insertion,
    Name,
    Nisn,
    Class,
}

impl SortKey {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "insertion" | "" => Some(Self::Insertion),
            "name" => Some(Self::Name),
            "nisn" => Some(Self::Nisn),
            "class" => Some(Self::Class),
            _ => None,
        }
    }
}

/// Stable sort; ties keep insertion order.
pub fn sort_students(students: &mut [&Student], key: SortKey) {
    let cmp = |a: &&Student, b: &&Student| -> Ordering {
        match key {
            SortKey::Insertion => Ordering::Equal,
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortKey::Nisn => a.nisn.cmp(&b.nisn),
            SortKey::Class => a
                .class
                .to_lowercase()
                .cmp(&b.class.to_lowercase())
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        }
    };
    students.sort_by(cmp);
}

/// The dashboard's "latest students" panel: first `n` in insertion order.
pub fn recent(students: &[Student], n: usize) -> &[Student] {
    &students[..students.len().min(n)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate(name: &str, nisn: &str, class: &str, status: StudentStatus) -> NewStudent {
        NewStudent {
            name: name.to_string(),
            nisn: nisn.to_string(),
            class: class.to_string(),
            status,
            score: None,
        }
    }

    #[test]
    fn add_assigns_unique_ids_and_keeps_order() {
        let mut reg = Registry::default();
        let a = reg.add(candidate("Ana", "001", "9A", StudentStatus::Pending));
        let b = reg.add(candidate("Budi", "002", "9B", StudentStatus::Passed));
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        let names: Vec<_> = reg.students().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Budi"]);
    }

    #[test]
    fn duplicate_nisn_is_allowed_and_find_returns_first() {
        let mut reg = Registry::default();
        let first = reg.add(candidate("Ana", "001", "9A", StudentStatus::Pending));
        reg.add(candidate("Ani", "001", "9C", StudentStatus::Failed));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.find("001").map(|s| s.id.as_str()), Some(first.id.as_str()));
    }

    #[test]
    fn update_and_remove_of_unknown_id_are_noops() {
        let mut reg = Registry::default();
        reg.add(candidate("Ana", "001", "9A", StudentStatus::Pending));
        let snapshot = reg.clone();
        assert_eq!(reg.update("missing", StudentPatch::default()), None);
        assert!(!reg.remove("missing"));
        assert_eq!(reg, snapshot);
    }

    #[test]
    fn score_patch_is_tri_state() {
        let keep: StudentPatch = serde_json::from_value(json!({ "status": "passed" })).unwrap();
        assert_eq!(keep.score, None);
        let clear: StudentPatch = serde_json::from_value(json!({ "score": null })).unwrap();
        assert_eq!(clear.score, Some(None));
        let set: StudentPatch = serde_json::from_value(json!({ "score": 88 })).unwrap();
        assert_eq!(set.score, Some(Some(88.0)));

        let mut reg = Registry::default();
        let s = reg.add(NewStudent {
            score: Some(70.0),
            ..candidate("Ana", "001", "9A", StudentStatus::Pending)
        });
        let kept = reg.update(&s.id, keep).unwrap();
        assert_eq!(kept.score, Some(70.0));
        assert_eq!(kept.status, StudentStatus::Passed);
        let cleared = reg.update(&s.id, clear).unwrap();
        assert_eq!(cleared.score, None);
    }

    #[test]
    fn student_json_matches_persisted_shape() {
        let s = Student {
            id: "1717171717171".to_string(),
            name: "Ana".to_string(),
            nisn: "001".to_string(),
            class: "9A".to_string(),
            status: StudentStatus::Failed,
            score: None,
        };
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(
            v,
            json!({ "id": "1717171717171", "name": "Ana", "nisn": "001", "class": "9A", "status": "failed" })
        );
    }

    #[test]
    fn loosely_typed_records_decode() {
        let s: Student = serde_json::from_value(json!({
            "id": 17171717,
            "name": "Ana",
            "nisn": 12345,
            "class": 9,
            "status": "LULUS",
            "score": "88"
        }))
        .unwrap();
        assert_eq!(s.id, "17171717");
        assert_eq!(s.nisn, "12345");
        assert_eq!(s.class, "9");
        assert_eq!(s.status, StudentStatus::Pending);
        assert_eq!(s.score, Some(88.0));

        let s: Student = serde_json::from_value(json!({ "id": "x", "nisn": 7.0, "score": "abc" })).unwrap();
        assert_eq!(s.nisn, "7");
        assert_eq!(s.name, "");
        assert_eq!(s.status, StudentStatus::Pending);
        assert_eq!(s.score, None);
    }

    #[test]
    fn records_without_usable_id_are_rejected() {
        assert!(serde_json::from_value::<Student>(json!({ "name": "Ana" })).is_err());
        assert!(serde_json::from_value::<Student>(json!({ "id": null })).is_err());
        assert!(serde_json::from_value::<Student>(json!({ "id": { "x": 1 } })).is_err());
    }

    #[test]
    fn counts_and_percentages() {
        let mut reg = Registry::default();
        reg.add(candidate("A", "1", "9A", StudentStatus::Passed));
        reg.add(candidate("B", "2", "9A", StudentStatus::Passed));
        reg.add(candidate("C", "3", "9B", StudentStatus::Failed));
        let counts = count_by_status(reg.students());
        assert_eq!(
            counts,
            StatusCounts { total: 3, passed: 2, failed: 1, pending: 0 }
        );
        assert_eq!(counts.percent_of_total(counts.passed), 67);
        assert_eq!(count_by_status(&[]).percent_of_total(0), 0);
    }

    #[test]
    fn filter_by_status_and_term() {
        let mut reg = Registry::default();
        reg.add(candidate("Ana Putri", "0051", "9A", StudentStatus::Passed));
        reg.add(candidate("Budi", "0052", "9B", StudentStatus::Failed));
        reg.add(candidate("Citra", "0099", "9a", StudentStatus::Passed));

        let passed = filter_students(reg.students(), StatusFilter::Only(StudentStatus::Passed), "");
        assert_eq!(passed.len(), 2);

        let by_class = filter_students(reg.students(), StatusFilter::All, "9A");
        assert_eq!(by_class.len(), 2);

        let by_nisn = filter_students(reg.students(), StatusFilter::All, "005");
        let names: Vec<_> = by_nisn.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Ana Putri", "Budi"]);
    }

    #[test]
    fn sort_by_class_then_name() {
        let mut reg = Registry::default();
        reg.add(candidate("Zaki", "3", "9B", StudentStatus::Pending));
        reg.add(candidate("Budi", "2", "9A", StudentStatus::Pending));
        reg.add(candidate("Ana", "1", "9B", StudentStatus::Pending));
        let mut view: Vec<&Student> = reg.students().iter().collect();
        sort_students(&mut view, SortKey::Class);
        let names: Vec<_> = view.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Budi", "Ana", "Zaki"]);
        assert_eq!(recent(reg.students(), 2).len(), 2);
        assert_eq!(recent(reg.students(), 10).len(), 3);
    }
}

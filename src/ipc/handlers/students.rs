use serde_json::json;
use std::path::PathBuf;
use tracing::info;

use crate::error::codes;
use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{data, data_mut, param_path, param_str, parse_params, require_admin, required_str};
use crate::ipc::types::{AppState, Request};
use crate::registry::{filter_students, sort_students, NewStudent, SortKey, StatusFilter, Student, StudentPatch};
use crate::spreadsheet::{self, DEFAULT_EXPORT_FILE_NAME};

fn handle_list(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    let filter = match param_str(req, "status") {
        None => StatusFilter::All,
        Some(raw) => StatusFilter::parse(raw).ok_or_else(|| {
            HandlerErr::new(codes::BAD_PARAMS, format!("unknown status filter: {}", raw))
        })?,
    };
    let sort = match param_str(req, "sortBy") {
        None => SortKey::Insertion,
        Some(raw) => SortKey::parse(raw).ok_or_else(|| {
            HandlerErr::new(codes::BAD_PARAMS, format!("unknown sort key: {}", raw))
        })?,
    };
    let term = param_str(req, "q").unwrap_or_default();

    let all = data(state)?.students();
    let mut rows = filter_students(all, filter, term);
    sort_students(&mut rows, sort);
    Ok(ok(
        &req.id,
        json!({ "students": rows, "total": all.len() }),
    ))
}

fn handle_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    let candidate: NewStudent = parse_params(req, None)?;
    let student = data_mut(state)?.add_student(candidate)?;
    info!(student_id = %student.id, "student created");
    Ok(ok(&req.id, json!({ "student": student })))
}

fn handle_update(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    let student_id = required_str(req, "studentId")?;
    let patch: StudentPatch = parse_params(req, Some("patch"))?;
    match data_mut(state)?.update_student(student_id, patch)? {
        Some(student) => Ok(ok(&req.id, json!({ "student": student }))),
        None => Err(HandlerErr::new(codes::NOT_FOUND, "student not found")
            .with_details(json!({ "studentId": student_id }))),
    }
}

fn handle_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    let student_id = required_str(req, "studentId")?;
    if !data_mut(state)?.delete_student(student_id)? {
        return Err(HandlerErr::new(codes::NOT_FOUND, "student not found")
            .with_details(json!({ "studentId": student_id })));
    }
    info!(student_id, "student deleted");
    Ok(ok(&req.id, json!({ "removed": true })))
}

fn handle_replace_all(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    let students: Vec<Student> = parse_params(req, Some("students"))?;
    let count = students.len();
    data_mut(state)?.replace_all_students(students)?;
    info!(count, "student collection replaced");
    Ok(ok(&req.id, json!({ "count": count })))
}

fn handle_import_xlsx(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    let in_path = PathBuf::from(required_str(req, "inPath")?);
    let students = spreadsheet::read_workbook(&in_path)
        .map_err(|e| HandlerErr::from(e).with_details(json!({ "path": in_path.to_string_lossy() })))?;
    let count = students.len();
    data_mut(state)?.replace_all_students(students)?;
    Ok(ok(
        &req.id,
        json!({ "imported": count, "path": in_path.to_string_lossy() }),
    ))
}

fn handle_export_xlsx(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    let out_path = param_path(req, "outPath").unwrap_or_else(|| {
        param_path(req, "outDir")
            .unwrap_or_else(|| state.config.export_dir.clone())
            .join(DEFAULT_EXPORT_FILE_NAME)
    });
    let rows = spreadsheet::write_workbook(&out_path, data(state)?.students())
        .map_err(|e| HandlerErr::from(e).with_details(json!({ "path": out_path.to_string_lossy() })))?;
    Ok(ok(
        &req.id,
        json!({ "path": out_path.to_string_lossy(), "rows": rows }),
    ))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "students.list" => handle_list(state, req),
        "students.create" => handle_create(state, req),
        "students.update" => handle_update(state, req),
        "students.delete" => handle_delete(state, req),
        "students.replaceAll" => handle_replace_all(state, req),
        "students.importXlsx" => handle_import_xlsx(state, req),
        "students.exportXlsx" => handle_export_xlsx(state, req),
        _ => return None,
    };
    Some(result.unwrap_or_else(|e| e.response(&req.id)))
}

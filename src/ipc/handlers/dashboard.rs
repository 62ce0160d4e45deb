use serde_json::json;

use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{data, require_admin};
use crate::ipc::types::{AppState, Request};
use crate::registry::{count_by_status, recent};

const RECENT_LIMIT: usize = 5;

fn handle_stats(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    let data = data(state)?;
    let students = data.students();
    let counts = count_by_status(students);
    let settings = data.settings();
    Ok(ok(
        &req.id,
        json!({
            "counts": counts,
            "percentages": {
                "passed": counts.percent_of_total(counts.passed),
                "failed": counts.percent_of_total(counts.failed),
                "pending": counts.percent_of_total(counts.pending),
            },
            "settings": {
                "schoolName": settings.school_name,
                "schoolYear": settings.school_year,
                "announcementDate": settings.announcement_date,
                "showResults": settings.show_results,
            },
            "recent": recent(students, RECENT_LIMIT),
        }),
    ))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "dashboard.stats" => handle_stats(state, req),
        _ => return None,
    };
    Some(result.unwrap_or_else(|e| e.response(&req.id)))
}

//! Visitor-facing methods: result lookup, school info and the countdown.

use chrono::Utc;
use serde_json::json;
use tracing::debug;

use crate::countdown::{countdown, Countdown, CountdownTicker, TICK_PERIOD};
use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::data;
use crate::ipc::types::{AppState, Request};
use crate::search::{lookup, SearchOutcome};

fn countdown_json(c: Countdown) -> serde_json::Value {
    let t = c.time_left();
    json!({
        "expired": c.is_expired(),
        "days": t.days,
        "hours": t.hours,
        "minutes": t.minutes,
        "seconds": t.seconds,
    })
}

fn handle_search(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let data = data(state)?;
    let query = req
        .params
        .get("nisn")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    let result = match lookup(data, query) {
        SearchOutcome::EmptyQuery => json!({ "found": false, "emptyQuery": true }),
        SearchOutcome::NotFound => json!({ "found": false }),
        SearchOutcome::Found(student) => json!({ "found": true, "student": student }),
    };
    Ok(ok(&req.id, result))
}

fn handle_info(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let s = data(state)?.settings();
    Ok(ok(
        &req.id,
        json!({
            "schoolName": s.school_name,
            "schoolYear": s.school_year,
            "logoUrl": s.logo_url,
            "additionalInfo": s.additional_info,
            "announcementDate": s.announcement_date,
            "showResults": s.show_results,
        }),
    ))
}

fn handle_countdown_get(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let target = data(state)?.settings().announcement_at();
    Ok(ok(&req.id, countdown_json(countdown(target, Utc::now()))))
}

/// Restarts the ticker against the current announcement date.
fn handle_countdown_watch(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let target = data(state)?.settings().announcement_at();
    let restarted = state.stop_ticker();
    state.ticker = Some(CountdownTicker::start(target, TICK_PERIOD, |c| {
        let t = c.time_left();
        debug!(
            expired = c.is_expired(),
            days = t.days,
            hours = t.hours,
            minutes = t.minutes,
            seconds = t.seconds,
            "countdown tick"
        );
    }));
    Ok(ok(
        &req.id,
        json!({
            "watching": true,
            "restarted": restarted,
            "countdown": countdown_json(countdown(target, Utc::now())),
        }),
    ))
}

fn handle_countdown_stop(state: &mut AppState, req: &Request) -> serde_json::Value {
    let stopped = state.stop_ticker();
    ok(&req.id, json!({ "watching": false, "stopped": stopped }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "public.search" => handle_search(state, req),
        "public.info" => handle_info(state, req),
        "countdown.get" => handle_countdown_get(state, req),
        "countdown.watch" => handle_countdown_watch(state, req),
        "countdown.stop" => Ok(handle_countdown_stop(state, req)),
        _ => return None,
    };
    Some(result.unwrap_or_else(|e| e.response(&req.id)))
}

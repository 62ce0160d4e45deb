use serde_json::json;
use tracing::info;

use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{data, data_mut, parse_params, require_admin};
use crate::ipc::types::{AppState, Request};
use crate::settings::SettingsPatch;

fn handle_get(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let settings = data(state)?.settings();
    Ok(ok(&req.id, json!({ "settings": settings })))
}

/// Blank text fields in the patch fall back to their defaults.
fn handle_update(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    let patch: SettingsPatch = parse_params(req, Some("patch"))?;
    let settings = data_mut(state)?.update_settings(patch)?.clone();
    info!(show_results = settings.show_results, "settings updated");
    Ok(ok(&req.id, json!({ "settings": settings })))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "settings.get" => handle_get(state, req),
        "settings.update" => handle_update(state, req),
        _ => return None,
    };
    Some(result.unwrap_or_else(|e| e.response(&req.id)))
}

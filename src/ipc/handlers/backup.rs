use chrono::Local;
use serde_json::json;
use tracing::info;

use crate::backup;
use crate::error::codes;
use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{data, data_mut, param_path, param_str, require_admin};
use crate::ipc::types::{AppState, Request};

/// Without `outDir` the document is only returned inline.
fn handle_export(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    let text = data(state)?.export_backup()?;
    let Some(out_dir) = param_path(req, "outDir") else {
        return Ok(ok(&req.id, json!({ "text": text })));
    };
    let path = backup::write_backup_file(&out_dir, &text, Local::now().date_naive())
        .map_err(|e| HandlerErr::from(e).with_details(json!({ "outDir": out_dir.to_string_lossy() })))?;
    info!(path = %path.display(), "backup written");
    Ok(ok(
        &req.id,
        json!({ "path": path.to_string_lossy(), "bytes": text.len() }),
    ))
}

fn handle_import(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    let text = match (param_str(req, "text"), param_path(req, "inPath")) {
        (Some(text), _) => text.to_string(),
        (None, Some(path)) => backup::read_backup_file(&path)
            .map_err(|e| HandlerErr::from(e).with_details(json!({ "path": path.to_string_lossy() })))?,
        (None, None) => {
            return Err(HandlerErr::new(codes::BAD_PARAMS, "missing params.text or params.inPath"))
        }
    };
    let summary = data_mut(state)?.import_backup(&text)?;
    Ok(ok(&req.id, json!({ "summary": summary })))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "backup.export" => handle_export(state, req),
        "backup.import" => handle_import(state, req),
        _ => return None,
    };
    Some(result.unwrap_or_else(|e| e.response(&req.id)))
}

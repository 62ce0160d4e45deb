use crate::error::codes;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use tracing::{info, warn};

fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(passphrase) = req.params.get("passphrase").and_then(|v| v.as_str()) else {
        return err(&req.id, codes::BAD_PARAMS, "missing params.passphrase", None);
    };
    if !state.gate.verify(passphrase) {
        warn!("admin login rejected");
        state.admin = false;
        return err(&req.id, codes::UNAUTHORIZED, "wrong passphrase", None);
    }
    state.admin = true;
    info!("admin logged in");
    ok(&req.id, json!({ "admin": true }))
}

fn handle_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    if state.admin {
        info!("admin logged out");
    }
    state.admin = false;
    ok(&req.id, json!({ "admin": false }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "session.login" => Some(handle_login(state, req)),
        "session.logout" => Some(handle_logout(state, req)),
        _ => None,
    }
}

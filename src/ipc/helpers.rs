use serde::de::DeserializeOwned;
use std::path::PathBuf;

use crate::data_store::ResultsStore;
use crate::error::codes;
use crate::ipc::error::HandlerErr;
use crate::ipc::types::{AppState, Request};

pub fn require_admin(state: &AppState) -> Result<(), HandlerErr> {
    if state.admin {
        Ok(())
    } else {
        Err(HandlerErr::new(codes::UNAUTHORIZED, "admin login required"))
    }
}

pub fn data(state: &AppState) -> Result<&dyn ResultsStore, HandlerErr> {
    match state.data.as_ref() {
        Some(d) => Ok(&**d),
        None => Err(HandlerErr::new(codes::NO_WORKSPACE, "open a workspace first")),
    }
}

pub fn data_mut(state: &mut AppState) -> Result<&mut Box<dyn ResultsStore>, HandlerErr> {
    state
        .data
        .as_mut()
        .ok_or_else(|| HandlerErr::new(codes::NO_WORKSPACE, "open a workspace first"))
}

/// Trimmed, non-empty string parameter.
pub fn param_str<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

pub fn required_str<'a>(req: &'a Request, key: &str) -> Result<&'a str, HandlerErr> {
    param_str(req, key)
        .ok_or_else(|| HandlerErr::new(codes::BAD_PARAMS, format!("missing params.{}", key)))
}

pub fn param_path(req: &Request, key: &str) -> Option<PathBuf> {
    param_str(req, key).map(PathBuf::from)
}

/// Deserialize `params.<key>`, or the whole params object when `key` is `None`.
pub fn parse_params<T: DeserializeOwned>(req: &Request, key: Option<&str>) -> Result<T, HandlerErr> {
    let raw = match key {
        Some(k) => req
            .params
            .get(k)
            .cloned()
            .ok_or_else(|| HandlerErr::new(codes::BAD_PARAMS, format!("missing params.{}", k)))?,
        None => req.params.clone(),
    };
    serde_json::from_value(raw).map_err(|e| {
        HandlerErr::new(
            codes::BAD_PARAMS,
            match key {
                Some(k) => format!("invalid params.{}: {}", k, e),
                None => format!("invalid params: {}", e),
            },
        )
    })
}

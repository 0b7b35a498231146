use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::required_array;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_results_load(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let results = required_array(&req.params, "results")?.clone();
    let count = results.len();
    let ranked = state.results.load(results);
    tracing::info!(count, ranked, "reference results loaded");
    Ok(json!({ "count": count, "ranked": ranked }))
}

fn handle_results_get(state: &mut AppState, _req: &Request) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "results": state.results.get() }))
}

fn handle_results_invalidate(state: &mut AppState, _req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let invalidated = state.results.invalidate();
    if invalidated {
        tracing::info!("reference results invalidated");
    }
    Ok(json!({ "invalidated": invalidated }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "results.load" => handle_results_load(state, req),
        "results.get" => handle_results_get(state, req),
        "results.invalidate" => handle_results_invalidate(state, req),
        _ => return None,
    };
    Some(match res {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}

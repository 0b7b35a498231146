use crate::extract::extract_sort_value;
use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{opt_str, required_array, required_sort_key, sort_state_param, table_mut};
use crate::ipc::types::{AppState, Request};
use crate::model::Registration;
use crate::sorting::{pending_order, registration_order, SortState};
use serde_json::json;

fn decode(items: &[serde_json::Value]) -> Vec<Registration> {
    items.iter().map(Registration::from_json).collect()
}

fn requested_sort(state: &mut AppState, params: &serde_json::Value) -> Result<SortState, HandlerErr> {
    if opt_str(params, "tableId")?.is_some() {
        return Ok(table_mut(state, params)?.sort);
    }
    sort_state_param(state, params)
}

fn handle_registrations_sort(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let sort = requested_sort(state, &req.params)?;
    let raw = required_array(&req.params, "registrations")?;
    let regs = decode(raw);
    let order = registration_order(&regs, &sort, state.results.context());

    tracing::debug!(count = regs.len(), key = %sort.key, dir = %sort.direction, "registrations sorted");
    let out: Vec<&serde_json::Value> = order.into_iter().map(|i| &raw[i]).collect();
    Ok(json!({ "registrations": out, "sort": sort }))
}

fn handle_registrations_sort_values(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let key = required_sort_key(&req.params, "key")?;
    let regs = decode(required_array(&req.params, "registrations")?);
    let ctx = state.results.context();
    let values: Vec<serde_json::Value> = regs
        .iter()
        .map(|r| extract_sort_value(r, key, ctx).to_json())
        .collect();
    Ok(json!({ "key": key, "values": values }))
}

fn handle_registrations_editable(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let regs = decode(required_array(&req.params, "registrations")?);
    let allowed = &state.config.editable_statuses;
    let editable: Vec<bool> = regs.iter().map(|r| r.is_editable(allowed.as_slice())).collect();
    Ok(json!({ "editable": editable }))
}

fn handle_registrations_pending(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let raw = required_array(&req.params, "registrations")?;
    let regs = decode(raw);
    let order = pending_order(&regs, state.results.context());
    let out: Vec<&serde_json::Value> = order.into_iter().map(|i| &raw[i]).collect();
    let count = out.len();
    Ok(json!({ "registrations": out, "count": count, "total": raw.len() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "registrations.sort" => handle_registrations_sort(state, req),
        "registrations.sortValues" => handle_registrations_sort_values(state, req),
        "registrations.editable" => handle_registrations_editable(state, req),
        "registrations.pending" => handle_registrations_pending(state, req),
        _ => return None,
    };
    Some(match res {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}

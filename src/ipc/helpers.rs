use serde_json::json;

use crate::extract::SortKey;
use crate::ipc::error::HandlerErr;
use crate::ipc::types::{AppState, TableSession};
use crate::sorting::{SortDirection, SortState};

/// A string param; absent, null and blank are all `None`.
pub fn opt_str<'a>(params: &'a serde_json::Value, name: &str) -> Result<Option<&'a str>, HandlerErr> {
    match params.get(name) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(HandlerErr::bad_params(format!("params.{name} must be a string"))
            .with_details(json!({ name: other }))),
    }
}

pub fn required_str<'a>(params: &'a serde_json::Value, name: &str) -> Result<&'a str, HandlerErr> {
    opt_str(params, name)?.ok_or_else(|| HandlerErr::bad_params(format!("missing params.{name}")))
}

pub fn required_array<'a>(
    params: &'a serde_json::Value,
    name: &str,
) -> Result<&'a Vec<serde_json::Value>, HandlerErr> {
    match params.get(name) {
        Some(serde_json::Value::Array(items)) => Ok(items),
        None | Some(serde_json::Value::Null) => Err(HandlerErr::bad_params(format!("missing params.{name}"))),
        Some(_) => Err(HandlerErr::bad_params(format!("params.{name} must be an array"))),
    }
}

pub fn opt_sort_key(params: &serde_json::Value, name: &str) -> Result<Option<SortKey>, HandlerErr> {
    Ok(match opt_str(params, name)? {
        Some(s) => Some(s.parse()?),
        None => None,
    })
}

pub fn required_sort_key(params: &serde_json::Value, name: &str) -> Result<SortKey, HandlerErr> {
    Ok(required_str(params, name)?.parse()?)
}

/// `sortKey`/`sortDir` params. Both absent gives the configured default; a
/// key without a direction starts ascending.
pub fn sort_state_param(state: &AppState, params: &serde_json::Value) -> Result<SortState, HandlerErr> {
    let key = opt_sort_key(params, "sortKey")?;
    let dir: Option<SortDirection> = match opt_str(params, "sortDir")? {
        Some(s) => Some(s.parse()?),
        None => None,
    };
    Ok(match (key, dir) {
        (None, None) => state.config.default_sort,
        (Some(key), None) => SortState::new(key),
        (key, Some(direction)) => SortState {
            key: key.unwrap_or(state.config.default_sort.key),
            direction,
        },
    })
}

pub fn table_mut<'a>(
    state: &'a mut AppState,
    params: &serde_json::Value,
) -> Result<&'a mut TableSession, HandlerErr> {
    let table_id = required_str(params, "tableId")?;
    state.tables.get_mut(table_id).ok_or_else(|| HandlerErr {
        code: "not_found",
        message: "table not found".to_string(),
        details: Some(json!({ "tableId": table_id })),
    })
}

use crate::extract::SortKey;
use crate::headers::{HeaderBinding, HeaderError};
use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{opt_sort_key, required_str, required_sort_key, sort_state_param, table_mut};
use crate::ipc::types::{AppState, Request, TableSession};
use serde_json::json;
use uuid::Uuid;

fn parse_headers(params: &serde_json::Value) -> Result<HeaderBinding, HandlerErr> {
    let Some(raw) = params.get("headers").filter(|v| !v.is_null()) else {
        return Ok(HeaderBinding::default());
    };
    let Some(items) = raw.as_array() else {
        return Err(HandlerErr::bad_params("params.headers must be an array of sort keys"));
    };
    let mut keys: Vec<SortKey> = Vec::with_capacity(items.len());
    for item in items {
        let Some(s) = item.as_str() else {
            return Err(HandlerErr::bad_params("params.headers must be an array of sort keys")
                .with_details(json!({ "header": item })));
        };
        keys.push(s.parse()?);
    }
    if keys.is_empty() {
        return Err(HandlerErr::bad_params("params.headers must not be empty"));
    }
    Ok(HeaderBinding::new(keys))
}

fn table_view(table_id: &str, session: &TableSession) -> serde_json::Value {
    json!({
        "tableId": table_id,
        "sort": session.sort,
        "indicators": session.headers.indicators(&session.sort),
    })
}

fn handle_tables_open(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let headers = parse_headers(&req.params)?;
    let explicit_key = opt_sort_key(&req.params, "sortKey")?.is_some();
    let mut sort = sort_state_param(state, &req.params)?;
    if !headers.declares(sort.key) {
        if explicit_key {
            return Err(HandlerErr::bad_params(HeaderError::UnknownHeader(sort.key).to_string())
                .with_details(json!({ "key": sort.key, "headers": headers.headers() })));
        }
        // The configured default is not a column here; start on the first one.
        if let Some(&first) = headers.headers().first() {
            sort.key = first;
        }
    }
    let session = TableSession { sort, headers };
    let table_id = Uuid::new_v4().to_string();
    let view = table_view(&table_id, &session);
    if let Some((evicted, _)) = state.tables.push(table_id.clone(), session) {
        tracing::info!(table = %evicted, "least recently used table dropped");
    }
    tracing::info!(table = %table_id, key = %sort.key, dir = %sort.direction, "table opened");
    Ok(view)
}

fn handle_tables_toggle(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let key = required_sort_key(&req.params, "key")?;
    let table_id = required_str(&req.params, "tableId")?.to_string();
    let session = table_mut(state, &req.params)?;
    session
        .headers
        .activate(&mut session.sort, key, |s| {
            tracing::debug!(table = %table_id, key = %s.key, dir = %s.direction, "sort changed");
        })
        .map_err(|e| match e {
            HeaderError::UnknownHeader(k) => HandlerErr::bad_params(e.to_string())
                .with_details(json!({ "key": k, "headers": session.headers.headers() })),
        })?;
    Ok(table_view(&table_id, session))
}

fn handle_tables_state(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let table_id = required_str(&req.params, "tableId")?.to_string();
    let session = table_mut(state, &req.params)?;
    Ok(table_view(&table_id, session))
}

fn handle_tables_close(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let table_id = required_str(&req.params, "tableId")?;
    let closed = state.tables.pop(table_id).is_some();
    if closed {
        tracing::info!(table = %table_id, "table closed");
    }
    Ok(json!({ "closed": closed }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "tables.open" => handle_tables_open(state, req),
        "tables.toggle" => handle_tables_toggle(state, req),
        "tables.state" => handle_tables_state(state, req),
        "tables.close" => handle_tables_close(state, req),
        _ => return None,
    };
    Some(match res {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}

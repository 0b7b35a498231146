use crate::courses::{filter_and_sort, CourseSortMode};
use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{opt_str, required_array};
use crate::ipc::types::{AppState, Request};
use crate::model::Course;
use serde_json::json;

fn handle_courses_filter_sort(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let raw = required_array(&req.params, "courses")?;
    let query = opt_str(&req.params, "query")?.unwrap_or("");
    let mode: CourseSortMode = match opt_str(&req.params, "mode")? {
        Some(m) => m.parse()?,
        None => state.config.course_sort_default,
    };

    let courses: Vec<Course> = raw.iter().map(Course::from_json).collect();
    let order = filter_and_sort(&courses, query, mode);
    let visible: Vec<&serde_json::Value> = order.iter().map(|&idx| &raw[idx]).collect();

    Ok(json!({
        "courses": visible,
        "total": raw.len(),
        "visible": visible.len(),
        "mode": mode.as_str(),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "courses.filterSort" => handle_courses_filter_sort(state, req),
        _ => return None,
    };
    Some(match res {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}

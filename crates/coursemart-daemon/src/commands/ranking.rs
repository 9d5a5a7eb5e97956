//! Ranking command handlers.
//!
//! All rankings accept optional `page` (from 1) and `limit` parameters.

use std::sync::Arc;

use coursemart_revenue::ranking::{self, Pagination};
use serde::Serialize;
use serde_json::Value;

use super::{optional_str, optional_u32};
use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

fn pagination(state: &DaemonState, params: &Value) -> std::result::Result<Pagination, RpcError> {
    let pagination = Pagination::new(
        optional_u32(params, "page")?,
        optional_u32(params, "limit")?,
        state.config.revenue.page_limits(),
    )?;
    Ok(pagination)
}

fn to_json<T: Serialize>(page: T) -> Result {
    serde_json::to_value(page).map_err(|e| RpcError::internal_error(&format!("serialize page: {e}")))
}

/// Courses by completed enrollments.
pub async fn get_hot_courses(state: &Arc<DaemonState>, params: &Value) -> Result {
    let pagination = pagination(state, params)?;
    let db = state.db.lock().await;
    to_json(ranking::hot_courses(&db, pagination)?)
}

/// Students by spend or enrollments (`sort_by`: `spent` | `enrollments`).
pub async fn get_top_students(state: &Arc<DaemonState>, params: &Value) -> Result {
    let pagination = pagination(state, params)?;
    let sort = ranking::parse_student_sort(optional_str(params, "sort_by")?)?;
    let db = state.db.lock().await;
    to_json(ranking::top_students(&db, pagination, sort)?)
}

/// Instructors by rating, students or courses.
pub async fn get_top_instructors(state: &Arc<DaemonState>, params: &Value) -> Result {
    let pagination = pagination(state, params)?;
    let sort = ranking::parse_instructor_sort(optional_str(params, "sort_by")?)?;
    let db = state.db.lock().await;
    to_json(ranking::top_instructors(&db, pagination, sort)?)
}

/// Courses by lifetime gross revenue.
pub async fn get_top_revenue_courses(state: &Arc<DaemonState>, params: &Value) -> Result {
    let pagination = pagination(state, params)?;
    let db = state.db.lock().await;
    to_json(ranking::top_revenue_courses(&db, pagination)?)
}

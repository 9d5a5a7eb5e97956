//! Attribution settings command handlers.

use std::sync::Arc;

use coursemart_revenue::attribution::{self, AttributionPercentage};
use serde_json::Value;

use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

/// Current instructor revenue percentage, clamped as reports see it.
pub async fn get_instructor_percentage(state: &Arc<DaemonState>) -> Result {
    let db = state.db.lock().await;
    let pct = AttributionPercentage::load(&db)?;
    Ok(serde_json::json!({
        "percentage": pct.instructor(),
        "platformPercentage": pct.platform(),
    }))
}

/// Change the instructor revenue percentage (administrator edit).
///
/// Accepts a JSON number or numeric string in `[0, 100]`. Reports already
/// built keep the percentage they were computed with.
pub async fn set_instructor_percentage(state: &Arc<DaemonState>, params: &Value) -> Result {
    let raw = match params.get("percentage") {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => return Err(RpcError::invalid_params("percentage required")),
    };
    let value = attribution::parse_percentage(&raw)?;

    let db = state.db.lock().await;
    let pct = attribution::store_percentage(&db, value)?;
    Ok(serde_json::json!({
        "percentage": pct.instructor(),
        "platformPercentage": pct.platform(),
    }))
}

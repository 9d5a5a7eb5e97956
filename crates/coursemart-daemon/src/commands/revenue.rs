//! Revenue report command handlers.

use std::sync::Arc;

use coursemart_revenue::report::{self, ReportRequest};
use serde_json::Value;

use super::optional_str;
use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

/// Build a revenue report.
///
/// Platform-wide unless `creator_id` is given, in which case the report
/// covers that creator's courses and `totalRevenue` is the creator's share.
pub async fn get_revenue_report(state: &Arc<DaemonState>, params: &Value) -> Result {
    let granularity = params
        .get("granularity")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("granularity required"))?;

    let request = ReportRequest {
        granularity: Some(granularity.to_string()),
        creator_id: optional_str(params, "creator_id")?.map(str::to_string),
        start_date: optional_str(params, "start_date")?.map(str::to_string),
        end_date: optional_str(params, "end_date")?.map(str::to_string),
    };

    let mut db = state.db.lock().await;
    let report = report::build_report(&mut db, &request)?;
    drop(db);

    serde_json::to_value(report)
        .map_err(|e| RpcError::internal_error(&format!("serialize report: {e}")))
}

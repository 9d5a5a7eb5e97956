//! IPC command handlers.
//!
//! Each submodule implements the commands for one IPC category.

pub mod ranking;
pub mod revenue;
pub mod settings;

use serde_json::Value;

use crate::rpc::RpcError;

/// Optional string parameter. Present but not a string is an error.
fn optional_str<'a>(params: &'a Value, key: &str) -> Result<Option<&'a str>, RpcError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(RpcError::invalid_params(&format!("{key} must be a string"))),
    }
}

/// Optional positive integer parameter that fits in `u32`.
fn optional_u32(params: &Value, key: &str) -> Result<Option<u32>, RpcError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| RpcError::invalid_params(&format!("{key} must be a positive integer"))),
    }
}

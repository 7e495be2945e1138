//! Helpers for pulling typed values out of tool-call arguments.

use serde_json::{Map, Value as JsonValue};

use crate::error::{McpError, Result};

/// Helper to get a required string argument from JSON arguments.
pub fn get_string_arg(args: &Map<String, JsonValue>, name: &str) -> Result<String> {
    args.get(name)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .ok_or_else(|| McpError::MissingArg(name.to_string()))
}

/// Helper to get an optional string argument from JSON arguments.
pub fn get_optional_string(args: &Map<String, JsonValue>, name: &str) -> Option<String> {
    args.get(name).and_then(|v| v.as_str()).map(|s| s.to_string())
}

/// Helper to get an optional u64 argument from JSON arguments.
///
/// Accepts integral floats (`3.0`) since JSON Schema `number` allows them.
pub fn get_optional_u64(args: &Map<String, JsonValue>, name: &str) -> Option<u64> {
    args.get(name).and_then(|v| {
        v.as_u64()
            .or_else(|| v.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64))
    })
}

/// Helper to get a required object argument.
pub fn get_object_arg(args: &Map<String, JsonValue>, name: &str) -> Result<Map<String, JsonValue>> {
    match args.get(name) {
        Some(JsonValue::Object(obj)) => Ok(obj.clone()),
        Some(JsonValue::Null) | None => Err(McpError::MissingArg(name.to_string())),
        Some(_) => Err(McpError::InvalidArg {
            name: name.to_string(),
            reason: "Expected an object".to_string(),
        }),
    }
}

/// Helper to get an optional object argument.
pub fn get_optional_object(
    args: &Map<String, JsonValue>,
    name: &str,
) -> Result<Option<Map<String, JsonValue>>> {
    match args.get(name) {
        Some(JsonValue::Object(obj)) => Ok(Some(obj.clone())),
        Some(JsonValue::Null) | None => Ok(None),
        Some(_) => Err(McpError::InvalidArg {
            name: name.to_string(),
            reason: "Expected an object".to_string(),
        }),
    }
}

/// Helper to get an optional array argument.
pub fn get_optional_array(args: &Map<String, JsonValue>, name: &str) -> Result<Option<Vec<JsonValue>>> {
    match args.get(name) {
        Some(JsonValue::Array(arr)) => Ok(Some(arr.clone())),
        Some(JsonValue::Null) | None => Ok(None),
        Some(_) => Err(McpError::InvalidArg {
            name: name.to_string(),
            reason: "Expected an array".to_string(),
        }),
    }
}

/// Page-size and offset arguments, with `limit` clamped to `ceiling`.
pub fn get_window(
    args: &Map<String, JsonValue>,
    default_limit: u64,
    ceiling: u64,
) -> (u64, u64) {
    let limit = get_optional_u64(args, "limit")
        .filter(|l| *l > 0)
        .unwrap_or(default_limit)
        .min(ceiling);
    let skip = get_optional_u64(args, "skip").unwrap_or(0);
    (limit, skip)
}

//! Response envelope handling.
//!
//! Endpoints answer either with a bare JSON value or with
//! `{"status": "success" | "error", "data": ..., "message": ...}`.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::ApiError;

const ENVELOPE_STATUSES: [&str; 3] = ["success", "error", "fail"];

fn is_envelope(map: &Map<String, Value>) -> bool {
    // Doctors carry their own `status` ("activo"), so only known envelope
    // values count.
    map.contains_key("data")
        || map
            .get("status")
            .and_then(Value::as_str)
            .is_some_and(|s| ENVELOPE_STATUSES.contains(&s))
}

/// Unwrap an envelope, or pass a bare value through.
pub(crate) fn into_payload(body: Value) -> Result<Value, ApiError> {
    let Value::Object(mut map) = body else {
        return Ok(body);
    };
    if !is_envelope(&map) {
        return Ok(Value::Object(map));
    }

    if let Some(status) = map.get("status").and_then(Value::as_str) {
        if status != "success" {
            let message = message_from(&Value::Object(map.clone()))
                .unwrap_or_else(|| format!("status '{}'", status));
            return Err(ApiError::Rejected { message });
        }
    }
    Ok(map.remove("data").unwrap_or(Value::Null))
}

pub(crate) fn decode<T: DeserializeOwned>(path: &str, payload: Value) -> Result<T, ApiError> {
    serde_json::from_value(payload).map_err(|e| ApiError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Decode a collection. Anything but a JSON array is rejected so that a
/// malformed response never empties a cached collection.
pub(crate) fn decode_list<T: DeserializeOwned>(
    path: &str,
    payload: Value,
) -> Result<Vec<T>, ApiError> {
    if !payload.is_array() {
        return Err(ApiError::Decode {
            path: path.to_string(),
            message: "expected a list".to_string(),
        });
    }
    decode(path, payload)
}

/// Human-readable message from an error body.
///
/// Prefers `message`, then the first validation error under `errors`,
/// then the raw text.
pub(crate) fn error_message(text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => message_from(&value).unwrap_or_else(|| truncate(text)),
        Err(_) => truncate(text),
    }
}

fn message_from(value: &Value) -> Option<String> {
    if let Some(message) = value.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }
    value
        .get("errors")
        .and_then(Value::as_object)
        .and_then(|errors| {
            errors.values().find_map(|field| match field {
                Value::Array(items) => items.first().and_then(Value::as_str).map(String::from),
                Value::String(s) => Some(s.clone()),
                _ => None,
            })
        })
}

fn truncate(text: &str) -> String {
    const MAX: usize = 200;
    let text = text.trim();
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

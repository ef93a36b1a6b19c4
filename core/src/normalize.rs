//! Turns a failed request into a message the UI can show as-is.
//!
//! Priority, highest first: a plain-text body, the first message of the first
//! field in a validation `errors` map, a body-level `message`, a body-level
//! `title`, and finally the caller's default.

use serde_json::Value;

use crate::error::{ApiError, ResponseBody};

pub fn error_message(error: &ApiError, default: &str) -> String {
    let message = match error.body() {
        Some(ResponseBody::Text(text)) if !text.is_empty() => Some(text.clone()),
        Some(ResponseBody::Json(value)) => message_from_json(value),
        _ => None,
    };
    message.unwrap_or_else(|| default.to_string())
}

fn message_from_json(value: &Value) -> Option<String> {
    let body = value.as_object()?;
    if let Some(message) = body.get("errors").and_then(first_field_error) {
        return Some(message);
    }
    ["message", "title"].iter().find_map(|key| {
        body.get(*key)
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    })
}

// Only the first field is consulted; later fields never stand in for it.
fn first_field_error(errors: &Value) -> Option<String> {
    let (_, messages) = errors.as_object()?.iter().next()?;
    match messages {
        Value::Array(list) => list.first()?.as_str().map(str::to_string),
        Value::String(text) => Some(text.clone()),
        _ => None,
    }
}

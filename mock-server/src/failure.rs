//! Error responses shaped like the real backend's.
//!
//! Validation failures use the ASP.NET problem-details layout with a
//! field-keyed `errors` map; everything else carries a single `message`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};

#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    body: Value,
}

impl Failure {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_message(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::with_message(StatusCode::CONFLICT, message)
    }

    fn with_message(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "message": message.into() }),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Value {
        &self.body
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Collects field errors in the order they were found.
#[derive(Debug, Default)]
pub struct Validation {
    errors: Map<String, Value>,
}

impl Validation {
    /// The trimmed value, or an empty string after recording the error.
    pub fn required(&mut self, field: &str, value: &Option<String>) -> String {
        match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => v.to_string(),
            None => {
                self.reject(field, format!("The {field} field is required."));
                String::new()
            }
        }
    }

    pub fn reject(&mut self, field: &str, message: impl Into<String>) {
        let entry = self
            .errors
            .entry(field)
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(messages) = entry {
            messages.push(Value::String(message.into()));
        }
    }

    pub fn finish(self) -> Result<(), Failure> {
        if self.errors.is_empty() {
            return Ok(());
        }
        Err(Failure {
            status: StatusCode::BAD_REQUEST,
            body: json!({
                "type": "https://tools.ietf.org/html/rfc9110#section-15.5.1",
                "title": "One or more validation errors occurred.",
                "status": 400,
                "errors": self.errors,
            }),
        })
    }
}

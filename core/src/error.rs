//! Error types for the academic records client.
//!
//! # Design
//! Failures are decoded once at the HTTP boundary into `ApiError`: either the
//! request never completed, or the backend answered with a non-2xx status
//! whose body is parsed into a `ResponseBody`. Accessors never surface
//! `ApiError` on its own; they wrap it in `Error`, whose message is chosen by
//! `normalize::error_message` and which records any relationship changes the
//! backend had already accepted when the failure happened.

use serde_json::Value;

use crate::normalize::error_message;
use crate::reconcile::LinkChange;

/// Body of a failed response, decoded once.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    /// A plain-text body, or a JSON document that is a bare string.
    Text(String),
    Json(Value),
}

impl ResponseBody {
    pub fn decode(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return ResponseBody::Empty;
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::String(text)) => ResponseBody::Text(text),
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(raw.to_string()),
        }
    }
}

/// Raw failure at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request could not be sent or the response could not be read.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}")]
    Http { status: u16, body: ResponseBody },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The decoded response body, if the backend answered at all.
    pub fn body(&self) -> Option<&ResponseBody> {
        match self {
            ApiError::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// How much of a multi-call operation the backend accepted before it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    NotApplied,
    PartiallyApplied,
}

/// Failure returned by every accessor operation.
///
/// `Display` yields the normalized, UI-presentable message only.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    message: String,
    #[source]
    source: ApiError,
    applied: Vec<LinkChange>,
}

impl Error {
    /// Wrap `source`, picking the message with `default` as the fallback.
    pub fn new(source: ApiError, default: &str) -> Self {
        Self {
            message: error_message(&source, default),
            source,
            applied: Vec::new(),
        }
    }

    pub(crate) fn with_applied(mut self, applied: Vec<LinkChange>) -> Self {
        self.applied = applied;
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn api_error(&self) -> &ApiError {
        &self.source
    }

    /// Relationship changes that succeeded before the failing call. They are
    /// not rolled back.
    pub fn applied_changes(&self) -> &[LinkChange] {
        &self.applied
    }

    pub fn outcome(&self) -> Outcome {
        if self.applied.is_empty() {
            Outcome::NotApplied
        } else {
            Outcome::PartiallyApplied
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_empty_body() {
        assert_eq!(ResponseBody::decode(""), ResponseBody::Empty);
        assert_eq!(ResponseBody::decode("  \n"), ResponseBody::Empty);
    }

    #[test]
    fn decode_plain_text_body() {
        assert_eq!(
            ResponseBody::decode("Invalid URL"),
            ResponseBody::Text("Invalid URL".to_string())
        );
    }

    #[test]
    fn decode_json_string_body_as_text() {
        assert_eq!(
            ResponseBody::decode(r#""already enrolled""#),
            ResponseBody::Text("already enrolled".to_string())
        );
    }

    #[test]
    fn decode_json_object_body() {
        assert_eq!(
            ResponseBody::decode(r#"{"title":"Not Found"}"#),
            ResponseBody::Json(json!({"title": "Not Found"}))
        );
    }

    #[test]
    fn error_displays_normalized_message() {
        let err = Error::new(
            ApiError::Http {
                status: 409,
                body: ResponseBody::decode(r#"{"message":"duplicate student number"}"#),
            },
            "cannot create the student",
        );
        assert_eq!(err.to_string(), "duplicate student number");
        assert_eq!(err.api_error().status(), Some(409));
        assert_eq!(err.outcome(), Outcome::NotApplied);
    }

    #[test]
    fn error_with_applied_changes_is_partial() {
        let err = Error::new(ApiError::Transport("connection reset".into()), "cannot update the student")
            .with_applied(vec![LinkChange::Unlink(5)]);
        assert_eq!(err.message(), "cannot update the student");
        assert_eq!(err.applied_changes(), &[LinkChange::Unlink(5)]);
        assert_eq!(err.outcome(), Outcome::PartiallyApplied);
    }

    #[test]
    fn not_found_is_detected_from_status() {
        let err = ApiError::Http {
            status: 404,
            body: ResponseBody::Empty,
        };
        assert!(err.is_not_found());
        assert!(!ApiError::Transport("timeout".into()).is_not_found());
    }
}

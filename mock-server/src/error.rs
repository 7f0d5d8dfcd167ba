//! Failures rendered as `FAILED` envelopes.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error("You must be authenticated to perform this action.")]
    Unauthenticated,

    /// The caller may not act on someone else's record.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Form validation failed; `errors` maps field names to messages.
    #[error("{message}")]
    Invalid {
        message: String,
        errors: Map<String, Value>,
    },

    #[error("malformed form body: {0}")]
    Multipart(#[from] MultipartError),
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let status = match &self {
            MockError::Unauthenticated | MockError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            MockError::Forbidden(_) => StatusCode::FORBIDDEN,
            MockError::NotFound(_) => StatusCode::NOT_FOUND,
            MockError::Invalid { .. } | MockError::Multipart(_) => StatusCode::BAD_REQUEST,
        };
        let mut body = json!({"status": "FAILED", "message": self.to_string()});
        if let MockError::Invalid { errors, .. } = self {
            body["errors"] = Value::Object(errors);
        }
        (status, Json(body)).into_response()
    }
}

/// Collects per-field validation messages in the backend's error shape.
#[derive(Debug, Default)]
pub struct FieldErrors(Map<String, Value>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: &str) {
        let entry = self
            .0
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(list) = entry {
            list.push(json!({"message": message, "code": "invalid"}));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(())` when nothing was recorded, otherwise `MockError::Invalid`.
    pub fn into_result(self, message: &str) -> Result<(), MockError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(MockError::Invalid {
                message: message.to_string(),
                errors: self.0,
            })
        }
    }
}

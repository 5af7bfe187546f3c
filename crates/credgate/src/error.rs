//! Mapping from core errors to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use credgate_core::{Error, InputError};
use serde_json::json;
use tracing::{error, warn};

/// A request failure, rendered as `{"success": false, "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Response status.
    pub status: StatusCode,
    /// Client-facing message.
    pub message: String,
}

impl ApiError {
    /// Create an error with an explicit status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// The request carried no usable body.
    #[must_use]
    pub fn no_body() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "No JSON data provided")
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match &err {
            Error::MalformedInput(errors) => Self::new(StatusCode::BAD_REQUEST, input_message(errors)),
            Error::DuplicateField(_) => Self::new(StatusCode::CONFLICT, err.to_string()),
            Error::InvalidCredentials => Self::new(StatusCode::UNAUTHORIZED, "Invalid credentials"),
            Error::Connection(_) => {
                warn!(error = %err, "store unreachable");
                Self::new(StatusCode::SERVICE_UNAVAILABLE, "Database connection failed")
            }
            Error::Database(_)
            | Error::PasswordHash(_)
            | Error::Task(_)
            | Error::Config(_) => {
                error!(error = %err, "request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

/// Missing credentials collapse to one message; length errors are listed.
fn input_message(errors: &[InputError]) -> String {
    if errors.iter().any(|e| matches!(e, InputError::Missing(_))) {
        return "Username and password required".to_string();
    }
    errors
        .iter()
        .map(InputError::message)
        .collect::<Vec<_>>()
        .join("; ")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

//! Outward error responses for the gateway's HTTP handlers.
//!
//! Every failure leaves the gateway as `{"error": "<message>"}` with a
//! status picked by [`map_jira_error`]. Raw upstream bodies and transport
//! details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::errors::JiraError;

/// Upstream 400.
pub const MSG_INVALID_DATA: &str = "Invalid request data sent to JIRA.";
/// Upstream 401.
pub const MSG_AUTH_FAILED: &str = "Authentication failed with JIRA.";
/// Upstream 403.
pub const MSG_PERMISSION_DENIED: &str = "Permission denied by JIRA.";
/// Upstream 404.
pub const MSG_NOT_FOUND: &str = "JIRA resource not found.";
/// Any other upstream status.
pub const MSG_UPSTREAM_UNEXPECTED: &str =
    "An unexpected error occurred while communicating with JIRA.";
/// Failures that never produced an upstream status.
pub const MSG_INTERNAL: &str = "An internal server error occurred.";

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// User-safe message.
    pub error: String,
}

/// Handler error: an outward status plus a user-safe message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Outward HTTP status.
    pub status: StatusCode,
    /// Message placed in the `error` field.
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

    /// 400 with the given message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 405 for a known path hit with the wrong method.
    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    }

    /// 404 for an unknown path.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not found")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<JiraError> for ApiError {
    fn from(err: JiraError) -> Self {
        let (status, message) = map_jira_error(&err);
        Self::new(status, message)
    }
}

/// Map a client error to an outward status and sanitized message.
///
/// - `Validation` -> 400 with the validation message
/// - `Api` -> 400/401/403/404 passed through, any other status -> 500
/// - `Transport`, `Decode`, `Config` -> 500
pub fn map_jira_error(err: &JiraError) -> (StatusCode, String) {
    match err {
        JiraError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        JiraError::Api { status, body, url } => match *status {
            400 => (StatusCode::BAD_REQUEST, MSG_INVALID_DATA.to_string()),
            401 => (StatusCode::UNAUTHORIZED, MSG_AUTH_FAILED.to_string()),
            403 => (StatusCode::FORBIDDEN, MSG_PERMISSION_DENIED.to_string()),
            404 => (StatusCode::NOT_FOUND, MSG_NOT_FOUND.to_string()),
            _ => {
                tracing::error!(
                    status_code = *status,
                    body = %body,
                    url = %url,
                    "unhandled JIRA API error"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    MSG_UPSTREAM_UNEXPECTED.to_string(),
                )
            }
        },
        JiraError::Transport(_) | JiraError::Decode(_) | JiraError::Config(_) => {
            tracing::error!(error = %err, "internal server error (non-JIRA API)");
            (StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL.to_string())
        }
    }
}

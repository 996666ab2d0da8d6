//! Error types and the JSON response envelope
//!
//! Every API response is `{"success": true, "data": ...}` or
//! `{"success": false, "error": "..."}`. `ApiError` carries the status
//! mapping; handlers return `Result<Json<Value>, ApiError>` and the
//! conversion happens in `IntoResponse`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Build a success envelope around serializable data.
pub fn ok<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

/// Per-request API error with its HTTP status mapping
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Authentication failed (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Resource does not exist (404)
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness conflict (409)
    #[error("{0}")]
    Conflict(String),

    /// Invite expired, revoked, or exhausted (410)
    #[error("{0}")]
    Gone(String),

    /// Upstream provider failure; status passed through
    #[error("upstream error ({status})")]
    Upstream { status: u16, body: Value },

    /// Anything else (500); detail is logged, not sent to the client
    #[error("internal error")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Gone(_) => StatusCode::GONE,
            ApiError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "internal error");
                json!({ "success": false, "error": "internal error" })
            }
            ApiError::Upstream { body, .. } => {
                json!({ "success": false, "error": "upstream error", "upstream": body })
            }
            other => json!({ "success": false, "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(e: rusqlite::Error) -> Self {
        ApiError::Internal(format!("database: {}", e))
    }
}

impl From<releye_core::RelEyeError> for ApiError {
    fn from(e: releye_core::RelEyeError) -> Self {
        use releye_core::RelEyeError;
        match e {
            RelEyeError::InvalidInvite(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Setup/runtime errors for the server itself (not per-request)
#[derive(Error, Debug)]
pub enum ServerError {
    /// Database open/migration error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Socket bind or other I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("Config error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::Gone("x".into()).status(), StatusCode::GONE);
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_status_passthrough() {
        let err = ApiError::Upstream {
            status: 429,
            body: json!({"error": "rate limited"}),
        };
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);

        // Out-of-range status falls back to 502
        let err = ApiError::Upstream {
            status: 42,
            body: Value::Null,
        };
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }
}

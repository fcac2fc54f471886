// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Global Application Error Enum.
/// Covers both failures reported by the CodeForge backend and local ones.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    AuthError(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., duplicate vote)
    Conflict(String),

    /// Any other non-success status returned by the backend.
    Upstream { status: u16, message: String },

    /// The backend could not be reached (connect error, timeout).
    Unavailable(String),
}

impl AppError {
    /// Maps a backend HTTP status and its extracted message onto a variant.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 | 422 => AppError::BadRequest(message),
            401 => AppError::AuthError(message),
            404 => AppError::NotFound(message),
            409 => AppError::Conflict(message),
            _ => AppError::Upstream { status, message },
        }
    }

    /// Human-readable message without the variant name.
    pub fn message(&self) -> &str {
        match self {
            AppError::InternalServerError(msg)
            | AppError::BadRequest(msg)
            | AppError::AuthError(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Unavailable(msg) => msg,
            AppError::Upstream { message, .. } => message,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, AppError::Unavailable(_))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Upstream { status, message } => write!(f, "{} (HTTP {})", message, status),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Upstream { status, message } => {
                tracing::warn!("Upstream error {}: {}", status, message);
                (StatusCode::BAD_GATEWAY, message)
            }
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Transport-level `reqwest` failures. Status errors are mapped by the client itself.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            AppError::Unavailable(err.to_string())
        } else if err.is_decode() {
            AppError::InternalServerError(format!("Malformed response body: {}", err))
        } else {
            AppError::InternalServerError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::BadRequest(format!("Invalid URL: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_statuses_map_to_variants() {
        assert!(matches!(AppError::from_status(401, "x".into()), AppError::AuthError(_)));
        assert!(matches!(AppError::from_status(422, "x".into()), AppError::BadRequest(_)));
        assert!(matches!(AppError::from_status(404, "x".into()), AppError::NotFound(_)));
        assert!(matches!(
            AppError::from_status(503, "x".into()),
            AppError::Upstream { status: 503, .. }
        ));
    }

    #[test]
    fn display_uses_message_only() {
        assert_eq!(AppError::NotFound("Solution not found".into()).to_string(), "Solution not found");
        assert_eq!(
            AppError::Upstream { status: 500, message: "boom".into() }.to_string(),
            "boom (HTTP 500)"
        );
    }
}

/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>` which automatically converts
/// to the failure envelope with the appropriate status code.
///
/// Every domain error carries three parts: the caller-facing HTTP status,
/// a detailed message (surfaced in the envelope), and a short operation
/// summary ("Create Task Failed." style, logged at the boundary). The
/// mapping is one consistent table:
///
/// | class             | status |
/// |-------------------|--------|
/// | BadRequest        | 400    |
/// | NotFound          | 404    |
/// | Conflict          | 409    |
/// | IllegalTransition | 409    |
/// | Internal          | 500    |

use crate::response::Envelope;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or disallowed input (400)
    BadRequest { message: String, summary: String },

    /// Entity absent or soft-deleted (404)
    NotFound { message: String, summary: String },

    /// Duplicate content on creation (409)
    Conflict { message: String, summary: String },

    /// Status-machine rule violated (409)
    IllegalTransition { message: String, summary: String },

    /// Unclassified failure, e.g. storage unavailable (500)
    Internal(String),
}

impl ApiError {
    /// Builds a validation error
    pub fn bad_request(message: impl Into<String>, summary: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            summary: summary.into(),
        }
    }

    /// Builds a not-found error
    pub fn not_found(message: impl Into<String>, summary: impl Into<String>) -> Self {
        ApiError::NotFound {
            message: message.into(),
            summary: summary.into(),
        }
    }

    /// Builds a duplicate-content error
    pub fn conflict(message: impl Into<String>, summary: impl Into<String>) -> Self {
        ApiError::Conflict {
            message: message.into(),
            summary: summary.into(),
        }
    }

    /// Builds an illegal-transition error
    pub fn illegal_transition(message: impl Into<String>, summary: impl Into<String>) -> Self {
        ApiError::IllegalTransition {
            message: message.into(),
            summary: summary.into(),
        }
    }

    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::IllegalTransition { .. } => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest { message, .. } => write!(f, "Bad request: {}", message),
            ApiError::NotFound { message, .. } => write!(f, "Not found: {}", message),
            ApiError::Conflict { message, .. } => write!(f, "Conflict: {}", message),
            ApiError::IllegalTransition { message, .. } => {
                write!(f, "Illegal transition: {}", message)
            }
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self {
            ApiError::BadRequest { message, summary }
            | ApiError::NotFound { message, summary }
            | ApiError::Conflict { message, summary }
            | ApiError::IllegalTransition { message, summary } => {
                tracing::warn!(status = %status, summary = %summary, "{}", message);
                message
            }
            ApiError::Internal(detail) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", detail);
                "An internal error occurred".to_string()
            }
        };

        (status, Json(Envelope::failure(message))).into_response()
    }
}

/// Convert sqlx errors to API errors
///
/// Storage failures are not specially classified; they propagate as
/// generic 500s.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(format!("Database error: {}", err))
    }
}

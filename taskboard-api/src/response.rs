/// The uniform response envelope
///
/// Every endpoint answers with the same wrapper:
///
/// ```json
/// { "success": true, "data": { ... }, "message": "Create Task Successfully." }
/// ```
///
/// Successful operations return HTTP 200 (including creation); domain
/// errors return their mapped status with `success = false` and `data =
/// null` (see [`crate::error::ApiError`]).

use axum::Json;
use serde::Serialize;

/// Response envelope carrying a success flag, payload, and message
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    /// Whether the operation succeeded
    pub success: bool,

    /// The payload; null on failure
    pub data: Option<T>,

    /// Human-readable outcome message
    pub message: String,
}

impl<T: Serialize> Envelope<T> {
    /// Wraps a successful payload
    pub fn ok(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: message.into(),
        })
    }
}

impl Envelope<serde_json::Value> {
    /// Builds a failure envelope with a null payload
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
        }
    }
}

// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Errors raised by a `KvStore` backend.
#[derive(Debug)]
pub enum StoreError {
    /// Payload has the wrong shape for its record type.
    InvalidPayload(String),

    /// Storage backend failed (database, filesystem).
    Backend(String),

    /// Remote endpoint unreachable or answered with a non-2xx status.
    Transport(String),

    /// Stored or received JSON could not be (de)serialized.
    Serialization(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::InvalidPayload(msg) => write!(f, "invalid payload: {}", msg),
            StoreError::Backend(msg) => write!(f, "store backend error: {}", msg),
            StoreError::Transport(msg) => write!(f, "transport error: {}", msg),
            StoreError::Serialization(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Global Application Error Enum for the HTTP surface.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Converts the error into a JSON `{error, message}` body with the matching status.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    msg,
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Invalid request", msg),
        };
        let body = Json(json!({
            "error": error,
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidPayload(msg) => AppError::BadRequest(msg),
            other => AppError::InternalServerError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Errors surfaced to the user of a teacher or student session.
/// Transport failures never appear here; they fall back to the local copy.
#[derive(Debug)]
pub enum SyncError {
    /// User input rejected; nothing was changed.
    Validation(String),

    /// No quiz stored under the given room code.
    RoomNotFound(String),

    /// The operation needs a joined student or a saved quiz first.
    NotReady(String),

    /// The quiz state machine refused the transition.
    InvalidTransition(String),

    /// Local fallback storage failed.
    Store(StoreError),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Validation(msg) => write!(f, "{}", msg),
            SyncError::RoomNotFound(code) => write!(f, "no quiz found for room code '{}'", code),
            SyncError::NotReady(msg) => write!(f, "{}", msg),
            SyncError::InvalidTransition(msg) => write!(f, "invalid transition: {}", msg),
            SyncError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SyncError {}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        SyncError::Store(err)
    }
}

impl From<validator::ValidationErrors> for SyncError {
    fn from(err: validator::ValidationErrors) -> Self {
        SyncError::Validation(err.to_string())
    }
}

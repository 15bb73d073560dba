use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::common::types::{ListenerId, now_ms};

/// Failures the broadcast engine knows how to name.
///
/// Only `InvalidReference`, `TrackNotFound` and the metadata variants ever reach
/// an HTTP caller. Resolution and ingestion failures are recovered by the
/// scheduler and only surface in logs and in the station status.
#[derive(Debug, thiserror::Error)]
pub enum RadioError {
    #[error("invalid track reference: {0}")]
    InvalidReference(String),

    #[error("no provider could resolve a playable source for {reference} ({attempts} strategies tried)")]
    ResolutionFailure { reference: String, attempts: usize },

    #[error("transcoding failed {attempts} times in a row, giving up on the track")]
    IngestionExhausted { attempts: u32 },

    #[error("listener {0} disconnected")]
    TransportDisconnect(ListenerId),

    #[error("track not found: {0}")]
    TrackNotFound(String),

    #[error("metadata lookup is not configured")]
    MetadataUnavailable,

    #[error("metadata lookup failed: {0}")]
    Metadata(String),
}

impl RadioError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidReference(_) => StatusCode::BAD_REQUEST,
            Self::TrackNotFound(_) => StatusCode::NOT_FOUND,
            Self::ResolutionFailure { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error body returned by every REST route.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Unix timestamp in milliseconds.
    pub timestamp: u64,
    /// HTTP status code.
    pub status: u16,
    /// HTTP status reason phrase (e.g. "Bad Request").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
    /// The request path that caused the error.
    pub path: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            timestamp: now_ms(),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown").into(),
            message: message.into(),
            path: path.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, path)
    }

    pub fn from_radio(err: &RadioError, path: impl Into<String>) -> Self {
        Self::new(err.status_code(), err.to_string(), path)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_error_kind() {
        assert_eq!(
            RadioError::InvalidReference("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RadioError::TrackNotFound("dQw4w9WgXcQ".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RadioError::MetadataUnavailable.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_body() {
        let err = RadioError::InvalidReference("nope".into());
        let body = ApiError::from_radio(&err, "/api/play");
        assert_eq!(body.status, 400);
        assert_eq!(body.error, "Bad Request");
        assert_eq!(body.path, "/api/play");
        assert!(body.message.contains("nope"));
    }
}

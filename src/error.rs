//! Error types for the transcript proxy
//!
//! Provides unified error handling using thiserror. The cache itself is
//! infallible; these cover the upstream provider and the HTTP surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Provider Error Enum ==
/// Failures talking to the upstream transcript provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Upstream is asking for a captcha or returned 429
    #[error("Upstream is rate limiting requests")]
    TooManyRequests,

    /// The video does not exist or cannot be played
    #[error("Video is no longer available: {0}")]
    VideoUnavailable(String),

    /// The video has no caption tracks
    #[error("Transcripts are disabled for video: {0}")]
    TranscriptsDisabled(String),

    /// The requested language is not among the video's tracks
    #[error("No transcript in language '{lang}' (available: {available})")]
    LanguageNotAvailable { lang: String, available: String },

    /// Transport failure or unexpected HTTP status
    #[error("Upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream returned something we could not understand
    #[error("Malformed upstream response: {0}")]
    Malformed(String),
}

// == Api Error Enum ==
/// Error type returned by HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or unusable request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No captions exist for the requested video or language
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream fetch failed; the message is safe to show to clients
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Upstream(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for handlers and the transcript service.
pub type Result<T> = std::result::Result<T, ApiError>;

//! Error types for Talentgate
//!
//! All errors implement `IntoResponse` for Axum handlers. Bodies always carry
//! `success: false` so clients can branch on one field.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    /// Message tripped the prompt-injection filter. The public message is
    /// deliberately generic so callers cannot probe the detection rules.
    #[error("Message could not be processed")]
    InjectionSuspected,

    #[error("Too many requests. Please try again later.")]
    RateLimited,

    /// Client is serving a temporary ban issued by the IP gate.
    #[error("Too many requests. Access temporarily restricted.")]
    Banned,

    #[error("Assistant request failed: {0}")]
    Upstream(String),

    /// Backing-store failure. Never surfaced to HTTP callers; analytics
    /// writes swallow this after logging.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::InjectionSuspected => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::RateLimited | Self::Banned => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            Self::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Service misconfigured".to_string(),
            ),
            Self::Upstream(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to get a response. Please try again.".to_string(),
            ),
            // Storage errors are swallowed at the call site; reaching here is
            // a programming error, so answer generically.
            Self::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            ),
        };

        let body = Json(serde_json::json!({
            "error": message,
            "success": false,
        }));

        (status, body).into_response()
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;

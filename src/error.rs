//! Common error types for the image relay

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message returned when the inbound body cannot be decoded
pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse json";

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("{}", PARSE_FAILURE_MESSAGE)]
    InvalidJson(#[source] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("{provider}: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    #[error("Malformed provider response: {0}")]
    MalformedEnvelope(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure body sent to clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: bool,
    pub message: String,
}

impl AppError {
    /// HTTP status used for this error.
    ///
    /// Clients of the relay only ever see 200 or 403 from `/image`, so every
    /// failure maps to 403 Forbidden.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::FORBIDDEN
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            status: false,
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

//! # Error Handling
//!
//! Custom error type for the request path and its conversion into HTTP
//! responses. Every error reaches the client as `{"error": "<message>"}`.
//! Library and session failures are logged in full but reported to the
//! client with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use webauthn_rs::prelude::WebauthnError;

/// Application-wide error type
///
/// `#[from]` lets `?` convert library errors directly, so handlers can
/// write `session.get(..).await?` instead of mapping every call.
#[derive(Error, Debug)]
pub enum AppError {
    /// The WebAuthn library refused to produce challenge options.
    /// This is a server-side problem (bad RP configuration, RNG failure).
    #[error("WebAuthn error: {0}")]
    WebAuthn(#[from] WebauthnError),

    /// The WebAuthn library rejected what the browser sent.
    ///
    /// `operation` is the message shown to the client, e.g.
    /// "Failed to verify authentication". The library error stays in the logs.
    #[error("{operation}: {source}")]
    Verification {
        operation: &'static str,
        #[source]
        source: WebauthnError,
    },

    /// Session store failures (load, save, cycle)
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Client sent something we can't act on (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Not logged in (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn verification(operation: &'static str, source: WebauthnError) -> Self {
        AppError::Verification { operation, source }
    }
}

/// Convert AppError into an HTTP response
///
/// Maps each variant to a status code and the message the client may see.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::WebAuthn(e) => {
                tracing::error!("WebAuthn error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "WebAuthn error".to_string())
            }
            AppError::Verification { operation, source } => {
                tracing::warn!(error = ?source, "{}", operation);
                (StatusCode::BAD_REQUEST, operation.to_string())
            }
            AppError::Session(e) => {
                tracing::error!("Session error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Session error".to_string())
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Serialization error".to_string())
            }
            // Messages below are written for the client, pass them through
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            AppError::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Shorthand for `Result<T, AppError>`.
pub type AppResult<T> = Result<T, AppError>;

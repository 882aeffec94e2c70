use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Only `Validation` carries its message to the caller. Every other variant
/// is logged in full and answered with a generic message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// The named credential is absent. The name is logged, never returned.
    #[error("Service not configured: {0} is missing")]
    Configuration(&'static str),

    #[error("Upstream error: {0}")]
    Upstream(String),

    /// A text-to-speech provider answered with a non-success status.
    #[error("Provider error (status {status}): {details}")]
    Provider { status: u16, details: String },

    #[error("Malformed model output: {reason}")]
    MalformedOutput { reason: String },

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Configuration(secret) => {
                tracing::error!("Configuration error: {secret} is not set");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Service not configured" }),
                )
            }
            AppError::Upstream(detail) => {
                tracing::error!("Upstream error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "The AI service request failed. Please try again." }),
                )
            }
            AppError::Provider { status, details } => {
                tracing::error!("Speech provider returned {status}: {details}");
                (
                    StatusCode::BAD_GATEWAY,
                    json!({
                        "error": "Speech synthesis failed",
                        "details": details,
                    }),
                )
            }
            AppError::MalformedOutput { reason } => {
                tracing::error!("Malformed model output: {reason}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Failed to process the AI response. Please try again." }),
                )
            }
            AppError::Unexpected(e) => {
                tracing::error!("Unexpected error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "An unexpected error occurred" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

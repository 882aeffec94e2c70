//! Text-to-speech proxies.
//!
//! Thin pass-through to two providers. The only local logic is "text is
//! required", defaulting of optional fields, and choosing a content type.
//! Audio is streamed back as it arrives; nothing is buffered or re-encoded.

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use bytes::Bytes;
use serde_json::Value;
use tracing::warn;

use crate::errors::AppError;

pub mod elevenlabs;
pub mod handlers;
pub mod openai;

pub use elevenlabs::ElevenLabsClient;
pub use openai::OpenAiSpeechClient;

pub const TEXT_REQUIRED_MESSAGE: &str = "Text is required";

/// Maps a provider format name to the audio content type it produces.
/// ElevenLabs formats carry a sample-rate suffix ("mp3_44100_128"); only the codec matters.
pub fn content_type_for_format(format: &str) -> &'static str {
    let codec = format.split('_').next().unwrap_or_default();
    match codec.to_ascii_lowercase().as_str() {
        "mp3" => "audio/mpeg",
        "opus" => "audio/opus",
        "aac" => "audio/aac",
        "flac" => "audio/flac",
        "wav" => "audio/wav",
        "pcm" => "audio/pcm",
        "ulaw" | "mulaw" => "audio/basic",
        _ => "application/octet-stream",
    }
}

/// Returns the trimmed-non-empty text or the "text is required" validation error.
pub(crate) fn require_text(text: Option<String>) -> Result<String, AppError> {
    text.filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Validation(TEXT_REQUIRED_MESSAGE.to_string()))
}

/// Picks `value` unless it is missing or blank.
pub(crate) fn or_default(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Converts a provider response into a streamed audio response, or a provider error.
pub(crate) async fn stream_audio(
    response: reqwest::Response,
    fallback_content_type: &'static str,
) -> Result<Response, AppError> {
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Provider {
            status: status.as_u16(),
            details: error_details(status.as_u16(), response.bytes().await),
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|ct| ct.starts_with("audio/"))
        .unwrap_or(fallback_content_type)
        .to_string();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, "no-store")
        .body(Body::from_stream(response.bytes_stream()))
        .map_err(|e| AppError::Unexpected(e.into()))
}

/// Error details for a failed provider call, from whatever body could be read.
fn error_details(status: u16, body: reqwest::Result<Bytes>) -> String {
    match body {
        Ok(body) => provider_message(&String::from_utf8_lossy(&body)),
        Err(e) => {
            warn!("Failed to read speech provider error body (status {status}): {e}");
            format!("provider returned {status} with an unreadable body")
        }
    }
}

/// Pulls the human-readable message out of a provider error body.
///
/// OpenAI: `{"error": {"message": ..}}`. ElevenLabs: `{"detail": {"message": ..}}`
/// or `{"detail": ".."}`. Anything else is returned as-is.
pub fn provider_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    let message = value
        .pointer("/error/message")
        .or_else(|| value.pointer("/detail/message"))
        .or_else(|| value.get("detail"))
        .and_then(Value::as_str);

    match message {
        Some(message) => message.to_string(),
        None => body.trim().to_string(),
    }
}

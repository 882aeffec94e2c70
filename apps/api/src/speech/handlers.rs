//! Axum route handlers for the text-to-speech proxies.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Response,
    Json,
};

use crate::errors::AppError;
use crate::speech::elevenlabs::{ElevenLabsBody, ElevenLabsRequest};
use crate::speech::openai::{OpenAiSpeechBody, OpenAiSpeechRequest};
use crate::speech::TEXT_REQUIRED_MESSAGE;
use crate::state::AppState;

fn unreadable_body(rejection: JsonRejection) -> AppError {
    tracing::debug!("Unreadable TTS body: {rejection}");
    AppError::Validation(TEXT_REQUIRED_MESSAGE.to_string())
}

/// POST /api/tts/openai
pub async fn handle_openai_tts(
    State(state): State<AppState>,
    body: Result<Json<OpenAiSpeechBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = body.map_err(unreadable_body)?;
    let request = OpenAiSpeechRequest::from_body(body)?;

    let client = state
        .openai_speech
        .as_ref()
        .ok_or(AppError::Configuration("OPENAI_TTS_API_KEY"))?;

    client.synthesize(&request).await
}

/// POST /api/tts/elevenlabs
pub async fn handle_elevenlabs_tts(
    State(state): State<AppState>,
    body: Result<Json<ElevenLabsBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = body.map_err(unreadable_body)?;
    let request = ElevenLabsRequest::from_body(body)?;

    let client = state
        .elevenlabs
        .as_ref()
        .ok_or(AppError::Configuration("ELEVENLABS_API_KEY"))?;

    client.synthesize(&request).await
}

//! OpenAI text-to-speech proxy.

use anyhow::{Context, Result};
use axum::response::Response;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::speech::{content_type_for_format, or_default, require_text, stream_audio};

pub const DEFAULT_VOICE: &str = "alloy";
pub const DEFAULT_MODEL: &str = "tts-1";
pub const DEFAULT_FORMAT: &str = "mp3";

/// Request body for `POST /api/tts/openai`.
#[derive(Debug, Default, Deserialize)]
pub struct OpenAiSpeechBody {
    pub text: Option<String>,
    pub voice: Option<String>,
    pub model: Option<String>,
    pub format: Option<String>,
}

/// A validated request with every optional field defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenAiSpeechRequest {
    pub model: String,
    pub input: String,
    pub voice: String,
    pub response_format: String,
}

impl OpenAiSpeechRequest {
    pub fn from_body(body: OpenAiSpeechBody) -> Result<Self, AppError> {
        Ok(Self {
            input: require_text(body.text)?,
            voice: or_default(body.voice, DEFAULT_VOICE),
            model: or_default(body.model, DEFAULT_MODEL),
            response_format: or_default(body.format, DEFAULT_FORMAT),
        })
    }
}

#[derive(Clone)]
pub struct OpenAiSpeechClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiSpeechClient {
    pub fn new(api_key: String, base_url: String) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .build()
                .context("Failed to build HTTP client")?,
            api_key,
            base_url,
        })
    }

    pub async fn synthesize(&self, request: &OpenAiSpeechRequest) -> Result<Response, AppError> {
        info!(
            "OpenAI TTS: model={}, voice={}, format={}, chars={}",
            request.model,
            request.voice,
            request.response_format,
            request.input.chars().count()
        );

        let response = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("OpenAI TTS request failed: {e}")))?;

        stream_audio(response, content_type_for_format(&request.response_format)).await
    }
}

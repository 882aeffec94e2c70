//! ElevenLabs text-to-speech proxy.

use anyhow::{Context, Result};
use axum::response::Response;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::speech::{content_type_for_format, or_default, require_text, stream_audio};

const ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io/v1";

/// "Rachel", one of the premade voices available on every account.
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";
pub const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";
pub const DEFAULT_FORMAT: &str = "mp3_44100_128";

/// Request body for `POST /api/tts/elevenlabs`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElevenLabsBody {
    pub text: Option<String>,
    pub voice_id: Option<String>,
    pub model_id: Option<String>,
    pub format: Option<String>,
}

/// A validated request with every optional field defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElevenLabsRequest {
    pub text: String,
    pub voice_id: String,
    pub model_id: String,
    pub output_format: String,
}

#[derive(Debug, Serialize)]
struct ElevenLabsPayload<'a> {
    text: &'a str,
    model_id: &'a str,
}

impl ElevenLabsRequest {
    pub fn from_body(body: ElevenLabsBody) -> Result<Self, AppError> {
        let request = Self {
            text: require_text(body.text)?,
            voice_id: or_default(body.voice_id, DEFAULT_VOICE_ID),
            model_id: or_default(body.model_id, DEFAULT_MODEL_ID),
            output_format: or_default(body.format, DEFAULT_FORMAT),
        };

        // The voice id becomes a path segment
        if !request.voice_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AppError::Validation("voiceId is invalid".to_string()));
        }

        Ok(request)
    }

    fn payload(&self) -> ElevenLabsPayload<'_> {
        ElevenLabsPayload {
            text: &self.text,
            model_id: &self.model_id,
        }
    }
}

#[derive(Clone)]
pub struct ElevenLabsClient {
    client: Client,
    api_key: String,
}

impl ElevenLabsClient {
    pub fn new(api_key: String) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .build()
                .context("Failed to build HTTP client")?,
            api_key,
        })
    }

    pub async fn synthesize(&self, request: &ElevenLabsRequest) -> Result<Response, AppError> {
        info!(
            "ElevenLabs TTS: model={}, voice={}, format={}, chars={}",
            request.model_id,
            request.voice_id,
            request.output_format,
            request.text.chars().count()
        );

        let response = self
            .client
            .post(format!(
                "{ELEVENLABS_API_URL}/text-to-speech/{}/stream",
                request.voice_id
            ))
            .query(&[("output_format", request.output_format.as_str())])
            .header("xi-api-key", &self.api_key)
            .json(&request.payload())
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("ElevenLabs request failed: {e}")))?;

        stream_audio(response, content_type_for_format(&request.output_format)).await
    }
}

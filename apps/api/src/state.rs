use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::auth::{IdentityProvider, SupabaseIdentityClient};
use crate::career::CareerAnalyzer;
use crate::config::Config;
use crate::llm_client::{self, OpenAiChatClient};
use crate::speech::{ElevenLabsClient, OpenAiSpeechClient};

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Each upstream collaborator is `None` when its credential is not configured;
/// handlers answer with a configuration error instead of calling out.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub career: Option<CareerAnalyzer>,
    pub openai_speech: Option<OpenAiSpeechClient>,
    pub elevenlabs: Option<ElevenLabsClient>,
    pub identity: Option<Arc<dyn IdentityProvider>>,
}

impl AppState {
    /// Builds every configured client once, at startup.
    pub fn from_config(config: Config) -> Result<Self> {
        let career = match &config.openai_api_key {
            Some(key) => {
                let client = OpenAiChatClient::new(key.clone(), config.openai_api_base.clone())?;
                info!(
                    "Completion client initialized (model: {}, timeout: {:?})",
                    llm_client::MODEL,
                    config.upstream_timeout
                );
                Some(CareerAnalyzer::new(Arc::new(client), config.upstream_timeout))
            }
            None => {
                warn!("OPENAI_API_KEY is not set; career analysis is disabled");
                None
            }
        };

        let openai_speech = match &config.openai_tts_api_key {
            Some(key) => Some(OpenAiSpeechClient::new(
                key.clone(),
                config.openai_api_base.clone(),
            )?),
            None => {
                warn!("No OpenAI TTS key is set; OpenAI speech is disabled");
                None
            }
        };

        let elevenlabs = match &config.elevenlabs_api_key {
            Some(key) => Some(ElevenLabsClient::new(key.clone())?),
            None => {
                warn!("ELEVENLABS_API_KEY is not set; ElevenLabs speech is disabled");
                None
            }
        };

        let identity: Option<Arc<dyn IdentityProvider>> =
            match (&config.supabase_url, &config.supabase_anon_key) {
                (Some(url), Some(key)) => Some(Arc::new(SupabaseIdentityClient::new(
                    url.clone(),
                    key.clone(),
                )?)),
                _ => {
                    warn!("SUPABASE_URL / SUPABASE_ANON_KEY are not set; auth callback is disabled");
                    None
                }
            };

        Ok(Self {
            config,
            career,
            openai_speech,
            elevenlabs,
            identity,
        })
    }
}

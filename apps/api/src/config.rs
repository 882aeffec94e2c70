use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Deployment environment. Only affects how redirect origins are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(AppEnv::Development),
            "production" | "prod" => Ok(AppEnv::Production),
            other => anyhow::bail!("APP_ENV must be 'development' or 'production', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
///
/// Secrets are optional at startup. A missing secret disables the endpoint
/// that needs it: requests fail with a configuration error instead of the
/// process refusing to boot.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub openai_api_key: Option<String>,
    pub openai_api_base: String,
    pub openai_tts_api_key: Option<String>,
    pub elevenlabs_api_key: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub public_origin: String,
    pub app_env: AppEnv,
    pub upstream_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = lookup("PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let upstream_timeout_secs = match lookup("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("UPSTREAM_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_UPSTREAM_TIMEOUT_SECS,
        };

        let app_env = match lookup("APP_ENV") {
            Some(raw) => AppEnv::parse(&raw)?,
            None => AppEnv::Development,
        };

        let openai_api_key = secret(&lookup, "OPENAI_API_KEY");
        let openai_tts_api_key =
            secret(&lookup, "OPENAI_TTS_API_KEY").or_else(|| openai_api_key.clone());

        Ok(Config {
            port,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            openai_api_key,
            openai_api_base: lookup("OPENAI_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_OPENAI_API_BASE.to_string()),
            openai_tts_api_key,
            elevenlabs_api_key: secret(&lookup, "ELEVENLABS_API_KEY"),
            supabase_url: secret(&lookup, "SUPABASE_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            supabase_anon_key: secret(&lookup, "SUPABASE_ANON_KEY"),
            public_origin: lookup("PUBLIC_ORIGIN")
                .map(|origin| origin.trim_end_matches('/').to_string())
                .unwrap_or_else(|| format!("http://localhost:{port}")),
            app_env,
            upstream_timeout: Duration::from_secs(upstream_timeout_secs),
        })
    }
}

/// Blank values count as unset.
fn secret(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

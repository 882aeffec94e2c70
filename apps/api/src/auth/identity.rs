//! Identity provider client: delegates code exchange and user attributes to the provider.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Metadata key holding the account type on the identity provider's user record.
pub const USER_TYPE_KEY: &str = "user_type";

/// The kind of account a user signed up as. Drives post-login routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    JobSeeker,
    Employer,
}

impl AccountType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "job_seeker" | "jobseeker" | "job-seeker" => Some(AccountType::JobSeeker),
            "employer" => Some(AccountType::Employer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::JobSeeker => "job_seeker",
            AccountType::Employer => "employer",
        }
    }

    pub fn home_path(&self) -> &'static str {
        match self {
            AccountType::JobSeeker => "/dashboard",
            AccountType::Employer => "/employer/dashboard",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
}

impl IdentityUser {
    pub fn account_type(&self) -> Option<AccountType> {
        self.user_metadata
            .get(USER_TYPE_KEY)
            .and_then(Value::as_str)
            .and_then(AccountType::parse)
    }
}

/// The session returned by a successful code exchange. Never persisted here.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentitySession {
    pub access_token: String,
    pub user: IdentityUser,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("identity provider error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<IdentitySession, IdentityError>;

    async fn update_user_type(
        &self,
        session: &IdentitySession,
        account_type: AccountType,
    ) -> Result<(), IdentityError>;
}

#[derive(Debug, Serialize)]
struct PkceExchange<'a> {
    auth_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code_verifier: Option<&'a str>,
}

/// Supabase Auth (GoTrue) REST client.
#[derive(Clone)]
pub struct SupabaseIdentityClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseIdentityClient {
    pub fn new(base_url: String, anon_key: String) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .context("Failed to build HTTP client")?,
            base_url,
            anon_key,
        })
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, IdentityError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(IdentityError::Api {
            status: status.as_u16(),
            message: gotrue_message(&body),
        })
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentityClient {
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<IdentitySession, IdentityError> {
        let response = self
            .client
            .post(format!("{}/auth/v1/token", self.base_url))
            .query(&[("grant_type", "pkce")])
            .header("apikey", &self.anon_key)
            .json(&PkceExchange {
                auth_code: code,
                code_verifier,
            })
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn update_user_type(
        &self,
        session: &IdentitySession,
        account_type: AccountType,
    ) -> Result<(), IdentityError> {
        let response = self
            .client
            .put(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .json(&json!({ "data": { USER_TYPE_KEY: account_type.as_str() } }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

/// GoTrue reports errors under several keys depending on the endpoint and version.
fn gotrue_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

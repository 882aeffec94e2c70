//! Career analysis pipeline.
//!
//! Flow: accepted input → compile_prompt → one provider call (bounded by a
//! timeout) → validate_reply → result.
//!
//! Exactly one upstream call per request. Failures are returned, never retried.
//! The caller's `career_analysis` span supplies the request id on every line.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::career::compiler::compile_prompt;
use crate::career::guard::AcceptedInput;
use crate::career::models::CareerAnalysisResult;
use crate::career::validator::validate_reply;
use crate::errors::AppError;
use crate::llm_client::{CompletionProvider, LlmError};

#[derive(Clone)]
pub struct CareerAnalyzer {
    provider: Arc<dyn CompletionProvider>,
    upstream_timeout: Duration,
}

impl CareerAnalyzer {
    pub fn new(provider: Arc<dyn CompletionProvider>, upstream_timeout: Duration) -> Self {
        Self {
            provider,
            upstream_timeout,
        }
    }

    /// Runs the compile → call → validate stages for one request.
    pub async fn analyze(&self, input: &AcceptedInput) -> Result<CareerAnalysisResult, AppError> {
        let prompt = compile_prompt(input);
        info!(
            input_chars = input.as_str().chars().count(),
            "Requesting career analysis"
        );

        let call = self
            .provider
            .complete(prompt.system, &prompt.user, prompt.params);
        let reply = match tokio::time::timeout(self.upstream_timeout, call).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                warn!("Completion call failed: {e}");
                return Err(AppError::Upstream(e.to_string()));
            }
            Err(_) => {
                let e = LlmError::Timeout(self.upstream_timeout);
                warn!("Completion call abandoned: {e}");
                return Err(AppError::Upstream(e.to_string()));
            }
        };

        let result = validate_reply(&reply)?;
        info!(
            stages = result.career_paths.len(),
            "Career analysis validated"
        );
        Ok(result)
    }
}

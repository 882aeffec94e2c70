//! Prompt Compiler: deterministically turns accepted input into a model request.

use crate::career::guard::AcceptedInput;
use crate::career::prompts::{CAREER_ANALYSIS_PROMPT_TEMPLATE, CAREER_ANALYSIS_SYSTEM};
use crate::llm_client::GenerationParams;

pub const TEMPERATURE: f32 = 0.7;
/// Large enough for five stages of six skills each.
pub const MAX_TOKENS: u32 = 2000;

pub const GENERATION_PARAMS: GenerationParams = GenerationParams {
    temperature: TEMPERATURE,
    max_tokens: MAX_TOKENS,
};

/// A ready-to-send model request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPrompt {
    pub system: &'static str,
    pub user: String,
    pub params: GenerationParams,
}

/// Pure construction: never fails, never reads anything but its argument
/// and constants.
pub fn compile_prompt(input: &AcceptedInput) -> CompiledPrompt {
    CompiledPrompt {
        system: CAREER_ANALYSIS_SYSTEM.as_str(),
        user: CAREER_ANALYSIS_PROMPT_TEMPLATE.replace("{description}", input.as_str()),
        params: GENERATION_PARAMS,
    }
}

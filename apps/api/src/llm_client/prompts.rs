// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments those prompts embed.

/// System prompt fragment that enforces JSON-only output.
/// JSON mode on the provider side also requires the word "JSON" to appear in the messages.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
Do NOT include any text outside the JSON object. \
Do NOT use markdown code fences. \
Do NOT include explanations or apologies.";

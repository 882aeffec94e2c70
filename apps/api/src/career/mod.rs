// Career path analysis: input guard → prompt compiler → completion call → response validator.
// All model calls go through llm_client; no direct HTTP calls here.

pub mod compiler;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod validator;

pub use pipeline::CareerAnalyzer;

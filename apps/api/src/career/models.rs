use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for `POST /api/analyze-career`.
///
/// `input` is kept untyped so a missing or non-string value reaches the
/// input guard instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct CareerAnalysisRequest {
    #[serde(default)]
    pub input: Option<Value>,
}

/// One stage of a suggested career path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CareerStage {
    pub title: String,
    /// "N-M years" style range, e.g. "0-2 years".
    pub years_experience: String,
    pub description: String,
    pub key_skills: Vec<String>,
    /// Currency range, e.g. "₹4-6 LPA".
    pub salary_range: String,
}

/// The structured analysis returned to the caller once validated.
/// Never modified after validation. Fields outside the schema are rejected,
/// so serializing it again yields the reply exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CareerAnalysisResult {
    pub current_role: String,
    pub strengths: Vec<String>,
    pub career_paths: Vec<CareerStage>,
    pub recommendations: Vec<String>,
}

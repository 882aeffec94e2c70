//! Response Validator: accepts or rejects a model reply against the career analysis schema.
//!
//! # Rules
//! - No content in the envelope → upstream error ("empty response")
//! - Content that is not JSON → malformed output
//! - JSON that violates the schema → malformed output
//! - Otherwise the parsed result is returned exactly as produced
//!
//! The validator never repairs a reply. Raw model text is logged on
//! rejection and never placed in the error.

use std::fmt;
use std::ops::RangeInclusive;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::career::models::{CareerAnalysisResult, CareerStage};
use crate::errors::AppError;
use crate::llm_client::{strip_json_fences, ChatCompletion};

pub const STRENGTHS: RangeInclusive<usize> = 3..=5;
pub const CAREER_PATHS: RangeInclusive<usize> = 4..=5;
pub const KEY_SKILLS: RangeInclusive<usize> = 4..=6;
pub const RECOMMENDATIONS: RangeInclusive<usize> = 3..=5;

/// "0-2 years", "2 – 4 yrs", "3 to 5 years", "10+ years"
static YEARS_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,2})\s*(?:-|–|—|to)\s*(\d{1,2})\s*\+?\s*(?:years?|yrs?)\.?\s*$")
        .expect("Valid years range pattern")
});
static YEARS_OPEN_ENDED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,2})\s*\+\s*(?:years?|yrs?)\.?\s*$")
        .expect("Valid open-ended years pattern")
});

// ────────────────────────────────────────────────────────────────────────────
// Schema check
// ────────────────────────────────────────────────────────────────────────────

/// A single schema rule the reply broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub problem: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.problem)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaCheck {
    Valid(CareerAnalysisResult),
    Invalid(Vec<Violation>),
}

/// Checks a parsed document against the career analysis schema.
pub fn check_schema(document: Value) -> SchemaCheck {
    let result: CareerAnalysisResult = match serde_json::from_value(document) {
        Ok(result) => result,
        Err(e) => {
            return SchemaCheck::Invalid(vec![Violation {
                path: "$".to_string(),
                problem: e.to_string(),
            }])
        }
    };

    let mut violations = Vec::new();

    require_text(&mut violations, "currentRole", &result.current_role);
    require_items(&mut violations, "strengths", &result.strengths, STRENGTHS);
    require_count(
        &mut violations,
        "careerPaths",
        result.career_paths.len(),
        CAREER_PATHS,
    );
    for (i, stage) in result.career_paths.iter().enumerate() {
        check_stage(&mut violations, &format!("careerPaths[{i}]"), stage);
    }
    require_items(
        &mut violations,
        "recommendations",
        &result.recommendations,
        RECOMMENDATIONS,
    );

    if violations.is_empty() {
        SchemaCheck::Valid(result)
    } else {
        SchemaCheck::Invalid(violations)
    }
}

fn check_stage(violations: &mut Vec<Violation>, path: &str, stage: &CareerStage) {
    require_text(violations, &format!("{path}.title"), &stage.title);
    require_text(violations, &format!("{path}.description"), &stage.description);
    require_items(
        violations,
        &format!("{path}.keySkills"),
        &stage.key_skills,
        KEY_SKILLS,
    );

    if !is_years_range(&stage.years_experience) {
        violations.push(Violation {
            path: format!("{path}.yearsExperience"),
            problem: format!("'{}' is not an \"N-M years\" range", stage.years_experience),
        });
    }

    let salary = stage.salary_range.trim();
    if salary.is_empty() || !salary.chars().any(|c| c.is_ascii_digit()) {
        violations.push(Violation {
            path: format!("{path}.salaryRange"),
            problem: "must be a non-empty currency range".to_string(),
        });
    }
}

fn require_text(violations: &mut Vec<Violation>, path: &str, value: &str) {
    if value.trim().is_empty() {
        violations.push(Violation {
            path: path.to_string(),
            problem: "must be non-empty".to_string(),
        });
    }
}

fn require_count(
    violations: &mut Vec<Violation>,
    path: &str,
    count: usize,
    bounds: RangeInclusive<usize>,
) {
    if !bounds.contains(&count) {
        violations.push(Violation {
            path: path.to_string(),
            problem: format!(
                "has {count} items, expected {} to {}",
                bounds.start(),
                bounds.end()
            ),
        });
    }
}

fn require_items(
    violations: &mut Vec<Violation>,
    path: &str,
    items: &[String],
    bounds: RangeInclusive<usize>,
) {
    require_count(violations, path, items.len(), bounds);
    for (i, item) in items.iter().enumerate() {
        require_text(violations, &format!("{path}[{i}]"), item);
    }
}

/// Accepts "N-M years" (N ≤ M) and open-ended "N+ years".
pub fn is_years_range(text: &str) -> bool {
    if let Some(caps) = YEARS_RANGE.captures(text) {
        let low = caps[1].parse::<u32>().unwrap_or(u32::MAX);
        let high = caps[2].parse::<u32>().unwrap_or(0);
        return low <= high;
    }
    YEARS_OPEN_ENDED.is_match(text)
}

// ────────────────────────────────────────────────────────────────────────────
// Reply validation
// ────────────────────────────────────────────────────────────────────────────

/// Validates the upstream envelope and returns the career analysis it carries.
pub fn validate_reply(reply: &ChatCompletion) -> Result<CareerAnalysisResult, AppError> {
    let text = reply
        .text()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Upstream("empty response".to_string()))?;

    if reply.finish_reason() == Some("length") {
        warn!("Model reply hit the output token limit; it is likely truncated");
    }

    let document: Value = match serde_json::from_str(strip_json_fences(text)) {
        Ok(document) => document,
        Err(e) => {
            warn!(raw_output = %text, "Model reply is not valid JSON: {e}");
            return Err(AppError::MalformedOutput {
                reason: format!("reply is not valid JSON: {e}"),
            });
        }
    };

    match check_schema(document) {
        SchemaCheck::Valid(result) => Ok(result),
        SchemaCheck::Invalid(violations) => {
            let summary = violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            warn!(raw_output = %text, "Model reply violates the schema: {summary}");
            Err(AppError::MalformedOutput {
                reason: format!("{} schema violation(s): {summary}", violations.len()),
            })
        }
    }
}

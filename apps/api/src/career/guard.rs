//! Input Guard: rejects caller text that is too thin to analyse before any upstream call.

use serde_json::Value;
use thiserror::Error;

use crate::errors::AppError;

/// Minimum trimmed length, in characters, of an accepted description.
pub const MIN_INPUT_CHARS: usize = 50;

pub const INPUT_TOO_SHORT_MESSAGE: &str =
    "Please provide a detailed description (at least 50 characters)";

/// Caller text that passed the guard. Only `guard_input` constructs it.
///
/// The text is carried exactly as received: no trimming, casing or
/// punctuation changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedInput(String);

impl AcceptedInput {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputRejection {
    #[error("input is missing")]
    Missing,

    #[error("input is not text")]
    NotText,

    #[error("input has {chars} characters after trimming, need at least {min}")]
    TooShort { chars: usize, min: usize },
}

impl From<InputRejection> for AppError {
    fn from(rejection: InputRejection) -> Self {
        tracing::debug!("Input rejected: {rejection}");
        AppError::Validation(INPUT_TOO_SHORT_MESSAGE.to_string())
    }
}

pub fn guard_input(raw: Option<&Value>) -> Result<AcceptedInput, InputRejection> {
    let text = match raw {
        None | Some(Value::Null) => return Err(InputRejection::Missing),
        Some(Value::String(text)) => text,
        Some(_) => return Err(InputRejection::NotText),
    };

    let chars = text.trim().chars().count();
    if chars < MIN_INPUT_CHARS {
        return Err(InputRejection::TooShort {
            chars,
            min: MIN_INPUT_CHARS,
        });
    }

    Ok(AcceptedInput(text.clone()))
}

#[cfg(test)]
pub(crate) fn accepted(text: &str) -> AcceptedInput {
    AcceptedInput(text.to_string())
}

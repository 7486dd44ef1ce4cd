//! Inbound request validation.
//!
//! Checks run in a fixed order and the first failure wins:
//! `topic`, `grade_level`, `subject`, then `duration_minutes`.

use serde_json::Value;
use thiserror::Error;

use super::LessonPlanRequest;

/// Shortest lesson accepted, in minutes (inclusive).
pub const MIN_DURATION_MINUTES: i64 = 15;

/// A request that does not satisfy the input contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{0}' is required.")]
    MissingField(&'static str),

    /// The message keeps its historical wording; 15 itself is accepted.
    #[error("Duration must be greater than 15 minutes.")]
    DurationTooShort { value: String },
}

/// Validate a decoded request body.
///
/// Non-string values in the text fields count as missing. `duration_minutes`
/// may be a string or a JSON number; empty strings in optional fields are
/// treated as absent.
pub fn validate_request(body: &Value) -> Result<LessonPlanRequest, ValidationError> {
    let topic = required_str(body, "topic")?;
    let grade_level = required_str(body, "grade_level")?;
    let subject = required_str(body, "subject")?;

    let learning_context = optional_str(body, "learning_context");

    let duration_minutes = match body.get("duration_minutes") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    if let Some(raw) = &duration_minutes {
        match parse_leading_int(raw) {
            Some(minutes) if minutes >= MIN_DURATION_MINUTES => {}
            _ => {
                return Err(ValidationError::DurationTooShort { value: raw.clone() });
            }
        }
    }

    Ok(LessonPlanRequest {
        topic,
        grade_level,
        subject,
        learning_context,
        duration_minutes,
    })
}

fn required_str(body: &Value, field: &'static str) -> Result<String, ValidationError> {
    match body.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn optional_str(body: &Value, field: &str) -> Option<String> {
    match body.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Parse the leading integer of `s`: optional whitespace, an optional sign,
/// then digits. Trailing text is ignored (`"45 min"` is 45). Returns `None`
/// when there are no leading digits. Values too large for `i64` saturate.
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

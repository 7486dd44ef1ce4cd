//! Schema enforcement for generated lesson plan text.
//!
//! The generator is instructed to emit bare JSON matching
//! [`super::prompt::SCHEMA_REFERENCE`]. This module tolerates a surrounding
//! code fence, decodes the JSON, and checks every clause of the contract:
//! - `ludic_introduction` and `bncc_goal` are non-empty strings.
//! - `step_by_step` is an array of at least three steps, each carrying
//!   `etapa`, `tempo` and `descricao` as strings.
//! - `rubric_evaluation` carries all four levels as non-empty strings.
//!
//! Each error names the clause that was violated. Values are never repaired.

use serde_json::{Map, Value};
use thiserror::Error;

use super::{GeneratedLessonPlan, MIN_STEPS, RubricLevels, Step};

/// Ways generated text can fail the lesson plan contract.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed AI output: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("malformed AI output: expected a JSON object")]
    NotAnObject,

    #[error("AI output field '{0}' is missing or not a non-empty string")]
    InvalidField(&'static str),

    #[error("AI output field 'step_by_step' is missing or not a list")]
    StepsNotAList,

    #[error("AI output field 'step_by_step' must have at least 3 steps (got {0})")]
    TooFewSteps(usize),

    #[error("AI output step {index} is not an object")]
    StepNotAnObject { index: usize },

    #[error("AI output step {index} field '{field}' is missing or not a string")]
    InvalidStep { index: usize, field: &'static str },

    #[error("AI output field 'rubric_evaluation' is missing or not an object")]
    RubricNotAnObject,

    #[error("AI output rubric level '{0}' is missing or empty")]
    InvalidRubricLevel(&'static str),
}

impl ParseError {
    /// The contract field the error refers to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Malformed(_) | Self::NotAnObject => None,
            Self::InvalidField(f) | Self::InvalidRubricLevel(f) => Some(*f),
            Self::InvalidStep { field, .. } => Some(*field),
            Self::StepsNotAList | Self::TooFewSteps(_) | Self::StepNotAnObject { .. } => {
                Some("step_by_step")
            }
            Self::RubricNotAnObject => Some("rubric_evaluation"),
        }
    }
}

/// Parse and validate raw generated text.
pub fn parse_lesson_plan(raw: &str) -> Result<GeneratedLessonPlan, ParseError> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))?;
    let obj = value.as_object().ok_or(ParseError::NotAnObject)?;

    let ludic_introduction = non_empty_str(obj, "ludic_introduction")
        .ok_or(ParseError::InvalidField("ludic_introduction"))?;
    let bncc_goal =
        non_empty_str(obj, "bncc_goal").ok_or(ParseError::InvalidField("bncc_goal"))?;

    let step_by_step = parse_steps(obj.get("step_by_step"))?;
    let rubric_evaluation = parse_rubric(obj.get("rubric_evaluation"))?;

    Ok(GeneratedLessonPlan {
        ludic_introduction,
        bncc_goal,
        step_by_step,
        rubric_evaluation,
    })
}

fn parse_steps(value: Option<&Value>) -> Result<Vec<Step>, ParseError> {
    let items = value
        .and_then(Value::as_array)
        .ok_or(ParseError::StepsNotAList)?;

    if items.len() < MIN_STEPS {
        return Err(ParseError::TooFewSteps(items.len()));
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| -> Result<Step, ParseError> {
            let index = i + 1;
            let step = item
                .as_object()
                .ok_or(ParseError::StepNotAnObject { index })?;
            let field = |name: &'static str| match step.get(name) {
                Some(Value::String(s)) => Ok(s.clone()),
                _ => Err(ParseError::InvalidStep { index, field: name }),
            };
            Ok(Step {
                etapa: field("etapa")?,
                tempo: field("tempo")?,
                descricao: field("descricao")?,
            })
        })
        .collect()
}

fn parse_rubric(value: Option<&Value>) -> Result<RubricLevels, ParseError> {
    let rubric = value
        .and_then(Value::as_object)
        .ok_or(ParseError::RubricNotAnObject)?;

    let level =
        |name: &'static str| non_empty_str(rubric, name).ok_or(ParseError::InvalidRubricLevel(name));

    let [excelente, bom, satisfatorio, em_desenvolvimento] = RubricLevels::LEVELS;
    Ok(RubricLevels {
        excelente: level(excelente)?,
        bom: level(bom)?,
        satisfatorio: level(satisfatorio)?,
        em_desenvolvimento: level(em_desenvolvimento)?,
    })
}

fn non_empty_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Remove a surrounding markdown code fence, if present.
///
/// Accepts an optional language tag on the opening fence in any case
/// (```` ```json ````, ```` ```JSON ````). Text without a fence is returned
/// trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(after_open) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the rest of the opening line (the language tag).
    let body = match after_open.find('\n') {
        Some(pos) => &after_open[pos + 1..],
        None => after_open.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

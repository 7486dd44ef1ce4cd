//! Lesson plan domain types and the pure stages of the pipeline.
//!
//! - [`validate`]: inbound request checks.
//! - [`prompt`]: instruction document for the text generator.
//! - [`parser`]: schema enforcement on the generator's raw output.

pub mod parser;
pub mod prompt;
pub mod validate;

use serde::{Deserialize, Serialize};

pub use parser::{ParseError, parse_lesson_plan};
pub use prompt::build_prompt;
pub use validate::{ValidationError, validate_request};

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A validated lesson plan request.
///
/// Built only by [`validate_request`]; the required fields are guaranteed
/// non-empty and `duration_minutes`, when present, parses to at least 15.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonPlanRequest {
    pub topic: String,
    pub grade_level: String,
    pub subject: String,
    pub learning_context: Option<String>,
    /// Kept as the caller sent it (e.g. `"45"`); echoed and persisted verbatim.
    pub duration_minutes: Option<String>,
}

// ---------------------------------------------------------------------------
// Generated content
// ---------------------------------------------------------------------------

/// The structured lesson plan the text generator must return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedLessonPlan {
    /// Playful opening activity.
    pub ludic_introduction: String,
    /// Alignment statement citing a BNCC skill code.
    pub bncc_goal: String,
    /// Ordered lesson stages; at least [`MIN_STEPS`] entries.
    pub step_by_step: Vec<Step>,
    pub rubric_evaluation: RubricLevels,
}

/// Minimum number of entries in [`GeneratedLessonPlan::step_by_step`].
pub const MIN_STEPS: usize = 3;

/// One stage of the lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Stage name.
    pub etapa: String,
    /// Time allotment.
    pub tempo: String,
    /// What happens during the stage.
    pub descricao: String,
}

/// Assessment rubric, one description per performance tier (best first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricLevels {
    pub excelente: String,
    pub bom: String,
    pub satisfatorio: String,
    pub em_desenvolvimento: String,
}

impl RubricLevels {
    /// Level names in descending order of performance.
    pub const LEVELS: [&str; 4] = ["excelente", "bom", "satisfatorio", "em_desenvolvimento"];
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored lesson plan row.
///
/// `generated_content` is the raw AI text, not the validated structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LessonPlan {
    pub id: Uuid,
    pub topic: String,
    pub grade_level: String,
    pub subject: String,
    pub learning_context: Option<String>,
    pub duration_minutes: Option<String>,
    pub generated_content: String,
    pub prompt_debug: String,
    pub created_at: DateTime<Utc>,
}

/// Parameters for inserting a lesson plan through the `insert_lesson_plan`
/// function.
///
/// Serializes to the function's named parameters (`p_topic`, ...), which is
/// also the JSON body PostgREST expects for the RPC. Absent optional fields
/// serialize as `null`, never as an empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NewLessonPlan<'a> {
    #[serde(rename = "p_topic")]
    pub topic: &'a str,
    #[serde(rename = "p_grade_level")]
    pub grade_level: &'a str,
    #[serde(rename = "p_subject")]
    pub subject: &'a str,
    #[serde(rename = "p_learning_context")]
    pub learning_context: Option<&'a str>,
    #[serde(rename = "p_duration_minutes")]
    pub duration_minutes: Option<&'a str>,
    #[serde(rename = "p_generated_content")]
    pub generated_content: &'a str,
    #[serde(rename = "p_prompt_debug")]
    pub prompt_debug: &'a str,
}

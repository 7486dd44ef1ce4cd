//! Database query functions for the `lesson_plans` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{LessonPlan, NewLessonPlan};

/// Insert a lesson plan by calling the `insert_lesson_plan` function with
/// named parameters. Returns the server-generated id.
pub async fn insert_lesson_plan(pool: &PgPool, new: &NewLessonPlan<'_>) -> Result<Uuid> {
    let id: Uuid = sqlx::query_scalar(
        "SELECT insert_lesson_plan( \
             p_topic => $1, \
             p_grade_level => $2, \
             p_subject => $3, \
             p_learning_context => $4, \
             p_duration_minutes => $5, \
             p_generated_content => $6, \
             p_prompt_debug => $7)",
    )
    .bind(new.topic)
    .bind(new.grade_level)
    .bind(new.subject)
    .bind(new.learning_context)
    .bind(new.duration_minutes)
    .bind(new.generated_content)
    .bind(new.prompt_debug)
    .fetch_one(pool)
    .await
    .context("failed to insert lesson plan")?;

    Ok(id)
}

/// Fetch a lesson plan by its ID.
pub async fn get_lesson_plan(pool: &PgPool, id: Uuid) -> Result<Option<LessonPlan>> {
    let plan = sqlx::query_as::<_, LessonPlan>("SELECT * FROM lesson_plans WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch lesson plan")?;

    Ok(plan)
}

/// Count stored lesson plans.
pub async fn count_lesson_plans(pool: &PgPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lesson_plans")
        .fetch_one(pool)
        .await
        .context("failed to count lesson plans")?;

    Ok(count)
}

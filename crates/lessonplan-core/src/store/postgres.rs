//! Direct Postgres backend for self-hosted deployments.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use lessonplan_db::models::NewLessonPlan;
use lessonplan_db::queries::lesson_plans;

use super::{LessonPlanStore, PersistenceError};

/// Calls the `insert_lesson_plan` function over a sqlx pool.
///
/// The pool connects with service credentials, so the caller credential is
/// not used for authorization here.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LessonPlanStore for PgStore {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn insert(
        &self,
        _credential: &str,
        record: &NewLessonPlan<'_>,
    ) -> Result<String, PersistenceError> {
        let id = lesson_plans::insert_lesson_plan(&self.pool, record)
            .await
            .map_err(PersistenceError::Database)?;
        debug!(%id, "lesson plan inserted");
        Ok(id.to_string())
    }
}

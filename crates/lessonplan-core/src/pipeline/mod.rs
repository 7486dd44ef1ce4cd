//! Request pipeline: validate, prompt, generate, parse, persist, respond.
//!
//! A [`Pipeline`] owns its collaborators and is shared read-only across
//! request handlers. Each call to [`Pipeline::handle`] walks the stages in
//! order and stops at the first failure; nothing is retried.
//!
//! The raw generated text is persisted before the parse outcome is acted on,
//! so a generation that fails the schema is still stored. A persistence
//! failure outranks a parse failure.

mod error;

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::generator::TextGenerator;
use crate::lesson::{
    GeneratedLessonPlan, LessonPlanRequest, build_prompt, parse_lesson_plan, validate_request,
};
use crate::store::{LessonPlanStore, NewLessonPlan};

pub use error::{ErrorKind, PipelineError};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Deployment environment; development adds error details to responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    /// `"development"` (any case) selects development; anything else is
    /// production.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("development") {
            Self::Development
        } else {
            Self::Production
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub environment: Environment,
}

// ---------------------------------------------------------------------------
// Stages and results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Prompting,
    Generating,
    Parsing,
    Persisting,
    Responding,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Validating => "validating",
            Self::Prompting => "prompting",
            Self::Generating => "generating",
            Self::Parsing => "parsing",
            Self::Persisting => "persisting",
            Self::Responding => "responding",
        };
        f.write_str(s)
    }
}

/// Successful response payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LessonPlanResponse {
    pub success: bool,
    pub lesson_plan_id: String,
    pub content: GeneratedLessonPlan,
    pub metadata: ResponseMetadata,
}

/// Echo of the request plus the response timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseMetadata {
    pub topic: String,
    pub grade_level: String,
    pub subject: String,
    pub learning_context: Option<String>,
    pub duration_minutes: Option<String>,
    /// RFC 3339 UTC with millisecond precision.
    pub created_at: String,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct Pipeline {
    config: PipelineConfig,
    generator: Option<Arc<dyn TextGenerator>>,
    store: Arc<dyn LessonPlanStore>,
}

impl Pipeline {
    /// `generator` is `None` when no AI key is configured; requests then
    /// fail with [`PipelineError::MissingApiKey`] after the credential check.
    pub fn new(
        config: PipelineConfig,
        generator: Option<Arc<dyn TextGenerator>>,
        store: Arc<dyn LessonPlanStore>,
    ) -> Self {
        Self {
            config,
            generator,
            store,
        }
    }

    /// Whether error bodies should carry `details`.
    pub fn include_details(&self) -> bool {
        self.config.environment == Environment::Development
    }

    /// Run one request from its raw parts.
    ///
    /// Checks, in order: credential present, generator configured, body is
    /// JSON, fields valid. Then [`Pipeline::run`].
    pub async fn handle(
        &self,
        credential: Option<&str>,
        body: &[u8],
    ) -> Result<LessonPlanResponse, PipelineError> {
        let result = self.handle_inner(credential, body).await;
        if let Err(e) = &result {
            log_failure(e);
        }
        result
    }

    async fn handle_inner(
        &self,
        credential: Option<&str>,
        body: &[u8],
    ) -> Result<LessonPlanResponse, PipelineError> {
        let credential = match credential {
            Some(c) if !c.trim().is_empty() => c,
            _ => return Err(PipelineError::Unauthenticated),
        };
        self.generator()?;

        debug!(stage = %Stage::Validating, "stage");
        let value: Value = serde_json::from_slice(body).map_err(PipelineError::InvalidBody)?;
        let request = validate_request(&value)?;

        self.run_validated(credential, request).await
    }

    /// Run the stages after validation for an already-validated request.
    pub async fn run(
        &self,
        credential: &str,
        request: LessonPlanRequest,
    ) -> Result<LessonPlanResponse, PipelineError> {
        let result = self.run_validated(credential, request).await;
        if let Err(e) = &result {
            log_failure(e);
        }
        result
    }

    async fn run_validated(
        &self,
        credential: &str,
        request: LessonPlanRequest,
    ) -> Result<LessonPlanResponse, PipelineError> {
        let generator = self.generator()?;

        debug!(stage = %Stage::Prompting, topic = %request.topic, "stage");
        let prompt = build_prompt(&request);

        debug!(stage = %Stage::Generating, generator = generator.name(), "stage");
        let raw = generator.generate(&prompt).await?;

        debug!(stage = %Stage::Parsing, raw_len = raw.len(), "stage");
        let parsed = parse_lesson_plan(&raw);
        if let Err(e) = &parsed {
            warn!(error = %e, "generated text failed validation; persisting raw text anyway");
        }

        debug!(stage = %Stage::Persisting, store = self.store.name(), "stage");
        let record = NewLessonPlan {
            topic: &request.topic,
            grade_level: &request.grade_level,
            subject: &request.subject,
            learning_context: request.learning_context.as_deref(),
            duration_minutes: request.duration_minutes.as_deref(),
            generated_content: &raw,
            prompt_debug: &prompt,
        };
        let lesson_plan_id = self
            .store
            .insert(credential, &record)
            .await
            .map_err(PipelineError::Persistence)?;
        info!(%lesson_plan_id, "lesson plan saved");

        let content = parsed?;

        debug!(stage = %Stage::Responding, "stage");
        Ok(LessonPlanResponse {
            success: true,
            lesson_plan_id,
            content,
            metadata: ResponseMetadata {
                topic: request.topic,
                grade_level: request.grade_level,
                subject: request.subject,
                learning_context: request.learning_context,
                duration_minutes: request.duration_minutes,
                created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        })
    }

    fn generator(&self) -> Result<&dyn TextGenerator, PipelineError> {
        self.generator
            .as_deref()
            .ok_or(PipelineError::MissingApiKey)
    }
}

fn log_failure(err: &PipelineError) {
    let kind = err.kind();
    match kind {
        ErrorKind::Auth | ErrorKind::Validation => {
            warn!(%kind, error = %err, "request rejected");
        }
        _ => {
            error!(%kind, error = %err.chain(), "request failed");
        }
    }
}

//! `lessonplan generate`: one pipeline run from the terminal.

use anyhow::{Result, bail};
use serde_json::{Map, Value};

use lessonplan_core::lesson::validate_request;

use crate::config::{LessonplanConfig, StoreBackend};
use crate::setup::Service;

/// Flags of the `generate` command.
#[derive(Debug, Clone)]
pub struct GenerateArgs {
    pub topic: String,
    pub grade_level: String,
    pub subject: String,
    pub learning_context: Option<String>,
    pub duration_minutes: Option<String>,
    pub credential: Option<String>,
}

impl GenerateArgs {
    /// The request body the HTTP surface would receive for these flags.
    fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("topic".into(), Value::String(self.topic.clone()));
        body.insert("grade_level".into(), Value::String(self.grade_level.clone()));
        body.insert("subject".into(), Value::String(self.subject.clone()));
        if let Some(ctx) = &self.learning_context {
            body.insert("learning_context".into(), Value::String(ctx.clone()));
        }
        if let Some(duration) = &self.duration_minutes {
            body.insert("duration_minutes".into(), Value::String(duration.clone()));
        }
        Value::Object(body)
    }
}

/// Credential to hand to the store when `--credential` is absent.
///
/// The rpc store needs an `Authorization` value; the anon key is the
/// weakest one available. The postgres store ignores it.
fn default_credential(config: &LessonplanConfig) -> String {
    match (config.backend, &config.supabase) {
        (StoreBackend::Rpc, Some(supabase)) => format!("Bearer {}", supabase.anon_key),
        _ => "local".to_string(),
    }
}

pub async fn run_generate(config: &LessonplanConfig, args: GenerateArgs) -> Result<()> {
    let request = validate_request(&args.to_body())?;
    let credential = args
        .credential
        .clone()
        .unwrap_or_else(|| default_credential(config));

    let service = Service::connect(config).await?;
    let result = service.pipeline.run(&credential, request).await;
    let include_details = service.pipeline.include_details();
    service.close().await;

    match result {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", serde_json::to_string_pretty(&e.to_body(include_details))?);
            bail!("lesson plan generation failed ({} error)", e.kind());
        }
    }
}

//! Supabase (PostgREST) RPC backend.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use lessonplan_db::models::NewLessonPlan;

use super::{LessonPlanStore, PersistenceError};

/// Name of the database function invoked through `/rest/v1/rpc/`.
pub const INSERT_FUNCTION: &str = "insert_lesson_plan";

/// Project URL and public (anon) key for a Supabase instance.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`.
    pub url: String,
    /// Public anon key, sent as the `apikey` header.
    pub anon_key: String,
}

impl SupabaseConfig {
    pub fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{function}", self.url.trim_end_matches('/'))
    }
}

/// PostgREST error body; only `message` is surfaced.
#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    message: String,
}

/// Calls `insert_lesson_plan` through PostgREST, forwarding the caller's
/// `Authorization` header so row-level security applies to the caller.
pub struct RpcStore {
    client: reqwest::Client,
    config: SupabaseConfig,
}

impl RpcStore {
    pub fn new(config: SupabaseConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

/// Render the function's return value as an identifier.
///
/// A bare JSON string (the usual UUID result) is returned unquoted; any
/// other value keeps its JSON text.
fn identifier_from(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Best-effort error message from a PostgREST error body.
fn rpc_error_message(status: u16, body: &str) -> String {
    if let Ok(err) = serde_json::from_str::<RpcErrorBody>(body) {
        return err.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("store returned status {status}")
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl LessonPlanStore for RpcStore {
    fn name(&self) -> &str {
        "rpc"
    }

    async fn insert(
        &self,
        credential: &str,
        record: &NewLessonPlan<'_>,
    ) -> Result<String, PersistenceError> {
        let url = self.config.rpc_url(INSERT_FUNCTION);

        let resp = self
            .client
            .post(&url)
            .header("apikey", &self.config.anon_key)
            .header(reqwest::header::AUTHORIZATION, credential)
            .json(record)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = rpc_error_message(status.as_u16(), &body);
            warn!(status = status.as_u16(), %message, "rpc insert rejected");
            return Err(PersistenceError::Rejected(message));
        }

        let id = identifier_from(resp.json::<Value>().await?);
        debug!(%id, "lesson plan inserted via rpc");
        Ok(id)
    }
}

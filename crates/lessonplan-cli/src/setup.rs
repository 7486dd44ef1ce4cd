//! Builds a [`Pipeline`] from resolved configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::{info, warn};

use lessonplan_core::generator::{GeminiGenerator, TextGenerator};
use lessonplan_core::pipeline::{Pipeline, PipelineConfig};
use lessonplan_core::store::{LessonPlanStore, PgStore, RpcStore};
use lessonplan_db::pool;

use crate::config::{LessonplanConfig, StoreBackend};

/// A ready pipeline plus the pool it owns, if any.
pub struct Service {
    pub pipeline: Arc<Pipeline>,
    pool: Option<PgPool>,
}

impl Service {
    pub async fn connect(config: &LessonplanConfig) -> Result<Self> {
        let generator: Option<Arc<dyn TextGenerator>> = match &config.gemini {
            Some(gemini) => {
                info!(model = %gemini.model, "using gemini generator");
                let generator = GeminiGenerator::new(gemini.clone())
                    .context("failed to build gemini client")?;
                Some(Arc::new(generator))
            }
            None => {
                warn!("GEMINI_API_KEY not configured; generation requests will fail");
                None
            }
        };

        let (store, pool): (Arc<dyn LessonPlanStore>, Option<PgPool>) = match config.backend {
            StoreBackend::Rpc => {
                let supabase = config.require_supabase()?;
                info!(url = %supabase.url, "using supabase rpc store");
                (Arc::new(RpcStore::new(supabase.clone())), None)
            }
            StoreBackend::Postgres => {
                let pool = pool::create_pool(&config.db_config).await?;
                info!(db = ?config.db_config.database_name(), "using postgres store");
                (Arc::new(PgStore::new(pool.clone())), Some(pool))
            }
        };

        let pipeline = Pipeline::new(
            PipelineConfig {
                environment: config.server.environment,
            },
            generator,
            store,
        );

        Ok(Self {
            pipeline: Arc::new(pipeline),
            pool,
        })
    }

    /// Close the database pool, if one was opened.
    pub async fn close(self) {
        if let Some(pool) = self.pool {
            pool.close().await;
        }
    }
}

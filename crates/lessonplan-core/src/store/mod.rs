//! Persistence gateway for generated lesson plans.
//!
//! The pipeline hands a [`NewLessonPlan`] to a [`LessonPlanStore`] and gets
//! back an opaque identifier. Two backends exist:
//!
//! ```text
//! Pipeline --insert(credential, record)--> &dyn LessonPlanStore
//!                                              |
//!               +------------------------------+---------------------+
//!               |                                                    |
//!          RpcStore                                              PgStore
//!   POST /rest/v1/rpc/insert_lesson_plan              SELECT insert_lesson_plan(...)
//!   (caller credential forwarded)                     (service connection pool)
//! ```

pub mod postgres;
pub mod rpc;

use async_trait::async_trait;
use thiserror::Error;

pub use lessonplan_db::models::NewLessonPlan;
pub use postgres::PgStore;
pub use rpc::{RpcStore, SupabaseConfig};

/// The store refused or failed the write.
///
/// The `Display` output is the store's own message, without prefix.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The store answered and reported an error.
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{0:#}")]
    Database(anyhow::Error),
}

/// Single-purpose capability for persisting a generated lesson plan.
#[async_trait]
pub trait LessonPlanStore: Send + Sync {
    /// Short name for logs (e.g. "rpc", "postgres").
    fn name(&self) -> &str;

    /// Persist `record` on behalf of the caller identified by `credential`
    /// (the inbound `Authorization` header value). Returns the new id.
    async fn insert(
        &self,
        credential: &str,
        record: &NewLessonPlan<'_>,
    ) -> Result<String, PersistenceError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn LessonPlanStore) {}
};

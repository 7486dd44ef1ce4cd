//! The `TextGenerator` trait: prompt in, raw text out.

use async_trait::async_trait;
use thiserror::Error;

/// Upstream failures while generating text.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("AI request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("AI service returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("AI service returned no text")]
    EmptyResponse,
}

/// Single-purpose capability for producing text from a prompt.
///
/// Object-safe so the pipeline can hold an `Arc<dyn TextGenerator>`; tests
/// substitute in-memory implementations. Implementations must not retry.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short name for logs (e.g. "gemini").
    fn name(&self) -> &str;

    /// Generate raw text for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn TextGenerator) {}
};

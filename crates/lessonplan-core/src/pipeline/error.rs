//! Request-level error taxonomy.

use std::error::Error as _;

use serde_json::{Value, json};
use thiserror::Error;

use crate::generator::GenerationError;
use crate::lesson::{ParseError, ValidationError};
use crate::store::PersistenceError;

/// Coarse classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Auth,
    Config,
    Validation,
    Generation,
    Parse,
    Persistence,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Config => "config",
            Self::Validation => "validation",
            Self::Generation => "generation",
            Self::Parse => "parse",
            Self::Persistence => "persistence",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every way a lesson plan request can fail.
///
/// `Display` is the client-facing message placed in the `error` field.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("User not authenticated.")]
    Unauthenticated,

    #[error("GEMINI_API_KEY not configured.")]
    MissingApiKey,

    #[error("Invalid request body (not JSON).")]
    InvalidBody(#[source] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Error saving to database: {0}")]
    Persistence(#[source] PersistenceError),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated => ErrorKind::Auth,
            Self::MissingApiKey => ErrorKind::Config,
            Self::InvalidBody(_) | Self::Validation(_) => ErrorKind::Validation,
            Self::Generation(_) => ErrorKind::Generation,
            Self::Parse(_) => ErrorKind::Parse,
            Self::Persistence(_) => ErrorKind::Persistence,
        }
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Auth => 401,
            ErrorKind::Validation => 400,
            ErrorKind::Config
            | ErrorKind::Generation
            | ErrorKind::Parse
            | ErrorKind::Persistence => 500,
        }
    }

    /// The message followed by each distinct underlying cause, `: `-joined.
    pub fn chain(&self) -> String {
        let mut out = self.to_string();
        let mut source = self.source();
        while let Some(err) = source {
            let text = err.to_string();
            if !out.contains(&text) {
                out.push_str(": ");
                out.push_str(&text);
            }
            source = err.source();
        }
        out
    }

    /// JSON error body. `details` is added only when `include_details` is set.
    pub fn to_body(&self, include_details: bool) -> Value {
        if include_details {
            json!({ "error": self.to_string(), "details": self.chain() })
        } else {
            json!({ "error": self.to_string() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bad_json() -> serde_json::Error {
        serde_json::from_str::<Value>("{not json").unwrap_err()
    }

    #[test]
    fn fixed_messages() {
        assert_eq!(
            PipelineError::Unauthenticated.to_string(),
            "User not authenticated."
        );
        assert_eq!(
            PipelineError::MissingApiKey.to_string(),
            "GEMINI_API_KEY not configured."
        );
        assert_eq!(
            PipelineError::InvalidBody(bad_json()).to_string(),
            "Invalid request body (not JSON)."
        );
    }

    #[test]
    fn validation_message_passes_through() {
        let err = PipelineError::from(ValidationError::MissingField("topic"));
        assert_eq!(err.to_string(), "Field 'topic' is required.");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn persistence_message_is_prefixed() {
        let err = PipelineError::Persistence(PersistenceError::Rejected("disk full".into()));
        assert_eq!(err.to_string(), "Error saving to database: disk full");
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn status_codes_by_kind() {
        assert_eq!(PipelineError::Unauthenticated.status_code(), 401);
        assert_eq!(PipelineError::MissingApiKey.status_code(), 500);
        assert_eq!(PipelineError::InvalidBody(bad_json()).status_code(), 400);
        assert_eq!(
            PipelineError::from(GenerationError::EmptyResponse).status_code(),
            500
        );
        assert_eq!(
            PipelineError::from(ParseError::TooFewSteps(2)).kind(),
            ErrorKind::Parse
        );
    }

    #[test]
    fn body_without_details() {
        let body = PipelineError::Unauthenticated.to_body(false);
        assert_eq!(body, json!({ "error": "User not authenticated." }));
    }

    #[test]
    fn details_carry_the_cause() {
        let body = PipelineError::InvalidBody(bad_json()).to_body(true);
        assert_eq!(body["error"], "Invalid request body (not JSON).");
        let details = body["details"].as_str().unwrap();
        assert!(details.starts_with("Invalid request body (not JSON).: "));
        assert!(details.len() > "Invalid request body (not JSON).: ".len());
    }

    #[test]
    fn chain_skips_repeated_causes() {
        let err = PipelineError::Persistence(PersistenceError::Rejected("disk full".into()));
        assert_eq!(err.chain(), "Error saving to database: disk full");
    }
}

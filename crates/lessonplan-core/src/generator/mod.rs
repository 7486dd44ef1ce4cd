//! Text generation adapters.
//!
//! The pipeline depends only on the [`TextGenerator`] trait; the concrete
//! [`GeminiGenerator`] talks to Google's Generative Language API.

pub mod gemini;
pub mod trait_def;

pub use gemini::{GeminiConfig, GeminiGenerator};
pub use trait_def::{GenerationError, TextGenerator};

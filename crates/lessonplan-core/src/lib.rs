//! Lesson plan generation pipeline.
//!
//! Request validation, prompt construction, AI text generation, schema
//! validation of the generated text, and persistence, sequenced by
//! [`pipeline::Pipeline`].

pub mod generator;
pub mod lesson;
pub mod pipeline;
pub mod store;

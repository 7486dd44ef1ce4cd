//! Persistence layer for generated lesson plans.
//!
//! Owns the Postgres schema (embedded migrations), the connection pool, and
//! the query functions that call the `insert_lesson_plan` database function.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;

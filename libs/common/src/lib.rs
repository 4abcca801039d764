//! Common library for the eco-tracking services
//!
//! This crate provides shared functionality used across the services of the
//! eco-tracking backend: PostgreSQL connectivity, schema migrations and the
//! database error type.

pub mod database;
pub mod error;

pub use database::{DatabaseConfig, health_check, init_pool, run_migrations};
pub use error::{DatabaseError, DatabaseResult};

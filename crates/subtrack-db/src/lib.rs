//! Subtrack Database Layer
//!
//! This crate provides PostgreSQL database access for the Subtrack service:
//!
//! - Connection pool management with sqlx
//! - Embedded schema migrations
//! - The subscription repository, including the period cost aggregation

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use migrations::run_migrations;
pub use pool::create_pool_from_config;
pub use repositories::*;

// Re-export commonly used types
pub use subtrack_core::{AppError, AppResult};
pub use sqlx::PgPool;

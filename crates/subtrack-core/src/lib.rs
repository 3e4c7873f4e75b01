//! Subtrack Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the Subtrack subscription service. It includes:
//!
//! - Domain models (Subscription, CostFilter, TotalCost)
//! - Month-year date handling used at the API boundary
//! - The repository trait implemented by the persistence layer
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

//! Business logic services for Subtrack
//!
//! This crate contains the use-case layer that sits between the HTTP
//! handlers and the repositories.
//!
//! # Architecture
//!
//! - Services own their repository behind an `Arc<dyn SubscriptionRepository>`
//! - All operations are instrumented with tracing, carrying an `op` field
//!   plus the identifiers the operation works on
//! - Storage errors never leave this crate: they are translated into
//!   [`ServiceError`]
//!
//! # Services
//!
//! - `SubscriptionService` - subscription CRUD and period cost aggregation

pub mod error;
pub mod subscription_service;

pub use error::ServiceError;
pub use subscription_service::SubscriptionService;

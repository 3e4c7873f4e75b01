//! API layer for Subtrack
//!
//! HTTP handlers, request/response DTOs and route configuration for the
//! subscription service.

#![forbid(unsafe_code)]

pub mod dto;
pub mod handlers;

pub use dto::{SubscriptionResponse, TotalCostResponse};
pub use handlers::{configure, json_config, query_config};

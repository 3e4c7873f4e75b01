//! HTTP request handlers

pub mod health;
pub mod subscription;

use actix_web::web;
use subtrack_core::AppError;

use crate::dto::{INVALID_BODY, INVALID_QUERY};

pub use health::configure as configure_health;
pub use subscription::configure as configure_subscriptions;

/// JSON extractor settings: body size limit and a `400 invalid request body`
/// for anything that fails to decode
pub fn json_config(max_payload_bytes: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(max_payload_bytes)
        .error_handler(|err, _req| {
            tracing::warn!("Rejected request body: {}", err);
            AppError::InvalidInput(INVALID_BODY.to_string()).into()
        })
}

/// Query extractor settings
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        tracing::warn!("Rejected query string: {}", err);
        AppError::InvalidInput(INVALID_QUERY.to_string()).into()
    })
}

/// Register every route of the API
pub fn configure(cfg: &mut web::ServiceConfig) {
    configure_health(cfg);
    configure_subscriptions(cfg);
}

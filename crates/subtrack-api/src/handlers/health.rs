//! Health check handler

use crate::dto::HealthResponse;
use actix_web::{web, HttpResponse};

/// Liveness check
///
/// GET /health
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse::healthy())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

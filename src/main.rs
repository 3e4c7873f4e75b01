//! Subtrack Server
//!
//! REST service for tracking user subscriptions and the cost they add up to
//! over a period of months.

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};
use anyhow::Context;
use subtrack_core::config::{CorsConfig, LogFormat, LoggingConfig};
use subtrack_core::AppConfig;
use subtrack_db::{create_pool_from_config, run_migrations, PgSubscriptionRepository};
use subtrack_services::SubscriptionService;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(config: &LoggingConfig) {
    let level = &config.level;
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "subtrack={level},subtrack_api={level},subtrack_services={level},\
             subtrack_db={level},subtrack_core={level},actix_web=info,sqlx=warn"
        ))
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init(),
    }
}

/// Build the CORS middleware; only listed origins are allowed
fn build_cors(config: &CorsConfig) -> Cors {
    let cors = config
        .origins()
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin));

    cors.allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(&config.logging);

    info!("Starting Subtrack v{}", env!("CARGO_PKG_VERSION"));
    info!(
        server = ?config.server,
        database = ?config.database,
        cors_origins = ?config.cors.origins(),
        "Configuration loaded"
    );

    let pool = create_pool_from_config(&config.database)
        .await
        .context("Failed to create database pool")?;

    if config.database.run_migrations {
        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
    } else {
        warn!("Skipping database migrations");
    }

    let repository = Arc::new(PgSubscriptionRepository::new(pool.clone()));
    let service = web::Data::new(SubscriptionService::new(repository));

    let bind_addr = config.server_addr();
    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, config.server.workers
    );

    let cors_config = config.cors.clone();
    let max_payload = config.server.max_payload_bytes;

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(subtrack_api::json_config(max_payload))
            .app_data(subtrack_api::query_config())
            .wrap(build_cors(&cors_config))
            .wrap(TracingLogger::default())
            .configure(subtrack_api::configure)
    })
    .workers(config.server.workers)
    .keep_alive(Duration::from_secs(config.server.keep_alive_secs))
    .client_request_timeout(Duration::from_secs(config.server.client_request_timeout_secs))
    .shutdown_timeout(config.server.shutdown_timeout_secs)
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await
    .context("HTTP server error")?;

    info!("HTTP server stopped, closing database pool");
    pool.close().await;
    info!("Shutdown complete");

    Ok(())
}

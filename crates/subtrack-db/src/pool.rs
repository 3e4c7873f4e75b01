//! PostgreSQL connection pool management
//!
//! Provides utilities for creating and managing database connection pools.

use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;
use subtrack_core::config::DatabaseConfig;
use subtrack_core::{AppError, AppResult};
use tracing::{info, warn};

/// Create a connection pool with sizing and timeouts taken from configuration
///
/// # Example
///
/// ```no_run
/// use subtrack_core::AppConfig;
/// use subtrack_db::create_pool_from_config;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = AppConfig::load()?;
///     let pool = create_pool_from_config(&config.database).await?;
///     Ok(())
/// }
/// ```
pub async fn create_pool_from_config(config: &DatabaseConfig) -> AppResult<PgPool> {
    info!(
        host = %config.host,
        database = %config.name,
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Creating database connection pool"
    );

    let options = connect_options(config)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .max_lifetime(Some(Duration::from_secs(config.max_lifetime_secs)))
        .idle_timeout(Some(Duration::from_secs(config.idle_timeout_secs)))
        .test_before_acquire(true)
        .connect_with(options)
        .await
        .map_err(|e| {
            warn!("Failed to create database pool: {}", e);
            AppError::Pool(format!("Failed to connect to database: {}", e))
        })?;

    verify(&pool).await?;

    info!("Database pool created successfully");

    Ok(pool)
}

/// Build connection options from either the URL or the discrete fields
pub fn connect_options(config: &DatabaseConfig) -> AppResult<PgConnectOptions> {
    if let Some(url) = config.url.as_deref().filter(|u| !u.is_empty()) {
        return PgConnectOptions::from_str(url)
            .map_err(|e| AppError::Config(format!("Invalid database url: {}", e)));
    }

    let ssl_mode = PgSslMode::from_str(&config.ssl_mode)
        .map_err(|e| AppError::Config(format!("Invalid ssl_mode {}: {}", config.ssl_mode, e)))?;

    Ok(PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.name)
        .ssl_mode(ssl_mode))
}

async fn verify(pool: &PgPool) -> AppResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(|e| AppError::Database(format!("Database health check failed: {}", e)))?;

    info!("Database connection verified");
    Ok(())
}

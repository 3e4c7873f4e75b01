//! Embedded schema migrations

use sqlx::migrate::Migrator;
use sqlx::PgPool;
use subtrack_core::{AppError, AppResult};
use tracing::{error, info};

/// Migrations compiled into the binary from `crates/subtrack-db/migrations`
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Apply all pending migrations
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    info!("Running database migrations");

    MIGRATOR.run(pool).await.map_err(|e| {
        error!("Migration failed: {}", e);
        AppError::Migration(e.to_string())
    })?;

    info!("Database schema is up to date");
    Ok(())
}

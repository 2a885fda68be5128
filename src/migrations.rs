//! Database migrations using the sqlx built-in migration system.
//!
//! Migrations live in the `migrations/` directory as `NNNN_description.sql`
//! files and are embedded at compile time.

use sqlx::SqlitePool;
use sqlx::migrate::Migrator;

use crate::errors::{BotError, BotResult};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn run_migrations(pool: &SqlitePool) -> BotResult<()> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| BotError::general(format!("Failed to run migrations: {}", e)))?;

    log::info!("Database migrations completed");
    Ok(())
}

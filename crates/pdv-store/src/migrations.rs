//! # Schema Migrations
//!
//! SQL files under `crates/pdv-store/migrations/` are compiled into the
//! binary and applied in filename order when a [`crate::Database`] opens.
//! Applied versions and checksums live in `_sqlx_migrations`.
//!
//! New schema goes in a new `NNN_description.sql`; an applied file is never
//! edited, since its checksum would no longer match.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::StoreResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Applies whatever has not been applied yet.
pub async fn run_migrations(pool: &SqlitePool) -> StoreResult<()> {
    debug!(embedded = MIGRATOR.migrations.len(), "Applying store migrations");
    MIGRATOR.run(pool).await?;
    info!("Store schema up to date");
    Ok(())
}

/// `(embedded, applied)` migration counts.
pub async fn migration_status(pool: &SqlitePool) -> StoreResult<(usize, usize)> {
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((MIGRATOR.migrations.len(), applied as usize))
}

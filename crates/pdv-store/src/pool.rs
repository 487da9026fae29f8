//! # Database Handle
//!
//! Opens the checkout's SQLite file and hands out typed repositories.
//!
//! ```text
//! [store] database_path ──► DbConfig ──► Database::new
//!                                            │
//!                     connect_options()  ────┤  WAL, synchronous=NORMAL,
//!                                            │  foreign keys, busy timeout
//!                     pool_options()     ────┤  1 connection for ":memory:"
//!                                            │
//!                     run_migrations()   ────┘  unless disabled
//!
//! db.records::<CatalogEntry>() / ::<SaleRecord>() / ::<HeldSale>()
//!     └── SqliteRepository sharing the one pool
//! ```

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::migrations;
use crate::repository::{Record, SqliteRepository};

const IN_MEMORY: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// How to open the store.
///
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/pdv/pdv.db").max_connections(2);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, or `":memory:"`. Created if missing.
    pub database_path: PathBuf,

    /// Default 4. A single terminal rarely needs more.
    pub max_connections: u32,

    pub min_connections: u32,

    /// How long to wait for a free connection.
    pub connect_timeout: Duration,

    pub idle_timeout: Duration,

    /// Apply pending migrations on open. Default true.
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 4,
            min_connections: 1,
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// A throwaway store that lives as long as the pool.
    pub fn in_memory() -> Self {
        DbConfig::new(IN_MEMORY).connect_timeout(Duration::from_secs(5))
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY
    }

    fn connect_options(&self) -> StoreResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .create_if_missing(true)
        };

        Ok(options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5)))
    }

    fn pool_options(&self) -> SqlitePoolOptions {
        // Each connection to ":memory:" would see its own empty database.
        let max = if self.is_in_memory() {
            1
        } else {
            self.max_connections.max(1)
        };

        SqlitePoolOptions::new()
            .max_connections(max)
            .min_connections(self.min_connections.min(max))
            .acquire_timeout(self.connect_timeout)
            .idle_timeout(Some(self.idle_timeout))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Open store. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the store and applies migrations.
    pub async fn new(config: DbConfig) -> StoreResult<Self> {
        info!(path = %config.database_path.display(), "Opening checkout store");

        let pool = config
            .pool_options()
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        debug!(
            in_memory = config.is_in_memory(),
            max_connections = config.max_connections,
            "Store pool ready"
        );

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    pub async fn run_migrations(&self) -> StoreResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Repository for one record kind, e.g. `db.records::<CatalogEntry>()`.
    pub fn records<T: Record>(&self) -> SqliteRepository<T> {
        SqliteRepository::new(self.pool.clone())
    }

    pub async fn close(&self) {
        info!("Closing checkout store");
        self.pool.close().await;
    }

    /// True if a trivial query succeeds.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        let (total, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
    }

    #[tokio::test]
    async fn test_file_is_created_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pdv.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert!(db.health_check().await);
        db.close().await;

        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_reopen_keeps_records() {
        use crate::repository::Repository;
        use pdv_core::{CatalogEntry, Money};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pdv.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let entry = CatalogEntry::new("1", "789", "Cafe", Money::from_cents(1849), 3).unwrap();
        db.records::<CatalogEntry>().put(&entry).await.unwrap();
        db.close().await;

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(db.records::<CatalogEntry>().get("1").await.unwrap(), Some(entry));
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/pdv.db")
            .max_connections(8)
            .min_connections(2)
            .run_migrations(false);

        assert_eq!(config.max_connections, 8);
        assert_eq!(config.min_connections, 2);
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }
}

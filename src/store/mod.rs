//! # Local Record Store
//!
//! Durable, keyed, multi-collection persistence for the field device,
//! backed by SQLite via sqlx. This is the only component that persists
//! state; every other part of the crate goes through it.
//!
//! ## Collections
//!
//! - `clients` - read-only snapshot of server client records
//! - `payments` - every collection event, never deleted (audit trail)
//! - `config` - singleton-per-key settings, last-write-wins
//! - `sync_queue` - outbox entries awaiting server delivery
//! - `tickets` - append-only log of every rendered receipt
//!
//! ## Key Components
//!
//! - `LocalStore`: connection pool, schema bootstrap and migrations
//! - `clients.rs`: snapshot replacement and lookups
//! - `payments.rs`: atomic capture (payment + outbox in one transaction)
//! - `queue.rs`: outbox reads, delivery confirmation, retry bookkeeping
//! - `settings.rs`: config key/value and typed helpers
//! - `tickets.rs`: ticket log append and queries
//!
//! Multi-step operations (capture payment + enqueue outbox entry) are
//! wrapped in a single SQLite transaction so partial application is
//! impossible; `requeue_orphans` is the startup sweep that repairs any
//! payment left without a queue entry by an older build.

pub mod clients;
pub mod payments;
pub mod queue;
pub mod schema;
pub mod settings;
pub mod tickets;

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::StoreError;

/// Result type for local store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Local store connection manager.
///
/// Owns the SQLite connection pool; all collection operations hang off
/// this struct, split across the per-collection files of this module.
#[derive(Debug, Clone)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    /// Open or create the local database at `path`.
    ///
    /// Creates the file and parent directory if missing, enables WAL mode
    /// and initializes the schema. Fails with `StoreError::Unavailable`
    /// if the backing store cannot be opened.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::unavailable(format!("{}: {}", parent.display(), e)))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(options).await?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Open an in-memory database (tests and throwaway sessions).
    ///
    /// Limited to one connection: every pooled connection would otherwise
    /// get its own empty in-memory database.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::unavailable(e.to_string()))?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Initialize database schema and run pending migrations
    async fn init_schema(&self) -> Result<()> {
        sqlx::query("PRAGMA synchronous=NORMAL")
            .execute(&self.pool)
            .await?;
        sqlx::query("PRAGMA temp_store=MEMORY")
            .execute(&self.pool)
            .await?;

        sqlx::raw_sql(include_str!("schema.sql"))
            .execute(&self.pool)
            .await?;

        self.run_migrations().await?;
        Ok(())
    }

    /// Apply any schema migrations newer than the recorded version
    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        let current: (i32,) =
            sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
                .fetch_one(&self.pool)
                .await?;

        for version in schema::pending_migrations(current.0) {
            // Schema v1 is fully covered by schema.sql; later versions
            // add their ALTERs here before the version stamp.
            sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?, ?)")
                .bind(version)
                .bind(chrono::Utc::now().to_rfc3339())
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }

    /// Get connection pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Per-collection record counts, for diagnostics
    pub async fn stats(&self) -> Result<StoreStats> {
        let clients: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM clients")
            .fetch_one(&self.pool)
            .await?;
        let payments: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM payments")
            .fetch_one(&self.pool)
            .await?;
        let pending_queue: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sync_queue")
            .fetch_one(&self.pool)
            .await?;
        let tickets: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tickets")
            .fetch_one(&self.pool)
            .await?;

        Ok(StoreStats {
            clients: clients.0 as u64,
            payments: payments.0 as u64,
            pending_queue: pending_queue.0 as u64,
            tickets: tickets.0 as u64,
        })
    }
}

/// Record counts per collection
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub clients: u64,
    pub payments: u64,
    pub pending_queue: u64,
    pub tickets: u64,
}

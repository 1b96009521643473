//! # Config Key/Value Operations
//!
//! Singleton-per-key settings with last-write-wins semantics, plus typed
//! helpers for the values the rest of the crate cares about: the ticket
//! layout configuration and the sync bookkeeping timestamps.

use sqlx::Row;

use crate::store::{LocalStore, Result};
use crate::ticket::TicketConfig;

/// Config key holding the JSON ticket layout configuration
pub const TICKET_CONFIG_KEY: &str = "ticket";

/// Config key holding the last successful drain timestamp
pub const LAST_SYNC_KEY: &str = "last_sync_time";

/// Config key holding the last client snapshot download timestamp
pub const LAST_SNAPSHOT_KEY: &str = "last_snapshot_time";

impl LocalStore {
    /// Set a config value, overwriting any previous one
    pub async fn set_config(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO config (key, value, updated_at)
             VALUES (?, ?, ?)",
        )
        .bind(key)
        .bind(value)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// Get a config value
    pub async fn get_config(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM config WHERE key = ?")
            .bind(key)
            .fetch_optional(self.pool())
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("value").map_err(|e| {
                crate::error::StoreError::unavailable(e.to_string())
            })?)),
            None => Ok(None),
        }
    }

    /// The active ticket configuration; defaults when never configured
    pub async fn ticket_config(&self) -> Result<TicketConfig> {
        match self.get_config(TICKET_CONFIG_KEY).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(TicketConfig::default()),
        }
    }

    /// Persist the ticket configuration
    pub async fn set_ticket_config(&self, config: &TicketConfig) -> Result<()> {
        let json = serde_json::to_string(config)?;
        self.set_config(TICKET_CONFIG_KEY, &json).await
    }

    /// Timestamp of the last completed drain pass
    pub async fn last_sync_time(&self) -> Result<Option<String>> {
        self.get_config(LAST_SYNC_KEY).await
    }

    /// Stamp the last completed drain pass at now
    pub async fn set_last_sync_time(&self) -> Result<()> {
        self.set_config(LAST_SYNC_KEY, &chrono::Utc::now().to_rfc3339())
            .await
    }

    /// Timestamp of the last client snapshot download
    pub async fn last_snapshot_time(&self) -> Result<Option<String>> {
        self.get_config(LAST_SNAPSHOT_KEY).await
    }

    /// Stamp the last client snapshot download at now
    pub async fn set_last_snapshot_time(&self) -> Result<()> {
        self.set_config(LAST_SNAPSHOT_KEY, &chrono::Utc::now().to_rfc3339())
            .await
    }
}

//! # Client Snapshot Operations
//!
//! The clients collection is a read-only cache of server records. It is
//! never partially merged: `replace_all_clients` clears and repopulates
//! the whole collection in one transaction, and nothing else writes to it.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::error::StoreError;
use crate::model::ClientSnapshot;
use crate::store::{LocalStore, Result};

impl LocalStore {
    /// Atomically clear and repopulate the client snapshot.
    pub async fn replace_all_clients(&self, records: &[ClientSnapshot]) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM clients").execute(&mut *tx).await?;

        for client in records {
            sqlx::query(
                "INSERT INTO clients (
                    code, name, phone, address, balance, overdue_days, late_fee, collector_code
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&client.code)
            .bind(&client.name)
            .bind(&client.phone)
            .bind(&client.address)
            .bind(client.balance)
            .bind(client.overdue_days)
            .bind(client.late_fee)
            .bind(&client.collector_code)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Look up one client by its unique code
    pub async fn get_client(&self, code: &str) -> Result<Option<ClientSnapshot>> {
        let row = sqlx::query(
            "SELECT code, name, phone, address, balance, overdue_days, late_fee, collector_code
             FROM clients WHERE code = ?",
        )
        .bind(code)
        .fetch_optional(self.pool())
        .await?;

        match row {
            Some(row) => Ok(Some(row_to_client(&row)?)),
            None => Ok(None),
        }
    }

    /// All clients assigned to one collector, ordered by name
    pub async fn clients_for_collector(&self, collector_code: &str) -> Result<Vec<ClientSnapshot>> {
        let rows = sqlx::query(
            "SELECT code, name, phone, address, balance, overdue_days, late_fee, collector_code
             FROM clients WHERE collector_code = ? ORDER BY name ASC",
        )
        .bind(collector_code)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(row_to_client).collect()
    }

    /// Name substring search over the snapshot
    pub async fn search_clients(&self, query: &str) -> Result<Vec<ClientSnapshot>> {
        let pattern = format!("%{}%", query.to_lowercase());
        let rows = sqlx::query(
            "SELECT code, name, phone, address, balance, overdue_days, late_fee, collector_code
             FROM clients WHERE LOWER(name) LIKE ? ORDER BY name ASC",
        )
        .bind(&pattern)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(row_to_client).collect()
    }
}

fn row_to_client(row: &SqliteRow) -> Result<ClientSnapshot> {
    let map = |e: sqlx::Error| StoreError::unavailable(e.to_string());
    Ok(ClientSnapshot {
        code: row.try_get("code").map_err(map)?,
        name: row.try_get("name").map_err(map)?,
        phone: row.try_get("phone").map_err(map)?,
        address: row.try_get("address").map_err(map)?,
        balance: row.try_get("balance").map_err(map)?,
        overdue_days: row.try_get("overdue_days").map_err(map)?,
        late_fee: row.try_get("late_fee").map_err(map)?,
        collector_code: row.try_get("collector_code").map_err(map)?,
    })
}

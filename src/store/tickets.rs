//! # Ticket Log Operations
//!
//! Append-only log of every rendered receipt. Entries are written before
//! any transport attempt; the only mutation is flipping `printed`.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::error::StoreError;
use crate::model::TicketLogEntry;
use crate::store::{LocalStore, Result};

impl LocalStore {
    /// Append a rendered receipt body; returns the assigned local id
    pub async fn append_ticket(&self, client_code: &str, body: &str) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO tickets (client_code, body, printed, created_at)
             VALUES (?, ?, 0, ?)",
        )
        .bind(client_code)
        .bind(body)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(self.pool())
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Fetch one ticket for reprint/audit
    pub async fn get_ticket(&self, id: i64) -> Result<Option<TicketLogEntry>> {
        let row = sqlx::query(
            "SELECT id, client_code, body, printed, created_at
             FROM tickets WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        match row {
            Some(row) => Ok(Some(row_to_ticket(&row)?)),
            None => Ok(None),
        }
    }

    /// All tickets for one client, newest first
    pub async fn tickets_for_client(&self, client_code: &str) -> Result<Vec<TicketLogEntry>> {
        let rows = sqlx::query(
            "SELECT id, client_code, body, printed, created_at
             FROM tickets WHERE client_code = ? ORDER BY created_at DESC",
        )
        .bind(client_code)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(row_to_ticket).collect()
    }

    /// Tickets rendered on one calendar day (`YYYY-MM-DD`), oldest first
    pub async fn tickets_on_date(&self, date: &str) -> Result<Vec<TicketLogEntry>> {
        let pattern = format!("{}%", date);
        let rows = sqlx::query(
            "SELECT id, client_code, body, printed, created_at
             FROM tickets WHERE created_at LIKE ? ORDER BY created_at ASC",
        )
        .bind(&pattern)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(row_to_ticket).collect()
    }

    /// Flip `printed` once the receipt reached a print surface
    pub async fn mark_ticket_printed(&self, id: i64) -> Result<()> {
        let result = sqlx::query("UPDATE tickets SET printed = 1 WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("tickets", id));
        }
        Ok(())
    }
}

fn row_to_ticket(row: &SqliteRow) -> Result<TicketLogEntry> {
    let map = |e: sqlx::Error| StoreError::unavailable(e.to_string());
    Ok(TicketLogEntry {
        id: row.try_get("id").map_err(map)?,
        client_code: row.try_get("client_code").map_err(map)?,
        body: row.try_get("body").map_err(map)?,
        printed: row.try_get("printed").map_err(map)?,
        created_at: row.try_get("created_at").map_err(map)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_and_fetch() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let id = store.append_ticket("C-001", "RECIBO DE PAGO").await.unwrap();

        let ticket = store.get_ticket(id).await.unwrap().unwrap();
        assert_eq!(ticket.body, "RECIBO DE PAGO");
        assert!(!ticket.printed);
    }

    #[tokio::test]
    async fn test_mark_printed() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let id = store.append_ticket("C-001", "RECIBO").await.unwrap();

        store.mark_ticket_printed(id).await.unwrap();
        assert!(store.get_ticket(id).await.unwrap().unwrap().printed);

        let err = store.mark_ticket_printed(999).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_client_query() {
        let store = LocalStore::open_in_memory().await.unwrap();
        store.append_ticket("C-001", "uno").await.unwrap();
        store.append_ticket("C-002", "dos").await.unwrap();
        store.append_ticket("C-001", "tres").await.unwrap();

        let tickets = store.tickets_for_client("C-001").await.unwrap();
        assert_eq!(tickets.len(), 2);

        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
        assert_eq!(store.tickets_on_date(&today).await.unwrap().len(), 3);
    }
}

// ABOUTME: Quote storage layer using SQLite
// ABOUTME: CRUD, the fulfillment write, and provider count queries

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use procura_core::PageRequest;
use procura_storage::{StorageError, StorageResult};

use crate::types::{Quote, QuoteStatus};

/// Insert payload for a new quote
#[derive(Debug, Clone)]
pub struct NewQuote {
    pub created_by: i64,
    pub demand_id: i64,
    pub total_amount: f64,
}

pub struct QuoteStorage {
    pool: SqlitePool,
}

impl QuoteStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn create(&self, new: NewQuote) -> StorageResult<Quote> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO quotes (created_by, created_at, total_amount, status, demand_id, fulfillment_file)
            VALUES (?, ?, ?, ?, ?, NULL)
            "#,
        )
        .bind(new.created_by)
        .bind(now.to_rfc3339())
        .bind(new.total_amount)
        .bind(QuoteStatus::Created.as_str())
        .bind(new.demand_id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        let id = result.last_insert_rowid();
        debug!("Created quote {} against demand {}", id, new.demand_id);

        self.find_by_id(id)
            .await?
            .ok_or_else(|| StorageError::not_found("Quote", id))
    }

    pub async fn find_by_id(&self, id: i64) -> StorageResult<Option<Quote>> {
        let row = sqlx::query("SELECT * FROM quotes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.map(|r| row_to_quote(&r)).transpose()
    }

    /// List quotes newest first
    pub async fn list(&self, params: &PageRequest) -> StorageResult<(Vec<Quote>, i64)> {
        let (limit, offset) = params.validate();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotes")
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let rows = sqlx::query("SELECT * FROM quotes ORDER BY id DESC LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let quotes = rows
            .iter()
            .map(row_to_quote)
            .collect::<StorageResult<Vec<_>>>()?;

        Ok((quotes, count))
    }

    /// Amend the offer amount; review restarts from CREATED
    pub async fn update_amount(&self, id: i64, total_amount: f64) -> StorageResult<()> {
        let result = sqlx::query("UPDATE quotes SET total_amount = ?, status = ? WHERE id = ?")
            .bind(total_amount)
            .bind(QuoteStatus::Created.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Quote", id));
        }

        Ok(())
    }

    pub async fn count_by_creator(&self, user_id: i64) -> StorageResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotes WHERE created_by = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(count)
    }

    pub async fn count_by_creator_in_status(
        &self,
        user_id: i64,
        status: QuoteStatus,
    ) -> StorageResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM quotes WHERE created_by = ? AND status = ?",
        )
        .bind(user_id)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(count)
    }
}

/// Status write on a caller-owned connection, for transactional composition
pub async fn set_status_in(
    conn: &mut SqliteConnection,
    id: i64,
    status: QuoteStatus,
) -> StorageResult<()> {
    let result = sqlx::query("UPDATE quotes SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id)
        .execute(conn)
        .await
        .map_err(StorageError::Sqlx)?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("Quote", id));
    }

    Ok(())
}

/// Fulfillment write: DONE plus the fulfillment document reference
pub async fn fulfill_in(
    conn: &mut SqliteConnection,
    id: i64,
    fulfillment_file: Option<&str>,
) -> StorageResult<()> {
    let result = sqlx::query("UPDATE quotes SET status = ?, fulfillment_file = ? WHERE id = ?")
        .bind(QuoteStatus::Done.as_str())
        .bind(fulfillment_file)
        .bind(id)
        .execute(conn)
        .await
        .map_err(StorageError::Sqlx)?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("Quote", id));
    }

    Ok(())
}

fn row_to_quote(row: &SqliteRow) -> StorageResult<Quote> {
    let status_str: String = row.try_get("status")?;
    let status = status_str
        .parse::<QuoteStatus>()
        .map_err(StorageError::Database)?;

    let created_at_str: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|_| StorageError::Database("Invalid created_at timestamp".to_string()))?
        .with_timezone(&Utc);

    Ok(Quote {
        id: row.try_get("id")?,
        created_by: row.try_get("created_by")?,
        created_at,
        total_amount: row.try_get("total_amount")?,
        status,
        demand_id: row.try_get("demand_id")?,
        fulfillment_file: row.try_get("fulfillment_file")?,
    })
}

// ABOUTME: Demand storage layer using SQLite
// ABOUTME: Transactional demand/article writes, lookups, and count queries

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use procura_core::PageRequest;
use procura_storage::{StorageError, StorageResult};

use crate::types::{Article, ArticleEntry, Demand, DemandStatus, DemandUpdateInput, QuoteSummary};

/// Insert payload for a new demand
#[derive(Debug, Clone)]
pub struct NewDemand {
    pub title: String,
    pub description: String,
    pub status: DemandStatus,
    pub created_by: i64,
    pub attached_file: Option<String>,
}

pub struct DemandStorage {
    pool: SqlitePool,
}

impl DemandStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert a demand together with its articles in one transaction
    pub async fn create(&self, new: NewDemand, articles: &[ArticleEntry]) -> StorageResult<Demand> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        let result = sqlx::query(
            r#"
            INSERT INTO demands (title, description, status, created_by, created_at, attached_file)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.status.as_str())
        .bind(new.created_by)
        .bind(now.to_rfc3339())
        .bind(&new.attached_file)
        .execute(&mut *tx)
        .await
        .map_err(StorageError::Sqlx)?;

        let demand_id = result.last_insert_rowid();

        for article in articles {
            sqlx::query(
                r#"
                INSERT INTO articles (name, description, quantity, price, demand_id)
                VALUES (?, ?, ?, NULL, ?)
                "#,
            )
            .bind(&article.name)
            .bind(&article.description)
            .bind(article.quantity)
            .bind(demand_id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;
        }

        tx.commit().await.map_err(StorageError::Sqlx)?;

        debug!(
            "Created demand {} ({}) with {} articles",
            demand_id,
            new.title,
            articles.len()
        );

        self.find_by_id(demand_id)
            .await?
            .ok_or_else(|| StorageError::not_found("Demand", demand_id))
    }

    pub async fn find_by_id(&self, id: i64) -> StorageResult<Option<Demand>> {
        let row = sqlx::query("SELECT * FROM demands WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.map(|r| row_to_demand(&r)).transpose()
    }

    pub async fn exists(&self, id: i64) -> StorageResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM demands WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(count > 0)
    }

    /// List demands newest first
    pub async fn list(&self, params: &PageRequest) -> StorageResult<(Vec<Demand>, i64)> {
        let (limit, offset) = params.validate();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM demands")
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let rows = sqlx::query("SELECT * FROM demands ORDER BY id DESC LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let demands = rows
            .iter()
            .map(row_to_demand)
            .collect::<StorageResult<Vec<_>>>()?;

        Ok((demands, count))
    }

    /// Rewrite title/description and upsert articles in one transaction.
    /// An entry without an id inserts a new article; an entry with an id
    /// patches the existing article, which must belong to this demand.
    pub async fn update(&self, input: &DemandUpdateInput) -> StorageResult<()> {
        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        let updated = sqlx::query("UPDATE demands SET title = ?, description = ? WHERE id = ?")
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;

        if updated.rows_affected() == 0 {
            return Err(StorageError::not_found("Demand", input.id));
        }

        for article in &input.articles {
            match article.id {
                None => {
                    sqlx::query(
                        r#"
                        INSERT INTO articles (name, description, quantity, price, demand_id)
                        VALUES (?, ?, ?, NULL, ?)
                        "#,
                    )
                    .bind(&article.name)
                    .bind(&article.description)
                    .bind(article.quantity)
                    .bind(input.id)
                    .execute(&mut *tx)
                    .await
                    .map_err(StorageError::Sqlx)?;
                }
                Some(article_id) => {
                    let patched = sqlx::query(
                        r#"
                        UPDATE articles SET name = ?, description = ?, quantity = ?
                        WHERE id = ? AND demand_id = ?
                        "#,
                    )
                    .bind(&article.name)
                    .bind(&article.description)
                    .bind(article.quantity)
                    .bind(article_id)
                    .bind(input.id)
                    .execute(&mut *tx)
                    .await
                    .map_err(StorageError::Sqlx)?;

                    if patched.rows_affected() == 0 {
                        return Err(StorageError::not_found("Article", article_id));
                    }
                }
            }
        }

        tx.commit().await.map_err(StorageError::Sqlx)?;

        debug!("Updated demand {}", input.id);
        Ok(())
    }

    /// Force-set a status outside any validation rule, on the shared pool
    pub async fn set_status(&self, id: i64, status: DemandStatus) -> StorageResult<()> {
        let mut conn = self.pool.acquire().await.map_err(StorageError::Sqlx)?;
        force_status(&mut conn, id, status).await
    }

    pub async fn fetch_articles(&self, demand_id: i64) -> StorageResult<Vec<Article>> {
        let rows = sqlx::query("SELECT * FROM articles WHERE demand_id = ? ORDER BY id ASC")
            .bind(demand_id)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_article).collect()
    }

    pub async fn fetch_quote_summaries(&self, demand_id: i64) -> StorageResult<Vec<QuoteSummary>> {
        let rows = sqlx::query(
            "SELECT id, total_amount, status, created_at, created_by
             FROM quotes WHERE demand_id = ? ORDER BY id ASC",
        )
        .bind(demand_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        rows.iter()
            .map(|row| {
                let created_at_str: String = row.try_get("created_at")?;
                let created_at = DateTime::parse_from_rfc3339(&created_at_str)
                    .map_err(|_| {
                        StorageError::Database("Invalid created_at timestamp".to_string())
                    })?
                    .with_timezone(&Utc);

                Ok(QuoteSummary {
                    id: row.try_get("id")?,
                    total_amount: row.try_get("total_amount")?,
                    status: row.try_get("status")?,
                    created_at,
                    created_by: row.try_get("created_by")?,
                })
            })
            .collect()
    }

    pub async fn count_by_creator(&self, user_id: i64) -> StorageResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM demands WHERE created_by = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(count)
    }

    pub async fn count_by_creator_in_statuses(
        &self,
        user_id: i64,
        statuses: &[DemandStatus],
    ) -> StorageResult<i64> {
        let placeholders = vec!["?"; statuses.len()].join(", ");
        let query = format!(
            "SELECT COUNT(*) FROM demands WHERE created_by = ? AND status IN ({placeholders})"
        );

        let mut q = sqlx::query_scalar(&query).bind(user_id);
        for status in statuses {
            q = q.bind(status.as_str());
        }

        let count: i64 = q.fetch_one(&self.pool).await.map_err(StorageError::Sqlx)?;
        Ok(count)
    }

    pub async fn count_in_status(&self, status: DemandStatus) -> StorageResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM demands WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(count)
    }
}

/// Privileged status write on a caller-owned connection. The quote engine
/// uses this to close the parent demand inside its own fulfillment
/// transaction.
pub async fn force_status(
    conn: &mut SqliteConnection,
    id: i64,
    status: DemandStatus,
) -> StorageResult<()> {
    let result = sqlx::query("UPDATE demands SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id)
        .execute(conn)
        .await
        .map_err(StorageError::Sqlx)?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("Demand", id));
    }

    debug!("Demand {} status forced to {}", id, status);
    Ok(())
}

fn row_to_demand(row: &SqliteRow) -> StorageResult<Demand> {
    let status_str: String = row.try_get("status")?;
    let status = status_str
        .parse::<DemandStatus>()
        .map_err(StorageError::Database)?;

    let created_at_str: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|_| StorageError::Database("Invalid created_at timestamp".to_string()))?
        .with_timezone(&Utc);

    Ok(Demand {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        status,
        created_by: row.try_get("created_by")?,
        created_at,
        attached_file: row.try_get("attached_file")?,
    })
}

fn row_to_article(row: &SqliteRow) -> StorageResult<Article> {
    Ok(Article {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        quantity: row.try_get("quantity")?,
        price: row.try_get("price")?,
        demand_id: row.try_get("demand_id")?,
    })
}

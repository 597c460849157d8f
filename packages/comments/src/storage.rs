// ABOUTME: Comment ledger storage using SQLite
// ABOUTME: Append and list operations only; there is no update or delete path

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use procura_storage::{StorageError, StorageResult};
use procura_users::UserSummary;

use crate::types::{Comment, CommentResponse, CommentTarget, CommentType, NewComment};

pub struct CommentStorage {
    pool: SqlitePool,
}

impl CommentStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a comment to its target, resolving the target first.
    /// Fails with NotFound when the target row does not exist.
    pub async fn append(&self, new: NewComment) -> StorageResult<Comment> {
        let mut conn = self.pool.acquire().await.map_err(StorageError::Sqlx)?;
        append_in(&mut conn, new).await
    }

    /// Comments attached to a demand, oldest first, with author summaries
    pub async fn list_for_demand(&self, demand_id: i64) -> StorageResult<Vec<CommentResponse>> {
        self.list_responses("demand_id", demand_id).await
    }

    /// Comments attached to a quote, oldest first, with author summaries
    pub async fn list_for_quote(&self, quote_id: i64) -> StorageResult<Vec<CommentResponse>> {
        self.list_responses("quote_id", quote_id).await
    }

    async fn list_responses(
        &self,
        column: &'static str,
        id: i64,
    ) -> StorageResult<Vec<CommentResponse>> {
        let query = format!(
            "SELECT c.*, u.first_name, u.last_name, u.email, u.role
             FROM comments c JOIN users u ON u.id = c.created_by
             WHERE c.{column} = ? ORDER BY c.id ASC"
        );

        let rows = sqlx::query(&query)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_response).collect()
    }
}

/// Transaction-aware append: the caller owns the connection, so a lifecycle
/// engine can record the status change and the audit comment atomically.
pub async fn append_in(conn: &mut SqliteConnection, new: NewComment) -> StorageResult<Comment> {
    resolve_target(conn, new.target).await?;

    let now = Utc::now();

    debug!("Appending {} comment to {:?}", new.comment_type, new.target);

    let result = sqlx::query(
        r#"
        INSERT INTO comments (created_by, content, created_at, comment_type, demand_id, quote_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(new.author_id)
    .bind(&new.content)
    .bind(now.to_rfc3339())
    .bind(new.comment_type.as_str())
    .bind(new.target.demand_id())
    .bind(new.target.quote_id())
    .execute(&mut *conn)
    .await
    .map_err(StorageError::Sqlx)?;

    Ok(Comment {
        id: result.last_insert_rowid(),
        created_by: new.author_id,
        content: new.content,
        created_at: now,
        comment_type: new.comment_type,
        target: new.target,
    })
}

async fn resolve_target(conn: &mut SqliteConnection, target: CommentTarget) -> StorageResult<()> {
    let (query, id, entity) = match target {
        CommentTarget::Demand(id) => ("SELECT COUNT(*) FROM demands WHERE id = ?", id, "Demand"),
        CommentTarget::Quote(id) => ("SELECT COUNT(*) FROM quotes WHERE id = ?", id, "Quote"),
    };

    let count: i64 = sqlx::query_scalar(query)
        .bind(id)
        .fetch_one(&mut *conn)
        .await
        .map_err(StorageError::Sqlx)?;

    if count == 0 {
        return Err(StorageError::not_found(entity, id));
    }

    Ok(())
}

fn row_to_response(row: &SqliteRow) -> StorageResult<CommentResponse> {
    let type_str: String = row.try_get("comment_type")?;
    let comment_type = type_str
        .parse::<CommentType>()
        .map_err(StorageError::Database)?;

    let created_at_str: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|_| StorageError::Database("Invalid created_at timestamp".to_string()))?
        .with_timezone(&Utc);

    let role_str: String = row.try_get("role")?;
    let role = role_str.parse().map_err(StorageError::Database)?;

    Ok(CommentResponse {
        id: row.try_get("id")?,
        created_by: UserSummary {
            id: row.try_get("created_by")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            role,
        },
        content: row.try_get("content")?,
        created_at,
        comment_type,
        demand_id: row.try_get("demand_id")?,
        quote_id: row.try_get("quote_id")?,
    })
}

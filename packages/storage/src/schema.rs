// ABOUTME: Embedded database schema
// ABOUTME: Creates all Procura tables and indexes; idempotent via IF NOT EXISTS

use sqlx::SqlitePool;
use tracing::info;

use crate::{StorageError, StorageResult};

// Article, quote, and comment rows live and die with their demand. The
// comment CHECK requires exactly one of demand_id/quote_id to be set.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        token_hash TEXT NOT NULL UNIQUE,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS demands (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        status TEXT NOT NULL,
        created_by INTEGER NOT NULL REFERENCES users(id),
        created_at TEXT NOT NULL,
        attached_file TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        quantity INTEGER NOT NULL,
        price REAL,
        demand_id INTEGER NOT NULL REFERENCES demands(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS quotes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        created_by INTEGER NOT NULL REFERENCES users(id),
        created_at TEXT NOT NULL,
        total_amount REAL NOT NULL,
        status TEXT NOT NULL,
        demand_id INTEGER NOT NULL REFERENCES demands(id) ON DELETE CASCADE,
        fulfillment_file TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        created_by INTEGER NOT NULL REFERENCES users(id),
        content TEXT NOT NULL,
        created_at TEXT NOT NULL,
        comment_type TEXT NOT NULL,
        demand_id INTEGER REFERENCES demands(id) ON DELETE CASCADE,
        quote_id INTEGER REFERENCES quotes(id) ON DELETE CASCADE,
        CHECK ((demand_id IS NULL) <> (quote_id IS NULL))
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_demands_created_by ON demands(created_by)",
    "CREATE INDEX IF NOT EXISTS idx_demands_status ON demands(status)",
    "CREATE INDEX IF NOT EXISTS idx_articles_demand ON articles(demand_id)",
    "CREATE INDEX IF NOT EXISTS idx_quotes_created_by ON quotes(created_by)",
    "CREATE INDEX IF NOT EXISTS idx_quotes_demand ON quotes(demand_id)",
    "CREATE INDEX IF NOT EXISTS idx_comments_demand ON comments(demand_id)",
    "CREATE INDEX IF NOT EXISTS idx_comments_quote ON comments(quote_id)",
];

/// Create all tables and indexes if they do not exist yet
pub async fn initialize(pool: &SqlitePool) -> StorageResult<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(StorageError::Sqlx)?;
    }

    info!("Storage schema initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::db::connect_memory;

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let pool = connect_memory().await.unwrap();
        super::initialize(&pool).await.unwrap();
        super::initialize(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_comment_check_rejects_double_target() {
        let pool = connect_memory().await.unwrap();
        super::initialize(&pool).await.unwrap();

        sqlx::query(
            "INSERT INTO users (first_name, last_name, email, password_hash, role, created_at)
             VALUES ('a', 'b', 'a@b.c', 'x', 'AGENT', '2026-01-01T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .unwrap();

        // Neither target set must be rejected by the CHECK constraint
        let result = sqlx::query(
            "INSERT INTO comments (created_by, content, created_at, comment_type)
             VALUES (1, 'orphan', '2026-01-01T00:00:00Z', 'APPROVED')",
        )
        .execute(&pool)
        .await;
        assert!(result.is_err());
    }
}

// ABOUTME: User storage layer using SQLite
// ABOUTME: Handles CRUD operations and role/email lookups for accounts

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use procura_core::PageRequest;
use procura_storage::{StorageError, StorageResult};

use crate::types::{AppRole, AppUser, NewUser};

pub struct UserStorage {
    pool: SqlitePool,
}

impl UserStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: NewUser) -> StorageResult<AppUser> {
        let now = Utc::now();

        debug!("Creating user: {} ({})", input.email, input.role);

        let result = sqlx::query(
            r#"
            INSERT INTO users (first_name, last_name, email, password_hash, role, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(input.role.as_str())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                let id = done.last_insert_rowid();
                self.find_by_id(id)
                    .await?
                    .ok_or_else(|| StorageError::not_found("User", id))
            }
            Err(sqlx::Error::Database(db_err)) => {
                // SQLite UNIQUE constraint violation on the email column
                if let Some(code) = db_err.code() {
                    if code == "2067" || code == "1555" {
                        return Err(StorageError::Database(format!(
                            "email already registered: {}",
                            input.email
                        )));
                    }
                }
                Err(StorageError::Sqlx(sqlx::Error::Database(db_err)))
            }
            Err(e) => Err(StorageError::Sqlx(e)),
        }
    }

    pub async fn find_by_id(&self, id: i64) -> StorageResult<Option<AppUser>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    pub async fn find_by_email(&self, email: &str) -> StorageResult<Option<AppUser>> {
        debug!("Fetching user by email: {}", email);

        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    pub async fn exists_by_role(&self, role: AppRole) -> StorageResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(count > 0)
    }

    /// List users newest first, excluding the caller's own account
    pub async fn list(
        &self,
        params: &PageRequest,
        exclude_email: &str,
    ) -> StorageResult<(Vec<AppUser>, i64)> {
        let (limit, offset) = params.validate();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email <> ?")
            .bind(exclude_email)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        let rows = sqlx::query(
            "SELECT * FROM users WHERE email <> ? ORDER BY id DESC LIMIT ? OFFSET ?",
        )
        .bind(exclude_email)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        let users = rows
            .iter()
            .map(row_to_user)
            .collect::<StorageResult<Vec<_>>>()?;

        Ok((users, count))
    }

    /// Remove an account. Returns false when no such user exists.
    pub async fn remove(&self, id: i64) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_user(row: &SqliteRow) -> StorageResult<AppUser> {
    let role_str: String = row.try_get("role")?;
    let role = role_str
        .parse::<AppRole>()
        .map_err(StorageError::Database)?;

    let created_at_str: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|_| StorageError::Database("Invalid created_at timestamp".to_string()))?
        .with_timezone(&Utc);

    Ok(AppUser {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role,
        created_at,
    })
}

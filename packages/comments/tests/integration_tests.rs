// ABOUTME: Integration tests for the comment ledger
// ABOUTME: Covers target resolution, append, and listing with author summaries

use procura_comments::{CommentStorage, CommentTarget, CommentType, NewComment};
use procura_storage::db::connect_memory_initialized;
use procura_storage::StorageError;
use sqlx::SqlitePool;

async fn seed_user(pool: &SqlitePool, email: &str, role: &str) -> i64 {
    sqlx::query(
        "INSERT INTO users (first_name, last_name, email, password_hash, role, created_at)
         VALUES ('Test', 'User', ?, 'hash', ?, '2026-01-01T00:00:00Z')",
    )
    .bind(email)
    .bind(role)
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid()
}

async fn seed_demand(pool: &SqlitePool, created_by: i64) -> i64 {
    sqlx::query(
        "INSERT INTO demands (title, description, status, created_by, created_at)
         VALUES ('Toner', 'Printer toner', 'CREATED', ?, '2026-01-01T00:00:00Z')",
    )
    .bind(created_by)
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid()
}

#[tokio::test]
async fn test_append_to_demand_and_list() {
    let pool = connect_memory_initialized().await.unwrap();
    let author = seed_user(&pool, "resp@example.com", "RESPONSIBLE").await;
    let demand = seed_demand(&pool, author).await;

    let storage = CommentStorage::new(pool);
    let comment = storage
        .append(NewComment {
            content: "Looks good".to_string(),
            comment_type: CommentType::Approved,
            author_id: author,
            target: CommentTarget::Demand(demand),
        })
        .await
        .unwrap();

    assert_eq!(comment.target, CommentTarget::Demand(demand));

    let listed = storage.list_for_demand(demand).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].content, "Looks good");
    assert_eq!(listed[0].created_by.email, "resp@example.com");
    assert_eq!(listed[0].demand_id, Some(demand));
    assert_eq!(listed[0].quote_id, None);
}

#[tokio::test]
async fn test_append_fails_for_missing_target() {
    let pool = connect_memory_initialized().await.unwrap();
    let author = seed_user(&pool, "resp@example.com", "RESPONSIBLE").await;

    let storage = CommentStorage::new(pool);
    let result = storage
        .append(NewComment {
            content: "ghost".to_string(),
            comment_type: CommentType::Rejected,
            author_id: author,
            target: CommentTarget::Demand(999),
        })
        .await;

    assert!(matches!(
        result,
        Err(StorageError::NotFound { entity: "Demand", .. })
    ));
}

#[tokio::test]
async fn test_comments_list_in_append_order() {
    let pool = connect_memory_initialized().await.unwrap();
    let author = seed_user(&pool, "tech@example.com", "TECHNICIAN").await;
    let demand = seed_demand(&pool, author).await;

    let storage = CommentStorage::new(pool);
    for content in ["first", "second", "third"] {
        storage
            .append(NewComment {
                content: content.to_string(),
                comment_type: CommentType::Approved,
                author_id: author,
                target: CommentTarget::Demand(demand),
            })
            .await
            .unwrap();
    }

    let listed = storage.list_for_demand(demand).await.unwrap();
    let contents: Vec<_> = listed.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["first", "second", "third"]);
}

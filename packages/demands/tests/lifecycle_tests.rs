// ABOUTME: Integration tests for the demand lifecycle engine
// ABOUTME: Creation shortcut, validation workflow, article upsert, pagination, statistics

use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use sqlx::SqlitePool;

use procura_attachments::{AttachmentUpload, LocalUploader, UploadError, UploadResult, Uploader};
use procura_comments::{CommentInput, CommentStorage};
use procura_core::PageRequest;
use procura_demands::{
    ArticleEntry, DemandCreateInput, DemandError, DemandManager, DemandStatus, DemandStorage,
    DemandUpdateInput, DemandValidateInput,
};
use procura_storage::db::connect_memory_initialized;
use procura_users::{AppRole, NewUser, UserStorage};

struct FailingUploader;

#[async_trait]
impl Uploader for FailingUploader {
    async fn upload(&self, _bytes: &[u8], _filename: &str) -> UploadResult<String> {
        Err(UploadError::Io(std::io::Error::other("store unreachable")))
    }
}

async fn seed_user(pool: &SqlitePool, email: &str, role: AppRole) -> i64 {
    UserStorage::new(pool.clone())
        .create(NewUser {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role,
        })
        .await
        .unwrap()
        .id
}

fn manager(pool: &SqlitePool) -> DemandManager {
    manager_with(pool, Arc::new(LocalUploader::new(std::env::temp_dir())))
}

fn manager_with(pool: &SqlitePool, uploader: Arc<dyn Uploader>) -> DemandManager {
    DemandManager::new(
        DemandStorage::new(pool.clone()),
        UserStorage::new(pool.clone()),
        CommentStorage::new(pool.clone()),
        uploader,
    )
}

fn create_input(articles: Vec<ArticleEntry>) -> DemandCreateInput {
    DemandCreateInput {
        title: "Printer toner".to_string(),
        description: "Toner for the second floor printers".to_string(),
        attached_file: None,
        articles,
    }
}

fn article(name: &str) -> ArticleEntry {
    ArticleEntry {
        id: None,
        name: name.to_string(),
        description: format!("{name} description"),
        quantity: 2,
    }
}

fn validate_input(demand_id: i64, decision: &str) -> DemandValidateInput {
    DemandValidateInput {
        decision: decision.to_string(),
        comment: CommentInput {
            content: "reviewed".to_string(),
            comment_type: if decision.eq_ignore_ascii_case("approved") {
                "APPROVED".to_string()
            } else {
                "REJECTED".to_string()
            },
            demand_id: Some(demand_id),
            quote_id: None,
        },
    }
}

#[tokio::test]
async fn test_create_by_agent_starts_at_created() {
    let pool = connect_memory_initialized().await.unwrap();
    seed_user(&pool, "agent@example.com", AppRole::Agent).await;

    let demand = manager(&pool)
        .create(
            create_input(vec![article("toner"), article("drum")]),
            "agent@example.com",
        )
        .await
        .unwrap();

    assert_eq!(demand.status, DemandStatus::Created);
    assert_eq!(demand.articles.len(), 2);
    assert_eq!(demand.created_by.email, "agent@example.com");
    assert!(demand.comments.is_empty());
}

#[tokio::test]
async fn test_create_by_responsible_is_self_approved() {
    let pool = connect_memory_initialized().await.unwrap();
    seed_user(&pool, "resp@example.com", AppRole::Responsible).await;

    let demand = manager(&pool)
        .create(create_input(vec![article("toner")]), "resp@example.com")
        .await
        .unwrap();

    assert_eq!(demand.status, DemandStatus::ResponsibleApproved);
}

#[tokio::test]
async fn test_create_with_unknown_creator_fails() {
    let pool = connect_memory_initialized().await.unwrap();

    let result = manager(&pool)
        .create(create_input(vec![]), "ghost@example.com")
        .await;

    assert!(matches!(
        result,
        Err(DemandError::NotFound { entity: "User", .. })
    ));
}

#[tokio::test]
async fn test_failed_upload_aborts_creation() {
    let pool = connect_memory_initialized().await.unwrap();
    seed_user(&pool, "agent@example.com", AppRole::Agent).await;

    let mut input = create_input(vec![article("toner")]);
    input.attached_file = Some(AttachmentUpload {
        filename: "specs.pdf".to_string(),
        bytes: b"pdf".to_vec(),
    });

    let result = manager_with(&pool, Arc::new(FailingUploader))
        .create(input, "agent@example.com")
        .await;
    assert!(matches!(result, Err(DemandError::Upload(_))));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM demands")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_create_with_attachment_stores_reference() {
    let pool = connect_memory_initialized().await.unwrap();
    seed_user(&pool, "agent@example.com", AppRole::Agent).await;

    let dir = tempfile::tempdir().unwrap();
    let mgr = manager_with(&pool, Arc::new(LocalUploader::new(dir.path().to_path_buf())));

    let mut input = create_input(vec![article("toner")]);
    input.attached_file = Some(AttachmentUpload {
        filename: "specs.pdf".to_string(),
        bytes: b"pdf".to_vec(),
    });

    let demand = mgr.create(input, "agent@example.com").await.unwrap();
    let reference = demand.attached_file.unwrap();
    assert!(reference.starts_with("/uploads/"));
    assert!(reference.ends_with("-specs.pdf"));
}

#[tokio::test]
async fn test_validate_appends_comment_and_sets_status() {
    let pool = connect_memory_initialized().await.unwrap();
    seed_user(&pool, "agent@example.com", AppRole::Agent).await;
    seed_user(&pool, "resp@example.com", AppRole::Responsible).await;
    let mgr = manager(&pool);

    let demand = mgr
        .create(create_input(vec![article("toner")]), "agent@example.com")
        .await
        .unwrap();

    let validated = mgr
        .validate(validate_input(demand.id, "APPROVED"), "resp@example.com")
        .await
        .unwrap();

    assert_eq!(validated.status, DemandStatus::ResponsibleApproved);
    assert_eq!(validated.comments.len(), 1);
    assert_eq!(validated.comments[0].created_by.email, "resp@example.com");
    assert_eq!(validated.comments[0].demand_id, Some(demand.id));
}

#[tokio::test]
async fn test_validate_with_unknown_suffix_leaves_demand_untouched() {
    let pool = connect_memory_initialized().await.unwrap();
    seed_user(&pool, "agent@example.com", AppRole::Agent).await;
    seed_user(&pool, "resp@example.com", AppRole::Responsible).await;
    let mgr = manager(&pool);

    let demand = mgr
        .create(create_input(vec![article("toner")]), "agent@example.com")
        .await
        .unwrap();

    let result = mgr
        .validate(validate_input(demand.id, "SHELVED"), "resp@example.com")
        .await;
    assert!(matches!(result, Err(DemandError::InvalidState(_))));

    let after = mgr.find_by_id(demand.id).await.unwrap();
    assert_eq!(after.status, DemandStatus::Created);
    assert!(after.comments.is_empty());
}

#[tokio::test]
async fn test_validate_by_non_validating_role_is_invalid_state() {
    let pool = connect_memory_initialized().await.unwrap();
    seed_user(&pool, "agent@example.com", AppRole::Agent).await;
    seed_user(&pool, "manager@example.com", AppRole::Manager).await;
    let mgr = manager(&pool);

    let demand = mgr
        .create(create_input(vec![article("toner")]), "agent@example.com")
        .await
        .unwrap();

    let result = mgr
        .validate(validate_input(demand.id, "APPROVED"), "manager@example.com")
        .await;

    match result {
        Err(DemandError::InvalidState(token)) => assert_eq!(token, "MANAGER_APPROVED"),
        other => panic!("expected InvalidState, got {other:?}"),
    }
}

#[tokio::test]
async fn test_two_step_approval_chain() {
    let pool = connect_memory_initialized().await.unwrap();
    seed_user(&pool, "agent@example.com", AppRole::Agent).await;
    seed_user(&pool, "resp@example.com", AppRole::Responsible).await;
    seed_user(&pool, "tech@example.com", AppRole::Technician).await;
    let mgr = manager(&pool);

    let demand = mgr
        .create(
            create_input(vec![article("toner"), article("drum")]),
            "agent@example.com",
        )
        .await
        .unwrap();
    assert_eq!(demand.status, DemandStatus::Created);

    let demand = mgr
        .validate(validate_input(demand.id, "APPROVED"), "resp@example.com")
        .await
        .unwrap();
    assert_eq!(demand.status, DemandStatus::ResponsibleApproved);
    assert_eq!(demand.comments.len(), 1);

    let demand = mgr
        .validate(validate_input(demand.id, "APPROVED"), "tech@example.com")
        .await
        .unwrap();
    assert_eq!(demand.status, DemandStatus::TechnicianApproved);
    assert_eq!(demand.comments.len(), 2);
}

#[tokio::test]
async fn test_update_inserts_and_patches_articles() {
    let pool = connect_memory_initialized().await.unwrap();
    seed_user(&pool, "agent@example.com", AppRole::Agent).await;
    let mgr = manager(&pool);

    let demand = mgr
        .create(create_input(vec![article("toner")]), "agent@example.com")
        .await
        .unwrap();
    let existing = &demand.articles[0];

    let updated = mgr
        .update(DemandUpdateInput {
            id: demand.id,
            title: "Printer supplies".to_string(),
            description: "Toner and paper".to_string(),
            articles: vec![
                ArticleEntry {
                    id: Some(existing.id),
                    name: "toner XL".to_string(),
                    description: "high capacity".to_string(),
                    quantity: 5,
                },
                ArticleEntry {
                    id: None,
                    name: "paper".to_string(),
                    description: "A4 paper".to_string(),
                    quantity: 10,
                },
            ],
        })
        .await
        .unwrap();

    assert_eq!(updated.title, "Printer supplies");
    assert_eq!(updated.status, DemandStatus::Created);
    assert_eq!(updated.articles.len(), 2);
    assert_eq!(updated.articles[0].name, "toner XL");
    assert_eq!(updated.articles[0].quantity, 5);
    assert_eq!(updated.articles[1].name, "paper");
}

#[tokio::test]
async fn test_update_missing_demand_is_not_found() {
    let pool = connect_memory_initialized().await.unwrap();

    let result = manager(&pool)
        .update(DemandUpdateInput {
            id: 404,
            title: "x".to_string(),
            description: "y".to_string(),
            articles: vec![],
        })
        .await;

    assert!(matches!(
        result,
        Err(DemandError::NotFound { entity: "Demand", .. })
    ));
}

#[tokio::test]
async fn test_find_all_pages_are_disjoint_and_newest_first() {
    let pool = connect_memory_initialized().await.unwrap();
    seed_user(&pool, "agent@example.com", AppRole::Agent).await;
    let mgr = manager(&pool);

    for i in 0..15 {
        let mut input = create_input(vec![]);
        input.title = format!("demand {i}");
        mgr.create(input, "agent@example.com").await.unwrap();
    }

    let first = mgr.find_all(&PageRequest::new(0, 10)).await.unwrap();
    let second = mgr.find_all(&PageRequest::new(1, 10)).await.unwrap();

    assert_eq!(first.data.len(), 10);
    assert_eq!(second.data.len(), 5);
    assert_eq!(first.pagination.total_items, 15);

    let first_ids: Vec<i64> = first.data.iter().map(|d| d.id).collect();
    let second_ids: Vec<i64> = second.data.iter().map(|d| d.id).collect();

    let mut sorted = first_ids.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(first_ids, sorted);

    assert!(first_ids.iter().all(|id| !second_ids.contains(id)));
    assert!(first_ids.iter().min().unwrap() > second_ids.iter().max().unwrap());
}

#[tokio::test]
async fn test_user_stats_buckets() {
    let pool = connect_memory_initialized().await.unwrap();
    seed_user(&pool, "agent@example.com", AppRole::Agent).await;
    seed_user(&pool, "resp@example.com", AppRole::Responsible).await;
    let mgr = manager(&pool);

    // One pending, one rejected, one closed
    let pending = mgr
        .create(create_input(vec![]), "agent@example.com")
        .await
        .unwrap();
    let rejected = mgr
        .create(create_input(vec![]), "agent@example.com")
        .await
        .unwrap();
    let closed = mgr
        .create(create_input(vec![]), "agent@example.com")
        .await
        .unwrap();

    mgr.validate(validate_input(rejected.id, "REJECTED"), "resp@example.com")
        .await
        .unwrap();
    mgr.update_status(closed.id, DemandStatus::Done).await.unwrap();

    let stats = mgr.user_stats("agent@example.com").await.unwrap();
    assert_eq!(stats.total_demands_created, 3);
    assert_eq!(stats.total_closed_demands, 1);
    assert_eq!(stats.pending_demands, 1);
    assert_eq!(stats.rejected_demands, 1);

    // The pending demand is still in CREATED
    assert_eq!(
        mgr.find_by_id(pending.id).await.unwrap().status,
        DemandStatus::Created
    );
}

#[tokio::test]
async fn test_tech_stats_counts_by_status() {
    let pool = connect_memory_initialized().await.unwrap();
    seed_user(&pool, "resp@example.com", AppRole::Responsible).await;
    seed_user(&pool, "tech@example.com", AppRole::Technician).await;
    let mgr = manager(&pool);

    // Responsible-created demands start RESPONSIBLE_APPROVED (awaiting tech)
    let a = mgr
        .create(create_input(vec![]), "resp@example.com")
        .await
        .unwrap();
    let b = mgr
        .create(create_input(vec![]), "resp@example.com")
        .await
        .unwrap();
    mgr.create(create_input(vec![]), "resp@example.com")
        .await
        .unwrap();

    mgr.validate(validate_input(a.id, "APPROVED"), "tech@example.com")
        .await
        .unwrap();
    mgr.validate(validate_input(b.id, "REJECTED"), "tech@example.com")
        .await
        .unwrap();

    let stats = mgr.tech_stats().await.unwrap();
    assert_eq!(stats.total_demands_to_validate, 1);
    assert_eq!(stats.validated_demands, 1);
    assert_eq!(stats.rejected_demands, 1);
}

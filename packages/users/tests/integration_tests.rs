// ABOUTME: Integration tests for user storage and authentication
// ABOUTME: Exercises registration, login, session lookup, and admin bootstrap

use procura_core::PageRequest;
use procura_storage::db::connect_memory_initialized;
use procura_users::{ensure_admin, AppRole, AuthError, AuthService, UserRegisterInput, UserStorage};

fn register_input(email: &str, role: AppRole) -> UserRegisterInput {
    UserRegisterInput {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: email.to_string(),
        password: "correct-horse".to_string(),
        role,
    }
}

#[tokio::test]
async fn test_register_login_authenticate_round_trip() {
    let pool = connect_memory_initialized().await.unwrap();
    let auth = AuthService::new(pool);

    let user = auth
        .register(register_input("ada@example.com", AppRole::Agent))
        .await
        .unwrap();
    assert_eq!(user.role, AppRole::Agent);

    let outcome = auth.login("ada@example.com", "correct-horse").await.unwrap();
    assert_eq!(outcome.user.id, user.id);

    let authenticated = auth.authenticate(&outcome.token).await.unwrap().unwrap();
    assert_eq!(authenticated.email, "ada@example.com");

    let nobody = auth.authenticate("deadbeef").await.unwrap();
    assert!(nobody.is_none());
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let pool = connect_memory_initialized().await.unwrap();
    let auth = AuthService::new(pool);

    auth.register(register_input("ada@example.com", AppRole::Agent))
        .await
        .unwrap();

    let result = auth.login("ada@example.com", "guess").await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));

    let result = auth.login("nobody@example.com", "guess").await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_register_rejects_duplicate_email() {
    let pool = connect_memory_initialized().await.unwrap();
    let auth = AuthService::new(pool);

    auth.register(register_input("ada@example.com", AppRole::Agent))
        .await
        .unwrap();

    let result = auth
        .register(register_input("ada@example.com", AppRole::Provider))
        .await;
    assert!(matches!(result, Err(AuthError::DuplicateEmail(_))));
}

#[tokio::test]
async fn test_ensure_admin_is_idempotent() {
    let pool = connect_memory_initialized().await.unwrap();

    let seeded = ensure_admin(&pool, "admin@procura.local", "change-me")
        .await
        .unwrap();
    assert!(seeded);

    let seeded_again = ensure_admin(&pool, "admin@procura.local", "change-me")
        .await
        .unwrap();
    assert!(!seeded_again);

    let storage = UserStorage::new(pool);
    assert!(storage.exists_by_role(AppRole::Admin).await.unwrap());
}

#[tokio::test]
async fn test_list_excludes_caller_and_orders_newest_first() {
    let pool = connect_memory_initialized().await.unwrap();
    let auth = AuthService::new(pool.clone());

    for email in ["a@example.com", "b@example.com", "c@example.com"] {
        auth.register(register_input(email, AppRole::Agent))
            .await
            .unwrap();
    }

    let storage = UserStorage::new(pool);
    let (users, total) = storage
        .list(&PageRequest::new(0, 10), "b@example.com")
        .await
        .unwrap();

    assert_eq!(total, 2);
    let emails: Vec<_> = users.iter().map(|u| u.email.as_str()).collect();
    assert_eq!(emails, vec!["c@example.com", "a@example.com"]);
}

#[tokio::test]
async fn test_remove_user() {
    let pool = connect_memory_initialized().await.unwrap();
    let auth = AuthService::new(pool.clone());

    let user = auth
        .register(register_input("ada@example.com", AppRole::Agent))
        .await
        .unwrap();

    let storage = UserStorage::new(pool);
    assert!(storage.remove(user.id).await.unwrap());
    assert!(!storage.remove(user.id).await.unwrap());
    assert!(storage.find_by_id(user.id).await.unwrap().is_none());
}

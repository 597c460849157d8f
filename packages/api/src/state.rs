// ABOUTME: Shared application state for API handlers
// ABOUTME: Wires the engines, storages, and uploader over one SQLite pool

use std::sync::Arc;

use sqlx::SqlitePool;

use procura_attachments::Uploader;
use procura_comments::CommentStorage;
use procura_demands::{DemandManager, DemandStorage};
use procura_quotes::{QuoteManager, QuoteStorage};
use procura_users::{AuthService, UserStorage};

/// Shared state for API handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserStorage>,
    pub demands: Arc<DemandManager>,
    pub quotes: Arc<QuoteManager>,
}

impl AppState {
    /// Create application state from a SQLite pool and an uploader
    pub fn new(pool: SqlitePool, uploader: Arc<dyn Uploader>) -> Self {
        let auth = Arc::new(AuthService::new(pool.clone()));
        let users = Arc::new(UserStorage::new(pool.clone()));

        let demands = Arc::new(DemandManager::new(
            DemandStorage::new(pool.clone()),
            UserStorage::new(pool.clone()),
            CommentStorage::new(pool.clone()),
            uploader.clone(),
        ));

        let quotes = Arc::new(QuoteManager::new(
            QuoteStorage::new(pool.clone()),
            DemandStorage::new(pool.clone()),
            UserStorage::new(pool.clone()),
            CommentStorage::new(pool.clone()),
            uploader,
        ));

        Self {
            pool,
            auth,
            users,
            demands,
            quotes,
        }
    }
}

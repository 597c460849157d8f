// ABOUTME: Credential hashing and session-token authentication
// ABOUTME: argon2id password hashes, opaque session tokens stored as SHA-256

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};

use procura_storage::{StorageError, StorageResult};

use crate::storage::UserStorage;
use crate::types::{AppRole, AppUser, NewUser, UserRegisterInput};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),
    #[error("Credential hashing failed: {0}")]
    Hash(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Successful login: the plaintext token is handed out exactly once,
/// only its SHA-256 hash is stored.
#[derive(Debug)]
pub struct LoginOutcome {
    pub token: String,
    pub user: AppUser,
}

pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> AuthResult<bool> {
    let parsed = PasswordHash::new(password_hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn token_hash(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Registration, login, and token lookup over the shared pool
pub struct AuthService {
    pool: SqlitePool,
    users: UserStorage,
}

impl AuthService {
    pub fn new(pool: SqlitePool) -> Self {
        let users = UserStorage::new(pool.clone());
        Self { pool, users }
    }

    pub async fn register(&self, input: UserRegisterInput) -> AuthResult<AppUser> {
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(AuthError::DuplicateEmail(input.email));
        }

        let password_hash = hash_password(&input.password)?;
        let user = self
            .users
            .create(NewUser {
                first_name: input.first_name,
                last_name: input.last_name,
                email: input.email,
                password_hash,
                role: input.role,
            })
            .await?;

        info!("Registered user {} with role {}", user.email, user.role);
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> AuthResult<LoginOutcome> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = generate_token();
        let now = Utc::now();

        sqlx::query("INSERT INTO sessions (token_hash, user_id, created_at) VALUES (?, ?, ?)")
            .bind(token_hash(&token))
            .bind(user.id)
            .bind(now.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        debug!("Issued session token for {}", user.email);
        Ok(LoginOutcome { token, user })
    }

    /// Resolve a bearer token to its account, if the session exists
    pub async fn authenticate(&self, token: &str) -> AuthResult<Option<AppUser>> {
        let user_id: Option<i64> =
            sqlx::query_scalar("SELECT user_id FROM sessions WHERE token_hash = ?")
                .bind(token_hash(token))
                .fetch_optional(&self.pool)
                .await
                .map_err(StorageError::Sqlx)?;

        match user_id {
            Some(id) => Ok(self.users.find_by_id(id).await?),
            None => Ok(None),
        }
    }
}

/// Seed a single ADMIN account if none exists. Idempotent; run by the host
/// process at startup, not by the lifecycle engines.
pub async fn ensure_admin(pool: &SqlitePool, email: &str, password: &str) -> StorageResult<bool> {
    let users = UserStorage::new(pool.clone());

    if users.exists_by_role(AppRole::Admin).await? {
        return Ok(false);
    }

    let password_hash =
        hash_password(password).map_err(|e| StorageError::Database(e.to_string()))?;

    users
        .create(NewUser {
            first_name: "admin".to_string(),
            last_name: "admin".to_string(),
            email: email.to_string(),
            password_hash,
            role: AppRole::Admin,
        })
        .await?;

    info!("Seeded initial admin account: {}", email);
    Ok(true)
}

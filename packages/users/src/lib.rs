// ABOUTME: User accounts and authentication for Procura
// ABOUTME: Provides roles, user storage, argon2 credentials, and session tokens

pub mod auth;
pub mod storage;
pub mod types;

pub use auth::{ensure_admin, AuthError, AuthService, LoginOutcome};
pub use storage::UserStorage;
pub use types::{AppRole, AppUser, NewUser, UserRegisterInput, UserResponse, UserSummary};

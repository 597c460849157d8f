// ABOUTME: Authentication context for API requests
// ABOUTME: Resolves the bearer token to an account and gates handlers by role

use axum::{extract::FromRequestParts, http::request::Parts};

use procura_users::{AppRole, AppUser};

use crate::response::ApiError;
use crate::state::AppState;

/// Current authenticated user, extracted from the Authorization header
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: AppUser,
}

impl CurrentUser {
    /// Boundary role gate. Engines trust the asserted role; this is the
    /// only place it is checked.
    pub fn require_role(&self, allowed: &[AppRole]) -> Result<(), ApiError> {
        if allowed.contains(&self.user.role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;

        let user = state
            .auth
            .authenticate(token)
            .await
            .map_err(ApiError::Auth)?
            .ok_or(ApiError::Unauthorized)?;

        Ok(CurrentUser { user })
    }
}

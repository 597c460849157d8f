// ABOUTME: User management endpoints
// ABOUTME: Listing, self lookup, and removal, gated to the ADMIN role where required

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson},
};
use tracing::info;

use procura_core::{PageRequest, PaginatedResponse};
use procura_users::{AppRole, UserResponse};

use crate::auth::CurrentUser;
use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;

/// List every account except the caller's own (ADMIN only)
pub async fn list_users(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(params): Query<PageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_role(&[AppRole::Admin])?;

    let (users, total) = state.users.list(&params, current.email()).await?;
    let responses: Vec<UserResponse> = users.iter().map(UserResponse::from).collect();

    Ok((
        StatusCode::OK,
        ResponseJson(ApiResponse::success(PaginatedResponse::new(
            responses, &params, total,
        ))),
    ))
}

/// The caller's own account
pub async fn me(current: CurrentUser) -> impl IntoResponse {
    (
        StatusCode::OK,
        ResponseJson(ApiResponse::success(UserResponse::from(&current.user))),
    )
}

/// Remove an account (ADMIN only)
pub async fn delete_user(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_role(&[AppRole::Admin])?;

    if !state.users.remove(id).await? {
        return Err(ApiError::Storage(procura_storage::StorageError::not_found(
            "User", id,
        )));
    }

    info!("User {} removed by {}", id, current.email());
    Ok((
        StatusCode::OK,
        ResponseJson(ApiResponse::success("User removed")),
    ))
}

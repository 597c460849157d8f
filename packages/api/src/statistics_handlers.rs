// ABOUTME: Statistics endpoints, the read-only aggregation layer
// ABOUTME: Role-scoped views recomputed from current storage state on every call

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson},
};

use procura_users::AppRole;

use crate::auth::CurrentUser;
use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;

/// Demand counts for the calling requester (AGENT or RESPONSIBLE)
pub async fn demand_stats(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    current.require_role(&[AppRole::Agent, AppRole::Responsible])?;

    let stats = state.demands.user_stats(current.email()).await?;

    Ok((StatusCode::OK, ResponseJson(ApiResponse::success(stats))))
}

/// Global technician workload counts (TECHNICIAN)
pub async fn technician_stats(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    current.require_role(&[AppRole::Technician])?;

    let stats = state.demands.tech_stats().await?;

    Ok((StatusCode::OK, ResponseJson(ApiResponse::success(stats))))
}

/// Quote counts for the calling provider (PROVIDER)
pub async fn provider_stats(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    current.require_role(&[AppRole::Provider])?;

    let stats = state.quotes.provider_stats(current.email()).await?;

    Ok((StatusCode::OK, ResponseJson(ApiResponse::success(stats))))
}

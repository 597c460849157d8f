// ABOUTME: Registration and login endpoints
// ABOUTME: Thin marshalling over the users package's AuthService

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use procura_users::{UserRegisterInput, UserResponse};

use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Register a new account
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<UserRegisterInput>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.auth.register(input).await?;

    info!("Registered {} as {}", user.email, user.role);
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(UserResponse::from(&user))),
    ))
}

/// Exchange credentials for a session token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.auth.login(&request.email, &request.password).await?;

    Ok((
        StatusCode::OK,
        ResponseJson(ApiResponse::success(LoginResponse {
            token: outcome.token,
            user: UserResponse::from(&outcome.user),
        })),
    ))
}

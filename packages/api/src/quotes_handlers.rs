// ABOUTME: Quote endpoints
// ABOUTME: Provider offers, technician validation, and manager fulfillment

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson},
};
use serde::Deserialize;

use procura_core::PageRequest;
use procura_quotes::{QuoteCreateInput, QuoteManageInput, QuoteUpdateInput, QuoteValidateInput};
use procura_users::AppRole;

use crate::auth::CurrentUser;
use crate::demands_handlers::AttachmentPayload;
use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct QuoteManageRequest {
    #[serde(rename = "quoteId")]
    pub quote_id: i64,
    #[serde(rename = "attachedFile")]
    pub attached_file: Option<AttachmentPayload>,
}

/// Create an offer against a demand (PROVIDER)
pub async fn create_quote(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<QuoteCreateInput>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_role(&[AppRole::Provider])?;

    let quote = state.quotes.create(input, current.email()).await?;

    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(quote)),
    ))
}

/// Amend an offer; review restarts (PROVIDER)
pub async fn update_quote(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<QuoteUpdateInput>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_role(&[AppRole::Provider])?;

    let quote = state.quotes.update(input).await?;

    Ok((StatusCode::OK, ResponseJson(ApiResponse::success(quote))))
}

/// List quotes, newest first (PROVIDER or TECHNICIAN)
pub async fn list_quotes(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(params): Query<PageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_role(&[AppRole::Provider, AppRole::Technician])?;

    let page = state.quotes.find_all(&params).await?;

    Ok((StatusCode::OK, ResponseJson(ApiResponse::success(page))))
}

/// Get one quote (PROVIDER or TECHNICIAN)
pub async fn get_quote(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_role(&[AppRole::Provider, AppRole::Technician])?;

    let quote = state.quotes.find_by_id(id).await?;

    Ok((StatusCode::OK, ResponseJson(ApiResponse::success(quote))))
}

/// Record a validation decision on a quote (TECHNICIAN)
pub async fn validate_quote(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<QuoteValidateInput>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_role(&[AppRole::Technician])?;

    let quote = state.quotes.validate(input, current.email()).await?;

    Ok((StatusCode::OK, ResponseJson(ApiResponse::success(quote))))
}

/// Fulfill an approved quote, closing it and its demand together (MANAGER)
pub async fn manage_quote(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<QuoteManageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_role(&[AppRole::Manager])?;

    let attached_file = request
        .attached_file
        .as_ref()
        .map(AttachmentPayload::decode)
        .transpose()?;

    let quote = state
        .quotes
        .manage(QuoteManageInput {
            quote_id: request.quote_id,
            attached_file,
        })
        .await?;

    Ok((StatusCode::OK, ResponseJson(ApiResponse::success(quote))))
}

// ABOUTME: Demand endpoints
// ABOUTME: Create/list/get/update/validate, role-gated per the workflow contract

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;

use procura_attachments::AttachmentUpload;
use procura_core::PageRequest;
use procura_demands::{ArticleEntry, DemandCreateInput, DemandUpdateInput, DemandValidateInput};
use procura_users::AppRole;

use crate::auth::CurrentUser;
use crate::response::{ApiError, ApiResponse};
use crate::state::AppState;

/// Attachment as it travels over the wire: base64 payload plus filename
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentPayload {
    pub filename: String,
    pub data: String,
}

impl AttachmentPayload {
    pub fn decode(&self) -> Result<AttachmentUpload, ApiError> {
        let bytes = BASE64
            .decode(&self.data)
            .map_err(|_| ApiError::BadRequest("attachment data is not valid base64".to_string()))?;

        Ok(AttachmentUpload {
            filename: self.filename.clone(),
            bytes,
        })
    }
}

#[derive(Deserialize)]
pub struct DemandCreateRequest {
    pub title: String,
    pub description: String,
    #[serde(rename = "attachedFile")]
    pub attached_file: Option<AttachmentPayload>,
    pub articles: Vec<ArticleEntry>,
}

/// Create a demand (AGENT or RESPONSIBLE)
pub async fn create_demand(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<DemandCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_role(&[AppRole::Agent, AppRole::Responsible])?;

    let attached_file = request
        .attached_file
        .as_ref()
        .map(AttachmentPayload::decode)
        .transpose()?;

    let demand = state
        .demands
        .create(
            DemandCreateInput {
                title: request.title,
                description: request.description,
                attached_file,
                articles: request.articles,
            },
            current.email(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(demand)),
    ))
}

/// List demands, newest first
pub async fn list_demands(
    State(state): State<AppState>,
    _current: CurrentUser,
    Query(params): Query<PageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.demands.find_all(&params).await?;

    Ok((StatusCode::OK, ResponseJson(ApiResponse::success(page))))
}

/// Get one demand (AGENT or RESPONSIBLE)
pub async fn get_demand(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_role(&[AppRole::Agent, AppRole::Responsible])?;

    let demand = state.demands.find_by_id(id).await?;

    Ok((StatusCode::OK, ResponseJson(ApiResponse::success(demand))))
}

/// Update title/description/articles (AGENT or RESPONSIBLE)
pub async fn update_demand(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<DemandUpdateInput>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_role(&[AppRole::Agent, AppRole::Responsible])?;

    let demand = state.demands.update(input).await?;

    Ok((StatusCode::OK, ResponseJson(ApiResponse::success(demand))))
}

/// Record a validation decision (RESPONSIBLE or TECHNICIAN)
pub async fn validate_demand(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<DemandValidateInput>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_role(&[AppRole::Responsible, AppRole::Technician])?;

    let demand = state.demands.validate(input, current.email()).await?;

    Ok((StatusCode::OK, ResponseJson(ApiResponse::success(demand))))
}

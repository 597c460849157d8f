// ABOUTME: Shared API response types and error handling
// ABOUTME: Provides consistent response format across all API endpoints

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson},
};
use serde::Serialize;

use procura_demands::DemandError;
use procura_quotes::QuoteError;
use procura_storage::StorageError;
use procura_users::AuthError;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Every failure a handler can surface, mapped to an HTTP status
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    Forbidden,
    BadRequest(String),
    Demand(DemandError),
    Quote(QuoteError),
    Auth(AuthError),
    Storage(StorageError),
}

impl From<DemandError> for ApiError {
    fn from(err: DemandError) -> Self {
        ApiError::Demand(err)
    }
}

impl From<QuoteError> for ApiError {
    fn from(err: QuoteError) -> Self {
        ApiError::Quote(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Storage(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Insufficient role".to_string()),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),

            ApiError::Demand(err) => match err {
                DemandError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
                DemandError::InvalidState(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                DemandError::Upload(_) => (StatusCode::BAD_GATEWAY, err.to_string()),
                DemandError::Storage(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage error".to_string(),
                ),
            },

            ApiError::Quote(err) => match err {
                QuoteError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
                QuoteError::InvalidState(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                QuoteError::Upload(_) => (StatusCode::BAD_GATEWAY, err.to_string()),
                QuoteError::Storage(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage error".to_string(),
                ),
            },

            ApiError::Auth(err) => match err {
                AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, err.to_string()),
                AuthError::DuplicateEmail(_) => (StatusCode::CONFLICT, err.to_string()),
                AuthError::Hash(_) | AuthError::Storage(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                ),
            },

            ApiError::Storage(err) => match err {
                StorageError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage error".to_string(),
                ),
            },
        };

        (status, ResponseJson(ApiResponse::<()>::error(message))).into_response()
    }
}

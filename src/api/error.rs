use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use super::models::ErrorResponse;
use crate::resource::ResourceError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("bad field request: {0}")]
    BadField(String),
    #[error("fetch failed: {0}")]
    FetchFailed(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidUrl(_) | ApiError::BadField(_) => StatusCode::BAD_REQUEST,
            ApiError::FetchFailed(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidUrl(_) => "INVALID_URL",
            ApiError::BadField(_) => "BAD_FIELD",
            ApiError::FetchFailed(_) => "FETCH_FAILED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.code(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ResourceError> for ApiError {
    fn from(value: ResourceError) -> Self {
        match value {
            ResourceError::InvalidUrl(url) => ApiError::InvalidUrl(url),
            ResourceError::BadFieldRequest(field) => ApiError::BadField(field),
            ResourceError::FetchFailed(e) => ApiError::FetchFailed(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

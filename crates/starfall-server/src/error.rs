use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::origin::OriginError;
use crate::store::StoreError;
use crate::validation::ValidationError;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Forbidden(String),
    TooManyRequests,
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(m) | Self::Forbidden(m) | Self::Internal(m) => write!(f, "{m}"),
            Self::TooManyRequests => write!(f, "rate limited"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<OriginError> for AppError {
    fn from(e: OriginError) -> Self {
        match e {
            OriginError::BadFetchMode => Self::BadRequest(e.to_string()),
            _ => Self::Forbidden(e.to_string()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        Self::Internal(e.reason().to_string())
    }
}

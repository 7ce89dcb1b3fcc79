use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::service::ResolveError;
use crate::tracker::{InvalidAddress, UnknownChain};

/// Failures surfaced to API clients as JSON `{"error": ...}` bodies.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidAddress(#[from] InvalidAddress),

    #[error(transparent)]
    UnknownChain(#[from] UnknownChain),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("wallet {0} is already tracked by this chat")]
    AlreadyTracked(String),

    #[error("wallet {0} is not tracked by this chat")]
    NotTracked(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidAddress(_) | ApiError::UnknownChain(_) | ApiError::Resolve(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::AlreadyTracked(_) => StatusCode::CONFLICT,
            ApiError::NotTracked(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

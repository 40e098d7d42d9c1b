use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid ID format. Must be a valid UUID.")]
    InvalidId,

    #[error("Data not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("The requested endpoint does not exist")]
    UnknownRoute,

    #[error("{0}")]
    Store(#[from] StoreError),
}

/// Failure envelope shared by every endpoint.
#[derive(Serialize)]
pub struct ErrorEnvelope {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::UnknownRoute => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let id = match &self {
            Self::NotFound(id) => Some(id.clone()),
            Self::Store(e) => {
                error!(error = %e, "backend query failed");
                None
            }
            _ => None,
        };

        let body = ErrorEnvelope {
            success: false,
            error: self.to_string(),
            id,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

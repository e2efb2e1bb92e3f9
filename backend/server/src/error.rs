use axum::{
    Json,
    extract::{multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use menu::validate::ValidationError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::database::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Wrong credentials")]
    Unauthorized,

    #[error("Persistence failed: {0}")]
    Persistence(#[from] StoreError),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("No such file: {0}")]
    MissingFile(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedPayload(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::MalformedPayload(rejection.body_text())
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::MalformedPayload(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MalformedPayload { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Persistence(StoreError::NotFound(_)) | AppError::MissingFile(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::Persistence { .. } | AppError::Upload { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            error!("{self}");
        } else {
            warn!("{self}");
        }

        let body = match self {
            AppError::Unauthorized => json!({ "message": self.to_string() }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

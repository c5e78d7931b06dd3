use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::error::{StoreError, ValidationError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid request body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("Invalid query string: {0}")]
    Query(#[from] QueryRejection),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) | AppError::Body(_) | AppError::Query(_) => {
                warn!(error = %self, "Rejected request");
                StatusCode::BAD_REQUEST
            }
            AppError::Store(e) => {
                error!(error = %e, "Reading store failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

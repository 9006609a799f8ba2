//! API Error Mapping
//!
//! Maps the lifecycle error taxonomy onto HTTP responses: client-fixable
//! errors keep their message, server-side failures log the detail and return
//! a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use export::ExportError;
use lifecycle::LifecycleError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Boundary errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Malformed request shape (bad multipart, missing file parts)
    #[error("invalid request: {0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Lifecycle(err) => match err {
                LifecycleError::Validation(_) => StatusCode::BAD_REQUEST,
                LifecycleError::NotFound(_) => StatusCode::NOT_FOUND,
                // "Nothing to export" is a 404 on the report, not a failure.
                LifecycleError::Export(ExportError::EmptyExport) => StatusCode::NOT_FOUND,
                LifecycleError::Store(_) | LifecycleError::Asset(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

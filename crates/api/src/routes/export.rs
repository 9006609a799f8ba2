//! CSV Export Route

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::AppState;

/// Download the current records as a CSV report
///
/// GET /download-csv
pub async fn download_csv(State(state): State<AppState>) -> Result<Response, ApiError> {
    let export = state.lifecycle.export_csv().await?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.filename),
        ),
    ];
    Ok((headers, export.content).into_response())
}

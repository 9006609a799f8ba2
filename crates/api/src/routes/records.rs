//! Repair Record Routes

use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use lifecycle::{ImageUpload, NewRepair};
use serde_json::json;
use storage::RepairRecord;

use crate::error::ApiError;
use crate::AppState;

// Multipart field names are the wire contract the existing front-end speaks.
const FIELD_DESCRIPTION: &str = "descripcion";
const FIELD_LOCATION: &str = "ubicacion";
const FIELD_PHOTO_BEFORE: &str = "fotoAntes";
const FIELD_PHOTO_AFTER: &str = "fotoDespues";

/// Create a repair record from a multipart upload
///
/// POST /upload
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<RepairRecord>), ApiError> {
    let mut description = String::new();
    let mut location = None;
    let mut before = None;
    let mut after = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            FIELD_DESCRIPTION => description = field.text().await.map_err(bad_request)?,
            FIELD_LOCATION => location = Some(field.text().await.map_err(bad_request)?),
            FIELD_PHOTO_BEFORE => before = Some(read_image(field).await?),
            FIELD_PHOTO_AFTER => after = Some(read_image(field).await?),
            _ => {} // unknown parts are ignored
        }
    }

    let (before, after) = match (before, after) {
        (Some(before), Some(after)) => (before, after),
        _ => {
            return Err(ApiError::BadRequest(format!(
                "both {FIELD_PHOTO_BEFORE} and {FIELD_PHOTO_AFTER} file parts are required"
            )))
        }
    };

    let record = state
        .lifecycle
        .create(NewRepair {
            description,
            location,
            before,
            after,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// List all repair records, most recent first
///
/// GET /reparaciones
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<RepairRecord>>, ApiError> {
    Ok(Json(state.lifecycle.list().await?))
}

/// Delete a repair record and its photos
///
/// DELETE /reparaciones/:id
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.lifecycle.delete(id).await?;
    Ok(Json(json!({ "message": "repair record deleted" })))
}

async fn read_image(field: Field<'_>) -> Result<ImageUpload, ApiError> {
    let filename = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().unwrap_or_default().to_string();
    let bytes = field.bytes().await.map_err(bad_request)?;
    Ok(ImageUpload {
        filename,
        content_type,
        bytes: bytes.to_vec(),
    })
}

fn bad_request(err: MultipartError) -> ApiError {
    ApiError::BadRequest(err.to_string())
}

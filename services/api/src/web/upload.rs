//! services/api/src/web/upload.rs
//!
//! Transcript upload: accepts a `.txt`, `.pdf` or `.docx` file and returns its
//! plain text so the client can review it before creating a summary.

use axum::{
    extract::{
        multipart::{Field, MultipartRejection},
        Multipart, State,
    },
    response::Json,
};
use recap_core::UploadKind;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::error::HttpError;
use crate::web::state::AppState;

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub text: String,
    pub filename: String,
    pub size: usize,
}

/// Extract the text of an uploaded transcript.
///
/// Reads the `file` part of a multipart/form-data request (or the first part
/// that carries a file name).
#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content_type = "multipart/form-data", description = "The transcript file."),
    responses(
        (status = 200, description = "Extracted text", body = UploadResponse),
        (status = 400, description = "Missing, empty, oversized or unsupported file"),
        (status = 500, description = "The file could not be parsed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, HttpError> {
    let mut multipart = multipart.map_err(|e| HttpError::BadRequest(e.body_text()))?;

    let (filename, data) = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| HttpError::BadRequest(format!("Failed to read multipart data: {}", e)))?
            .ok_or_else(|| HttpError::BadRequest("No file uploaded".to_string()))?;
        if let Some(upload) = read_file_field(field).await? {
            break upload;
        }
    };

    let kind = UploadKind::from_filename(&filename).ok_or_else(|| {
        HttpError::BadRequest("Unsupported file type. Upload a .txt, .pdf or .docx file".to_string())
    })?;
    if data.len() > MAX_UPLOAD_BYTES {
        return Err(HttpError::BadRequest(
            "File is too large. The limit is 10 MB".to_string(),
        ));
    }
    if data.is_empty() {
        return Err(HttpError::BadRequest("Uploaded file is empty".to_string()));
    }

    // The temporary file is removed when `file` drops, whatever the outcome.
    let file = tempfile::Builder::new()
        .suffix(&format!(".{}", kind.extension()))
        .tempfile()
        .map_err(|e| HttpError::Internal(format!("Failed to create temp file: {}", e)))?;
    tokio::fs::write(file.path(), &data)
        .await
        .map_err(|e| HttpError::Internal(format!("Failed to store upload: {}", e)))?;

    let text = state
        .extractor
        .extract_text(file.path(), kind)
        .await
        .map_err(|e| {
            warn!(%filename, error = %e, "text extraction failed");
            HttpError::Upstream(format!("Failed to extract text from file: {}", e))
        })?;

    let text = text.trim();
    if text.is_empty() {
        return Err(HttpError::BadRequest(
            "No text could be extracted from the file".to_string(),
        ));
    }

    info!(%filename, size = data.len(), "transcript uploaded");
    Ok(Json(UploadResponse {
        text: text.to_string(),
        filename,
        size: data.len(),
    }))
}

/// Returns the file name and contents if this part is the uploaded file.
async fn read_file_field(field: Field<'_>) -> Result<Option<(String, Vec<u8>)>, HttpError> {
    let filename = match field.file_name() {
        Some(name) => name.to_string(),
        None if field.name() == Some("file") => String::new(),
        None => return Ok(None),
    };
    let data = field
        .bytes()
        .await
        .map_err(|e| HttpError::BadRequest(format!("Failed to read file bytes: {}", e)))?;
    Ok(Some((filename, data.to_vec())))
}

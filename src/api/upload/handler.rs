// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::response::{UploadResponse, UploadedFile};
use crate::api::http_server::AppState;
use crate::api::ApiError;

/// Multipart field names carrying files
const FILE_FIELDS: &[&str] = &["files[]", "files"];

/// POST /api/upload
///
/// Every part named `files[]` (or `files`) with a non-empty filename is
/// stored under a fresh name. Parts without a filename are skipped.
///
/// # Errors
/// - 400: no file parts, or none with a filename
/// - 500: a file could not be written; the partial file is removed
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut parts_seen = 0usize;
    let mut files = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Malformed multipart body: {}", e);
                return Err(ApiError::InvalidRequest(format!(
                    "Malformed multipart body: {}",
                    e
                )));
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        if !FILE_FIELDS.contains(&name.as_str()) {
            debug!("Ignoring multipart field '{}'", name);
            continue;
        }
        parts_seen += 1;

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        if filename.is_empty() {
            debug!("Skipping file part without a filename");
            continue;
        }

        let bytes = field.bytes().await.map_err(|e| {
            warn!("Failed to read upload {}: {}", filename, e);
            ApiError::InvalidRequest(format!("Failed to read file {}: {}", filename, e))
        })?;

        let saved = state.store.save_upload(&filename, &bytes)?;
        files.push(UploadedFile::new(saved, content_type));
    }

    if parts_seen == 0 {
        return Err(ApiError::InvalidRequest("No files provided".to_string()));
    }
    if files.is_empty() {
        return Err(ApiError::InvalidRequest("No valid files uploaded".to_string()));
    }

    let upload_dir = state.store.upload_dir();
    let upload_directory = std::path::absolute(upload_dir)
        .unwrap_or_else(|_| upload_dir.to_path_buf())
        .display()
        .to_string();

    info!("Uploaded {} file(s) to {}", files.len(), upload_directory);

    Ok(Json(UploadResponse {
        message: "Files uploaded successfully".to_string(),
        files_count: files.len(),
        files,
        upload_directory,
    }))
}

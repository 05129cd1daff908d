// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection endpoint handlers

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::response::DetectionResponse;
use crate::api::http_server::AppState;
use crate::api::ApiError;

/// GET /api/detections/:image_id
///
/// Runs detection on the matching upload, writes `processed_<image_id>` to the
/// processed directory and returns its URL.
///
/// # Errors
/// - 404: no upload matches `image_id`
/// - 422: invalid identifier or undecodable image
/// - 500: vision service not configured, or a filesystem failure
/// - 502: remote API rejected the request or was unreachable
/// - 504: remote API timed out
pub async fn detect_objects_handler(
    State(state): State<Arc<AppState>>,
    Path(image_id): Path<String>,
) -> Result<Json<DetectionResponse>, ApiError> {
    debug!("Detection requested for image {}", image_id);

    let stored = state
        .detection_service
        .detect_and_store(&image_id)
        .await
        .map_err(|e| {
            warn!("Detection failed for image {}: {}", image_id, e);
            ApiError::from(e)
        })?;

    Ok(Json(DetectionResponse {
        processed_image_url: stored.processed_url,
    }))
}

/// GET /api/detections/:image_id/image
///
/// Same pipeline as [`detect_objects_handler`] but the annotated JPEG is
/// returned in the body and nothing is written to disk.
pub async fn detect_image_handler(
    State(state): State<Arc<AppState>>,
    Path(image_id): Path<String>,
) -> Result<Response, ApiError> {
    debug!("Annotated image requested for image {}", image_id);

    let rendered = state
        .detection_service
        .detect_and_render(&image_id)
        .await
        .map_err(|e| {
            warn!("Detection failed for image {}: {}", image_id, e);
            ApiError::from(e)
        })?;

    let disposition = format!("inline; filename={}", rendered.filename);
    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        rendered.bytes,
    )
        .into_response())
}

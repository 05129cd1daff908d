// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::request::ListImagesQuery;
use super::response::{DeleteImageResponse, ListImagesResponse};
use crate::api::http_server::AppState;
use crate::api::ApiError;
use crate::storage::validate_image_id;

/// GET /api/images?page=&page_size=
///
/// Newest first. Bounds are checked before the directory is read; a page past
/// the end is an empty list, not an error.
pub async fn list_images_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListImagesQuery>, QueryRejection>,
) -> Result<Json<ListImagesResponse>, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        warn!("Rejected image listing query: {}", rejection);
        ApiError::ValidationError {
            field: "query".to_string(),
            message: rejection.body_text(),
        }
    })?;
    let request = query.to_page_request()?;

    let page = state.store.list_processed(&request)?;
    debug!(
        "Listing page {} ({} of {} images)",
        page.page,
        page.items.len(),
        page.total
    );

    Ok(Json(page.into()))
}

/// DELETE /api/images/:image_id
pub async fn delete_image_handler(
    State(state): State<Arc<AppState>>,
    Path(image_id): Path<String>,
) -> Result<Json<DeleteImageResponse>, ApiError> {
    validate_image_id(&image_id)?;

    let outcome = state.store.delete(&image_id)?;
    Ok(Json(DeleteImageResponse::new(&image_id, outcome)))
}

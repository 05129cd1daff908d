// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::Serialize;

use crate::storage::{DeleteOutcome, ImageEntry, ImagePage};

#[derive(Debug, Clone, Serialize)]
pub struct ListImagesResponse {
    pub items: Vec<ImageEntry>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl From<ImagePage> for ListImagesResponse {
    fn from(page: ImagePage) -> Self {
        Self {
            items: page.items,
            total: page.total,
            page: page.page,
            page_size: page.page_size,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteImageResponse {
    pub message: String,
    pub processed_deleted: bool,
    pub original_deleted: bool,
}

impl DeleteImageResponse {
    pub fn new(image_id: &str, outcome: DeleteOutcome) -> Self {
        Self {
            message: format!("Image '{}' deleted successfully", image_id),
            processed_deleted: outcome.processed_deleted,
            original_deleted: outcome.original_deleted,
        }
    }
}

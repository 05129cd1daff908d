// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::Deserialize;

use crate::detection::DetectionError;
use crate::storage::pagination::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use crate::storage::PageRequest;

/// Query string of `GET /api/images`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListImagesQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl ListImagesQuery {
    /// Apply defaults and validate bounds
    pub fn to_page_request(&self) -> Result<PageRequest, DetectionError> {
        PageRequest::new(
            self.page.unwrap_or(DEFAULT_PAGE),
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}

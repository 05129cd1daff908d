// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod image_store;
pub mod pagination;

pub use image_store::{
    validate_image_id, DeleteOutcome, ImageEntry, ImagePage, ImageStore, SavedUpload,
    PROCESSED_URL_PREFIX, UPLOADS_URL_PREFIX,
};
pub use pagination::PageRequest;

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};

use crate::storage::SavedUpload;

/// One stored file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    pub original_filename: String,
    /// `<uuid><ext>`; its stem is the image id used by the other endpoints
    pub saved_filename: String,
    pub file_path: String,
    pub size: usize,
    pub content_type: Option<String>,
}

impl UploadedFile {
    pub fn new(saved: SavedUpload, content_type: Option<String>) -> Self {
        Self {
            original_filename: saved.original_filename,
            saved_filename: saved.saved_filename,
            file_path: saved.file_path.display().to_string(),
            size: saved.size,
            content_type,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub files_count: usize,
    pub files: Vec<UploadedFile>,
    pub upload_directory: String,
}

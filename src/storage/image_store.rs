// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Flat-directory image storage
//!
//! Originals live in the upload directory, annotated images in the processed
//! directory under `processed_<image_id>`. The directory listing is the only
//! index; nothing is locked, so concurrent writers to the same name race and
//! the last one wins.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::pagination::PageRequest;
use crate::config::NodeConfig;
use crate::detection::DetectionError;

/// Prefix of every annotated image filename
pub const PROCESSED_PREFIX: &str = "processed_";

/// URL prefix under which originals are served
pub const UPLOADS_URL_PREFIX: &str = "/api/uploads";

/// URL prefix under which annotated images are served
pub const PROCESSED_URL_PREFIX: &str = "/api/processed_uploads";

/// Extensions included in listings (compared case-insensitively)
pub const LISTABLE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Reject identifiers that could escape the storage directories
pub fn validate_image_id(image_id: &str) -> Result<(), DetectionError> {
    if image_id.trim().is_empty() {
        return Err(DetectionError::validation("image_id", "image_id must not be empty"));
    }
    if image_id.contains(['/', '\\']) || image_id.contains("..") {
        return Err(DetectionError::validation(
            "image_id",
            "image_id must not contain path separators or '..'",
        ));
    }
    if image_id.chars().any(char::is_control) {
        return Err(DetectionError::validation(
            "image_id",
            "image_id must not contain control characters",
        ));
    }
    Ok(())
}

/// A file written by [`ImageStore::save_upload`]
#[derive(Debug, Clone)]
pub struct SavedUpload {
    pub original_filename: String,
    pub saved_filename: String,
    pub file_path: PathBuf,
    pub size: usize,
}

/// One row of the processed-image listing
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImageEntry {
    pub id: String,
    pub filename: String,
    #[serde(rename = "uploadDate")]
    pub upload_date: String,
    pub url: String,
    #[serde(skip)]
    modified: SystemTime,
}

/// A page of the processed-image listing
#[derive(Debug, Clone, Serialize)]
pub struct ImagePage {
    pub items: Vec<ImageEntry>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

/// Which files a deletion removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub processed_deleted: bool,
    pub original_deleted: bool,
}

pub struct ImageStore {
    upload_dir: PathBuf,
    processed_dir: PathBuf,
}

impl ImageStore {
    pub fn new(upload_dir: impl Into<PathBuf>, processed_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            processed_dir: processed_dir.into(),
        }
    }

    pub fn from_config(config: &NodeConfig) -> Self {
        Self::new(config.upload_dir.clone(), config.processed_dir.clone())
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn processed_dir(&self) -> &Path {
        &self.processed_dir
    }

    /// Deterministic name of the annotated image for `image_id`
    pub fn processed_name(image_id: &str) -> String {
        format!("{}{}", PROCESSED_PREFIX, image_id)
    }

    pub fn processed_path(&self, image_id: &str) -> PathBuf {
        self.processed_dir.join(Self::processed_name(image_id))
    }

    pub fn processed_url(image_id: &str) -> String {
        format!("{}/{}", PROCESSED_URL_PREFIX, Self::processed_name(image_id))
    }

    /// Find the original upload for `image_id`
    pub fn locate_upload(&self, image_id: &str) -> Result<PathBuf, DetectionError> {
        let files = regular_files(&self.upload_dir)
            .map_err(|e| DetectionError::io("Failed to scan upload directory", e))?;
        find_match(&files, image_id).ok_or_else(|| {
            warn!("Image not found: {}", image_id);
            DetectionError::NotFound(image_id.to_string())
        })
    }

    pub fn read_upload(&self, path: &Path) -> Result<Vec<u8>, DetectionError> {
        std::fs::read(path).map_err(|e| DetectionError::io("Failed to read image file", e))
    }

    /// Write (or overwrite) the annotated image for `image_id`
    pub fn write_processed(&self, image_id: &str, bytes: &[u8]) -> Result<PathBuf, DetectionError> {
        let path = self.processed_path(image_id);
        std::fs::write(&path, bytes)
            .map_err(|e| DetectionError::io("Failed to save processed image", e))?;
        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Store an uploaded file under a fresh `<uuid><ext>` name
    pub fn save_upload(&self, original_filename: &str, bytes: &[u8]) -> Result<SavedUpload, DetectionError> {
        let extension = Path::new(original_filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();
        let saved_filename = format!("{}{}", Uuid::new_v4(), extension);
        let file_path = self.upload_dir.join(&saved_filename);

        if let Err(e) = std::fs::write(&file_path, bytes) {
            if file_path.exists() {
                let _ = std::fs::remove_file(&file_path);
            }
            return Err(DetectionError::io(
                format!("Failed to save file {}", original_filename),
                e,
            ));
        }

        info!(
            "Saved upload {} as {} ({} bytes)",
            original_filename, saved_filename, bytes.len()
        );

        Ok(SavedUpload {
            original_filename: original_filename.to_string(),
            saved_filename,
            file_path,
            size: bytes.len(),
        })
    }

    /// List annotated images, newest first, one page at a time
    pub fn list_processed(&self, request: &PageRequest) -> Result<ImagePage, DetectionError> {
        let mut entries = if self.processed_dir.is_dir() {
            regular_files(&self.processed_dir)
                .map_err(|e| DetectionError::io("Failed to list processed images", e))?
                .into_iter()
                .filter(|path| is_listable(path))
                .filter_map(|path| listing_entry(&path))
                .collect::<Vec<_>>()
        } else {
            Vec::new()
        };

        entries.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| a.filename.cmp(&b.filename))
        });

        let total = entries.len();
        let items = request.slice(&entries).to_vec();

        Ok(ImagePage {
            items,
            total,
            page: request.page(),
            page_size: request.page_size(),
        })
    }

    /// Remove the annotated and original files matching `image_id`
    ///
    /// Each side is looked up independently. Fails with `NotFound` only when
    /// neither file existed.
    pub fn delete(&self, image_id: &str) -> Result<DeleteOutcome, DetectionError> {
        let processed_deleted = remove_match(&self.processed_dir, image_id)
            .map_err(|e| DetectionError::io("Failed to delete processed image", e))?;
        let original_deleted = remove_match(&self.upload_dir, image_id)
            .map_err(|e| DetectionError::io("Failed to delete original image", e))?;

        if !processed_deleted && !original_deleted {
            return Err(DetectionError::NotFound(image_id.to_string()));
        }

        info!(
            "Deleted image {} (processed={}, original={})",
            image_id, processed_deleted, original_deleted
        );
        Ok(DeleteOutcome {
            processed_deleted,
            original_deleted,
        })
    }
}

/// Regular files directly under `dir`, sorted by filename
fn regular_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Exact filename or stem match first, otherwise the first substring match
fn find_match(files: &[PathBuf], image_id: &str) -> Option<PathBuf> {
    let name_of = |path: &PathBuf| {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    let stem_of = |path: &PathBuf| {
        path.file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    };

    files
        .iter()
        .find(|path| name_of(path) == image_id || stem_of(path) == image_id)
        .or_else(|| files.iter().find(|path| name_of(path).contains(image_id)))
        .cloned()
}

fn remove_match(dir: &Path, image_id: &str) -> std::io::Result<bool> {
    if !dir.is_dir() {
        return Ok(false);
    }
    match find_match(&regular_files(dir)?, image_id) {
        Some(path) => {
            std::fs::remove_file(&path)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn is_listable(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| LISTABLE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn listing_entry(path: &Path) -> Option<ImageEntry> {
    let filename = path.file_name()?.to_string_lossy().into_owned();
    let id = path.file_stem()?.to_string_lossy().into_owned();
    let modified = match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => modified,
        Err(e) => {
            debug!("Skipping {} in listing: {}", path.display(), e);
            return None;
        }
    };

    Some(ImageEntry {
        url: format!("{}/{}", PROCESSED_URL_PREFIX, filename),
        upload_date: DateTime::<Utc>::from(modified).to_rfc3339(),
        id,
        filename,
        modified,
    })
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection orchestrator
//!
//! Stateless per request: locate → read → call remote → normalize → render,
//! then either persist and return a URL, or hand the bytes back for
//! streaming. Single attempt, no retries, no cleanup on late failures.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use super::client::ObjectDetector;
use super::errors::DetectionError;
use super::normalizer::normalize_detections;
use super::types::Detection;
use crate::storage::{validate_image_id, ImageStore};
use crate::vision::AnnotationRenderer;

/// Result of the persisting variant
#[derive(Debug, Clone)]
pub struct StoredDetection {
    pub image_id: String,
    pub processed_path: PathBuf,
    pub processed_url: String,
    pub detections: Vec<Detection>,
}

/// Result of the streaming variant
#[derive(Debug, Clone)]
pub struct RenderedDetection {
    pub image_id: String,
    pub filename: String,
    pub bytes: Vec<u8>,
    pub detections: Vec<Detection>,
}

struct Annotated {
    detections: Vec<Detection>,
    bytes: Vec<u8>,
}

pub struct DetectionService {
    store: Arc<ImageStore>,
    detector: Arc<dyn ObjectDetector>,
    renderer: Arc<AnnotationRenderer>,
}

impl DetectionService {
    pub fn new(
        store: Arc<ImageStore>,
        detector: Arc<dyn ObjectDetector>,
        renderer: Arc<AnnotationRenderer>,
    ) -> Self {
        Self {
            store,
            detector,
            renderer,
        }
    }

    pub fn store(&self) -> &Arc<ImageStore> {
        &self.store
    }

    /// Detect, annotate, and write `processed_<image_id>`
    pub async fn detect_and_store(&self, image_id: &str) -> Result<StoredDetection, DetectionError> {
        let annotated = self.annotate(image_id).await?;
        let processed_path = self.store.write_processed(image_id, &annotated.bytes)?;

        info!(
            "Successfully detected {} objects in image {} and saved processed image",
            annotated.detections.len(),
            image_id
        );

        Ok(StoredDetection {
            image_id: image_id.to_string(),
            processed_path,
            processed_url: ImageStore::processed_url(image_id),
            detections: annotated.detections,
        })
    }

    /// Detect and annotate without touching the processed directory
    pub async fn detect_and_render(&self, image_id: &str) -> Result<RenderedDetection, DetectionError> {
        let annotated = self.annotate(image_id).await?;

        info!(
            "Successfully processed image {} with {} objects",
            image_id,
            annotated.detections.len()
        );

        Ok(RenderedDetection {
            image_id: image_id.to_string(),
            filename: ImageStore::processed_name(image_id),
            bytes: annotated.bytes,
            detections: annotated.detections,
        })
    }

    async fn annotate(&self, image_id: &str) -> Result<Annotated, DetectionError> {
        let start = Instant::now();
        validate_image_id(image_id)?;

        let source = self.store.locate_upload(image_id)?;
        debug!("Image {} resolved to {}", image_id, source.display());
        let image = self.store.read_upload(&source)?;

        let response = self.detector.analyze(&image).await?;
        let detections = normalize_detections(&response);
        let bytes = self.renderer.render(&image, &detections)?;

        debug!(
            "Annotated {} in {}ms",
            image_id,
            start.elapsed().as_millis()
        );
        Ok(Annotated { detections, bytes })
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection pipeline
//!
//! This module provides:
//! - The remote vision client behind the [`ObjectDetector`] seam
//! - Tolerant normalization of the remote payload into [`Detection`] records
//! - [`DetectionService`], which runs locate → read → detect → render → persist

pub mod client;
pub mod errors;
pub mod normalizer;
pub mod service;
pub mod types;

pub use client::{AzureVisionClient, ObjectDetector};
pub use errors::DetectionError;
pub use normalizer::{normalize_detections, parse_detection, SkipReason};
pub use service::{DetectionService, RenderedDetection, StoredDetection};
pub use types::Detection;

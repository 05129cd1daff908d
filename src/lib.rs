// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod detection;
pub mod storage;
pub mod version;
pub mod vision;

pub use api::{create_app, start_server, AppState};
pub use config::NodeConfig;
pub use detection::{AzureVisionClient, Detection, DetectionError, DetectionService, ObjectDetector};
pub use storage::ImageStore;
pub use vision::AnnotationRenderer;

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection endpoints
//!
//! `GET /api/detections/:image_id` annotates an upload and returns the URL of
//! the stored result. `GET /api/detections/:image_id/image` streams the
//! annotated JPEG without storing it.

pub mod handler;
pub mod response;

pub use handler::{detect_image_handler, detect_objects_handler};
pub use response::DetectionResponse;

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart upload endpoint
//!
//! Provides POST /api/upload for storing images to be annotated later.

pub mod handler;
pub mod response;

pub use handler::upload_handler;
pub use response::{UploadResponse, UploadedFile};

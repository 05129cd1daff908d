// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Processed image listing and deletion

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{delete_image_handler, list_images_handler};
pub use request::ListImagesQuery;
pub use response::{DeleteImageResponse, ListImagesResponse};

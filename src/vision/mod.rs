// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image decoding, encoding and annotation
//!
//! Detection itself is delegated to the remote service; this module only
//! draws the results.

pub mod font;
pub mod image_utils;
pub mod renderer;

pub use image_utils::{decode_image_bytes, detect_format, encode_jpeg, ImageError, ImageInfo};
pub use renderer::AnnotationRenderer;

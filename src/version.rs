// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the vision overlay node

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-object-overlay-2026-10-16";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.1.0";

/// Build date
pub const BUILD_DATE: &str = "2026-10-16";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "multipart-upload",
    "remote-object-detection",
    "bounding-box-overlay",
    "processed-image-listing",
    "image-deletion",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Vision Overlay Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get version info for the root endpoint
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "message": "Welcome to the Vision Overlay Node",
        "version": VERSION_NUMBER,
        "build": VERSION,
        "features": FEATURES,
    })
}

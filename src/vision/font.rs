// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Label font discovery

use std::path::{Path, PathBuf};

use ab_glyph::FontVec;
use tracing::{debug, info, warn};

/// Well-known TrueType locations tried when no font is configured
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Load a font from a single file
pub fn load_font_file(path: &Path) -> Option<FontVec> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("Font {} not readable: {}", path.display(), e);
            return None;
        }
    };

    match FontVec::try_from_vec(bytes) {
        Ok(font) => Some(font),
        Err(e) => {
            warn!("Font {} is not a valid TrueType/OpenType font: {}", path.display(), e);
            None
        }
    }
}

/// Resolve the label font
///
/// A configured path is tried first, then the system candidates. Returns
/// `None` when nothing loads; callers fall back to estimated text metrics.
pub fn load_label_font(configured: Option<&Path>) -> Option<FontVec> {
    let candidates = configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from));

    for path in candidates {
        if let Some(font) = load_font_file(&path) {
            info!("Label font loaded from {}", path.display());
            return Some(font);
        }
    }

    warn!("No label font available, using estimated text metrics");
    None
}

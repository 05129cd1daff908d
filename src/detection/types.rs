// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection record shared by the normalizer and the renderer

use serde::{Deserialize, Serialize};

/// One labelled rectangle reported by the remote vision service
///
/// Coordinates are absolute pixels: `(x, y)` is the top-left corner and
/// `w`/`h` the extent. `score` is the service confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub score: f32,
}

impl Detection {
    /// Inclusive pixel corners `(x1, y1, x2, y2)`, truncated toward zero
    ///
    /// Negative extents are tolerated by ordering the corners.
    pub fn pixel_corners(&self) -> (i32, i32, i32, i32) {
        let (ax, bx) = (self.x as i32, (self.x + self.w) as i32);
        let (ay, by) = (self.y as i32, (self.y + self.h) as i32);
        (ax.min(bx), ay.min(by), ax.max(bx), ay.max(by))
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Annotation renderer
//!
//! Burns detection rectangles and `label (score)` captions into an image and
//! re-encodes the result as JPEG. Colours cycle through a fixed palette by
//! detection index, so the same input always renders the same output.

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use tracing::debug;

use super::font::load_label_font;
use super::image_utils::{decode_image_bytes, encode_jpeg, ImageError};
use crate::detection::Detection;

/// Box colours, assigned as `PALETTE[i % PALETTE.len()]`
pub const PALETTE: [[u8; 3]; 10] = [
    [0xFF, 0x00, 0x00], // red
    [0x00, 0xFF, 0x00], // green
    [0x00, 0x00, 0xFF], // blue
    [0xFF, 0xFF, 0x00], // yellow
    [0xFF, 0x00, 0xFF], // magenta
    [0x00, 0xFF, 0xFF], // cyan
    [0xFF, 0xA5, 0x00], // orange
    [0x80, 0x00, 0x80], // purple
    [0xFF, 0xC0, 0xCB], // pink
    [0xA5, 0x2A, 0x2A], // brown
];

pub const STROKE_WIDTH: i32 = 3;
pub const LABEL_FONT_SIZE: f32 = 16.0;
/// Gap between the rectangle edge and its label box
pub const LABEL_MARGIN: i32 = 5;
/// Padding between the label box border and the text
pub const LABEL_PADDING: i32 = 2;
/// Estimated glyph width when no font is loaded
pub const FALLBACK_CHAR_WIDTH: i32 = 8;
/// Estimated line height when no font is loaded
pub const FALLBACK_TEXT_HEIGHT: i32 = 12;

const LABEL_TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Colour for the detection at `index`
pub fn color_for(index: usize) -> Rgb<u8> {
    Rgb(PALETTE[index % PALETTE.len()])
}

/// Caption drawn for a detection, e.g. `person (0.87)`
pub fn label_text(detection: &Detection) -> String {
    format!("{} ({:.2})", detection.label, detection.score)
}

pub struct AnnotationRenderer {
    font: Option<FontVec>,
    font_size: f32,
}

impl AnnotationRenderer {
    pub fn new(font: Option<FontVec>) -> Self {
        Self {
            font,
            font_size: LABEL_FONT_SIZE,
        }
    }

    /// Renderer using estimated metrics and no glyph rasterisation
    pub fn without_font() -> Self {
        Self::new(None)
    }

    /// Renderer with the configured font, or the first system font that loads
    pub fn from_font_path(path: Option<&Path>) -> Self {
        Self::new(load_label_font(path))
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Width and height of `text` in pixels
    pub fn measure(&self, text: &str) -> (i32, i32) {
        match &self.font {
            Some(font) => {
                let (w, h) = text_size(PxScale::from(self.font_size), font, text);
                (w as i32, h as i32)
            }
            None => (
                text.chars().count() as i32 * FALLBACK_CHAR_WIDTH,
                FALLBACK_TEXT_HEIGHT,
            ),
        }
    }

    /// Decode `image_bytes`, draw every detection, and encode as JPEG
    pub fn render(&self, image_bytes: &[u8], detections: &[Detection]) -> Result<Vec<u8>, ImageError> {
        let (decoded, info) = decode_image_bytes(image_bytes)?;
        debug!(
            "Rendering {} detections on {}x{} {:?} image",
            detections.len(),
            info.width,
            info.height,
            info.format
        );

        let mut canvas = match decoded {
            DynamicImage::ImageRgb8(rgb) => rgb,
            other => other.to_rgb8(),
        };
        self.annotate(&mut canvas, detections);
        encode_jpeg(canvas)
    }

    /// Draw every detection onto `image` in place
    pub fn annotate(&self, image: &mut RgbImage, detections: &[Detection]) {
        for (index, detection) in detections.iter().enumerate() {
            self.draw_detection(image, detection, color_for(index));
        }
    }

    fn draw_detection(&self, image: &mut RgbImage, detection: &Detection, color: Rgb<u8>) {
        let (x1, y1, x2, y2) = detection.pixel_corners();
        let (x1, y1, x2, y2) = (x1 as i64, y1 as i64, x2 as i64, y2 as i64);

        draw_outline(image, x1, y1, x2, y2, color);

        let text = label_text(detection);
        let (text_width, text_height) = self.measure(&text);
        let (text_width, text_height) = (text_width as i64, text_height as i64);
        let (margin, padding) = (LABEL_MARGIN as i64, LABEL_PADDING as i64);

        // Above the box when it fits, otherwise below it
        let label_x = x1;
        let above = y1 - text_height - margin;
        let label_y = if above > 0 { above } else { y2 + margin };

        let Some(background) = clip_rect(
            image,
            label_x,
            label_y,
            label_x + text_width + 2 * padding,
            label_y + text_height + 2 * padding,
        ) else {
            return;
        };
        draw_filled_rect_mut(image, background, color);

        // The label overlaps the canvas, so its origin fits in i32
        if let Some(font) = &self.font {
            draw_text_mut(
                image,
                LABEL_TEXT_COLOR,
                (label_x + padding) as i32,
                (label_y + padding) as i32,
                PxScale::from(self.font_size),
                font,
                &text,
            );
        }
    }
}

/// Inclusive rectangle clipped to one pixel beyond each canvas edge
///
/// Sides lying off the canvas stay off it, so hollow outlines keep their
/// shape. `None` when nothing of the rectangle reaches the canvas.
fn clip_rect(image: &RgbImage, left: i64, top: i64, right: i64, bottom: i64) -> Option<Rect> {
    let (width, height) = (image.width() as i64, image.height() as i64);
    let (left, top) = (left.max(-1), top.max(-1));
    let (right, bottom) = (right.min(width), bottom.min(height));
    if right < left || bottom < top {
        return None;
    }
    Some(
        Rect::at(left as i32, top as i32)
            .of_size((right - left + 1) as u32, (bottom - top + 1) as u32),
    )
}

/// Outline the inclusive rectangle `(x1, y1)..=(x2, y2)`, strokes growing inward
fn draw_outline(image: &mut RgbImage, x1: i64, y1: i64, x2: i64, y2: i64, color: Rgb<u8>) {
    for inset in 0..STROKE_WIDTH as i64 {
        let (left, top) = (x1 + inset, y1 + inset);
        let (right, bottom) = (x2 - inset, y2 - inset);
        if right < left || bottom < top {
            break;
        }
        if let Some(rect) = clip_rect(image, left, top, right, bottom) {
            draw_hollow_rect_mut(image, rect, color);
        }
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tolerant translation of the remote vision payload into [`Detection`] records
//!
//! Expected shape:
//! ```json
//! { "objects": [
//!     { "rectangle": { "x": 25, "y": 43, "w": 172, "h": 140 },
//!       "object": "dog", "confidence": 0.93 } ] }
//! ```
//! A malformed element is skipped on its own; the rest of the batch survives.

use std::fmt;

use serde_json::Value;
use tracing::{debug, warn};

use super::types::Detection;

/// Label used when an element carries no `object` field
pub const UNKNOWN_LABEL: &str = "unknown";

/// Why an element of the `objects` array was dropped
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NotAnObject,
    RectangleNotAnObject,
    NonNumeric { field: &'static str },
    LabelNotAString,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotAnObject => write!(f, "element is not an object"),
            SkipReason::RectangleNotAnObject => write!(f, "rectangle is not an object"),
            SkipReason::NonNumeric { field } => write!(f, "field '{}' is not numeric", field),
            SkipReason::LabelNotAString => write!(f, "label is not a string"),
        }
    }
}

/// Coerce an optional JSON value to `f32`; absent means zero
///
/// Numbers and numeric strings are accepted, anything else is rejected.
fn coerce_number(value: Option<&Value>, field: &'static str) -> Result<f32, SkipReason> {
    match value {
        None => Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(|v| v as f32)
            .ok_or(SkipReason::NonNumeric { field }),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(|v| v as f32)
            .map_err(|_| SkipReason::NonNumeric { field }),
        Some(_) => Err(SkipReason::NonNumeric { field }),
    }
}

/// Parse one element of the `objects` array
pub fn parse_detection(element: &Value) -> Result<Detection, SkipReason> {
    let object = element.as_object().ok_or(SkipReason::NotAnObject)?;

    let empty = serde_json::Map::new();
    let rect = match object.get("rectangle") {
        None => &empty,
        Some(Value::Object(rect)) => rect,
        Some(_) => return Err(SkipReason::RectangleNotAnObject),
    };

    let x = coerce_number(rect.get("x"), "x")?;
    let y = coerce_number(rect.get("y"), "y")?;
    let w = coerce_number(rect.get("w"), "w")?;
    let h = coerce_number(rect.get("h"), "h")?;

    let label = match object.get("object") {
        None => UNKNOWN_LABEL.to_string(),
        Some(Value::String(label)) => label.clone(),
        Some(_) => return Err(SkipReason::LabelNotAString),
    };

    let score = coerce_number(object.get("confidence"), "confidence")?;

    Ok(Detection {
        label,
        x,
        y,
        w,
        h,
        score,
    })
}

/// Normalize a raw remote response into detection records
///
/// Never fails: a missing `objects` list yields an empty vector, and
/// malformed elements are logged and skipped. Input order is preserved.
pub fn normalize_detections(response: &Value) -> Vec<Detection> {
    let objects = match response.get("objects") {
        Some(Value::Array(objects)) => objects,
        Some(_) => {
            warn!("'objects' field in vision response is not a list");
            return Vec::new();
        }
        None => {
            warn!("No 'objects' field in vision response");
            return Vec::new();
        }
    };

    let detections: Vec<Detection> = objects
        .iter()
        .enumerate()
        .filter_map(|(index, element)| match parse_detection(element) {
            Ok(detection) => Some(detection),
            Err(reason) => {
                warn!("Failed to parse object detection result #{}: {}", index, reason);
                None
            }
        })
        .collect();

    debug!(
        "Normalized {} of {} detection entries",
        detections.len(),
        objects.len()
    );
    detections
}

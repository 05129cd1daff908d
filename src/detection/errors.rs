// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error taxonomy for the detection pipeline and image storage

use thiserror::Error;

use crate::vision::ImageError;

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("Image with ID '{0}' not found")]
    NotFound(String),

    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Remote vision service not configured: {0}")]
    Configuration(String),

    #[error("Remote vision API error: {status}")]
    Upstream { status: u16, body: String },

    #[error("Remote vision API returned an unreadable response: {0}")]
    MalformedResponse(String),

    #[error("Remote vision API timeout")]
    Timeout,

    #[error("Failed to connect to remote vision API: {0}")]
    Connectivity(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid image: {0}")]
    InvalidImage(#[from] ImageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DetectionError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        DetectionError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        DetectionError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

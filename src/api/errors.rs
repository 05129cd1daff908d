// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::error;

use crate::detection::DetectionError;

/// Message returned for unclassified failures; the detail is only logged
pub const GENERIC_INTERNAL_MESSAGE: &str = "Request failed due to an unexpected error";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    NotFound(String),
    InvalidRequest(String),
    ValidationError { field: String, message: String },
    InvalidImage(String),
    ConfigurationError(String),
    UpstreamError { status: Option<u16>, message: String },
    ConnectivityError(String),
    Timeout(String),
    IoError(String),
    InternalError(String),
}

impl ApiError {
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::ValidationError { .. } => "validation_error",
            ApiError::InvalidImage(_) => "invalid_image",
            ApiError::ConfigurationError(_) => "configuration_error",
            ApiError::UpstreamError { .. } => "upstream_error",
            ApiError::ConnectivityError(_) => "connectivity_error",
            ApiError::Timeout(_) => "timeout",
            ApiError::IoError(_) => "io_error",
            ApiError::InternalError(_) => "internal_error",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let (message, details) = match self {
            ApiError::NotFound(msg)
            | ApiError::InvalidRequest(msg)
            | ApiError::InvalidImage(msg)
            | ApiError::ConfigurationError(msg)
            | ApiError::ConnectivityError(msg)
            | ApiError::Timeout(msg)
            | ApiError::IoError(msg) => (msg.clone(), None),
            ApiError::ValidationError { field, message } => {
                let mut details = HashMap::new();
                details.insert(
                    "field".to_string(),
                    serde_json::Value::String(field.clone()),
                );
                (message.clone(), Some(details))
            }
            ApiError::UpstreamError { status, message } => {
                let details = status.map(|status| {
                    let mut details = HashMap::new();
                    details.insert(
                        "upstream_status".to_string(),
                        serde_json::Value::Number(status.into()),
                    );
                    details
                });
                (message.clone(), details)
            }
            ApiError::InternalError(_) => (GENERIC_INTERNAL_MESSAGE.to_string(), None),
        };

        ErrorResponse {
            error_type: self.error_type().to_string(),
            message,
            details,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::InvalidRequest(_) => 400,
            ApiError::ValidationError { .. } | ApiError::InvalidImage(_) => 422,
            ApiError::ConfigurationError(_) | ApiError::IoError(_) | ApiError::InternalError(_) => {
                500
            }
            ApiError::UpstreamError { .. } | ApiError::ConnectivityError(_) => 502,
            ApiError::Timeout(_) => 504,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::InvalidImage(msg) => write!(f, "Invalid image: {}", msg),
            ApiError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            ApiError::UpstreamError { message, .. } => write!(f, "Upstream error: {}", message),
            ApiError::ConnectivityError(msg) => write!(f, "Connectivity error: {}", msg),
            ApiError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            ApiError::IoError(msg) => write!(f, "I/O error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<DetectionError> for ApiError {
    fn from(err: DetectionError) -> Self {
        match err {
            DetectionError::NotFound(_) => ApiError::NotFound(err.to_string()),
            DetectionError::Validation { field, message } => {
                ApiError::ValidationError { field, message }
            }
            DetectionError::Configuration(_) => ApiError::ConfigurationError(
                "Remote vision service not configured. Please set VISION_ENDPOINT and VISION_KEY env vars."
                    .to_string(),
            ),
            DetectionError::Upstream { status, .. } => ApiError::UpstreamError {
                status: Some(status),
                message: err.to_string(),
            },
            DetectionError::MalformedResponse(_) => ApiError::UpstreamError {
                status: None,
                message: "Remote vision API returned an unreadable response".to_string(),
            },
            DetectionError::Timeout => ApiError::Timeout(err.to_string()),
            DetectionError::Connectivity(_) => ApiError::ConnectivityError(err.to_string()),
            DetectionError::Io { context, source } => {
                error!("{}: {}", context, source);
                ApiError::IoError(context)
            }
            DetectionError::InvalidImage(e) => ApiError::InvalidImage(e.to_string()),
            DetectionError::Internal(detail) => ApiError::InternalError(detail),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::InternalError(detail) = &self {
            error!("Unexpected error: {}", detail);
        }
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_response())).into_response()
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Remote object-detection client
//!
//! [`ObjectDetector`] is the seam the orchestrator depends on; the
//! production implementation calls the Azure Computer Vision v3.2 analyze
//! endpoint once per request, with no retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info};

use super::errors::DetectionError;
use crate::config::NodeConfig;

/// Path appended to the configured endpoint
pub const ANALYZE_PATH: &str = "/vision/v3.2/analyze";

/// Header carrying the subscription key
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Sends raw image bytes to an object-detection service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectDetector: Send + Sync {
    /// Analyze an image and return the raw JSON response
    async fn analyze(&self, image: &[u8]) -> Result<Value, DetectionError>;
}

/// Client for Azure Computer Vision object detection
pub struct AzureVisionClient {
    client: Client,
    endpoint: Option<String>,
    key: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl AzureVisionClient {
    /// Create a new client
    ///
    /// Missing settings are accepted here and reported on each call.
    pub fn new(
        endpoint: Option<&str>,
        key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, DetectionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DetectionError::Internal(format!("failed to build HTTP client: {}", e)))?;

        let endpoint = non_empty(endpoint).map(|e| e.trim_end_matches('/').to_string());
        info!(
            "Vision client configured: endpoint={}, timeout={}s",
            endpoint.as_deref().unwrap_or("<unset>"),
            timeout.as_secs()
        );

        Ok(Self {
            client,
            endpoint,
            key: non_empty(key),
        })
    }

    pub fn from_config(config: &NodeConfig) -> Result<Self, DetectionError> {
        Self::new(
            config.vision_endpoint.as_deref(),
            config.vision_key.as_deref(),
            config.vision_timeout(),
        )
    }

    /// Full analyze URL, if an endpoint is configured
    pub fn analyze_url(&self) -> Option<String> {
        self.endpoint
            .as_ref()
            .map(|endpoint| format!("{}{}", endpoint, ANALYZE_PATH))
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some() && self.key.is_some()
    }
}

fn classify_transport_error(err: reqwest::Error, url: &str) -> DetectionError {
    if err.is_timeout() {
        error!("Vision API timeout calling {}", url);
        DetectionError::Timeout
    } else {
        error!("Vision API request error: {}", err);
        error!("Attempting to connect to: {}", url);
        DetectionError::Connectivity(err.to_string())
    }
}

#[async_trait]
impl ObjectDetector for AzureVisionClient {
    async fn analyze(&self, image: &[u8]) -> Result<Value, DetectionError> {
        let (Some(url), Some(key)) = (self.analyze_url(), self.key.as_deref()) else {
            error!("Vision credentials not configured");
            return Err(DetectionError::Configuration(
                "Please set VISION_ENDPOINT and VISION_KEY".to_string(),
            ));
        };

        debug!("Sending {} bytes to {}", image.len(), url);

        let response = self
            .client
            .post(&url)
            .query(&[("visualFeatures", "Objects")])
            .header(SUBSCRIPTION_KEY_HEADER, key)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await
            .map_err(|e| classify_transport_error(e, &url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Vision API error: {} - {}", status.as_u16(), body);
            return Err(DetectionError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                DetectionError::Timeout
            } else {
                error!("Vision API returned invalid JSON: {}", e);
                DetectionError::MalformedResponse(e.to_string())
            }
        })
    }
}

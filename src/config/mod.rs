// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration
//!
//! Every setting can be given as a command-line flag or through the
//! environment (a `.env` file is loaded by `main` before parsing).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::info;

/// Default timeout for the remote vision API call, in seconds
pub const DEFAULT_VISION_TIMEOUT_SECS: u64 = 30;

/// Vision overlay node configuration
#[derive(Parser, Debug, Clone)]
#[command(name = "vision-overlay-node")]
#[command(about = "Annotates uploaded images with objects detected by a remote vision API", long_about = None)]
pub struct NodeConfig {
    /// Address the HTTP server binds to
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8000")]
    pub listen_addr: SocketAddr,

    /// Directory holding original uploads
    #[arg(long, env = "UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// Directory holding annotated images
    #[arg(long, env = "PROCESSED_DIR", default_value = "processed_uploads")]
    pub processed_dir: PathBuf,

    /// Base URL of the remote vision service
    #[arg(long, env = "VISION_ENDPOINT")]
    pub vision_endpoint: Option<String>,

    /// Subscription key for the remote vision service
    #[arg(long, env = "VISION_KEY", hide_env_values = true)]
    pub vision_key: Option<String>,

    /// Timeout for a single remote vision call
    #[arg(long, env = "VISION_TIMEOUT_SECS", default_value_t = DEFAULT_VISION_TIMEOUT_SECS)]
    pub vision_timeout_secs: u64,

    /// TrueType font used for detection labels
    #[arg(long = "label-font", env = "LABEL_FONT_PATH")]
    pub label_font_path: Option<PathBuf>,

    /// Origins allowed by CORS (comma separated)
    #[arg(
        long,
        env = "CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:3000,http://localhost:5173,http://localhost:5174"
    )]
    pub cors_origins: Vec<String>,
}

impl NodeConfig {
    /// Configuration rooted at the given directories, everything else default
    pub fn with_dirs(upload_dir: impl Into<PathBuf>, processed_dir: impl Into<PathBuf>) -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            upload_dir: upload_dir.into(),
            processed_dir: processed_dir.into(),
            vision_endpoint: None,
            vision_key: None,
            vision_timeout_secs: DEFAULT_VISION_TIMEOUT_SECS,
            label_font_path: None,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
                "http://localhost:5174".to_string(),
            ],
        }
    }

    pub fn vision_timeout(&self) -> Duration {
        Duration::from_secs(self.vision_timeout_secs)
    }

    /// Create the upload and processed directories
    ///
    /// Called once during startup; components assume the directories exist.
    pub fn prepare_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.upload_dir)?;
        std::fs::create_dir_all(&self.processed_dir)?;
        info!(
            "Storage ready: uploads={}, processed={}",
            self.upload_dir.display(),
            self.processed_dir.display()
        );
        Ok(())
    }

    /// Log which remote vision settings were found, never their values
    pub fn log_summary(&self) {
        info!("Listen address: {}", self.listen_addr);
        info!(
            "VISION_ENDPOINT loaded: {}",
            if self.vision_endpoint.is_some() { "Yes" } else { "No" }
        );
        info!(
            "VISION_KEY loaded: {}",
            if self.vision_key.is_some() { "Yes" } else { "No" }
        );
        info!("Vision timeout: {}s", self.vision_timeout_secs);
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vision_overlay_node::{api::start_server, version, AppState, NodeConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting {}", version::get_version_string());
    info!("BUILD VERSION: {}", version::VERSION);

    let config = NodeConfig::parse();
    config.log_summary();
    config
        .prepare_directories()
        .context("Failed to create storage directories")?;

    let state = AppState::from_config(config).context("Failed to initialize application state")?;

    start_server(Arc::new(state)).await
}

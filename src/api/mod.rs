// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod detections;
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod images;
pub mod upload;

pub use errors::{ApiError, ErrorResponse};
pub use http_server::{create_app, start_server, AppState};

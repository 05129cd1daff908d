// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};

use super::detections::{detect_image_handler, detect_objects_handler};
use super::handlers::{health_handler, root_handler};
use super::images::{delete_image_handler, list_images_handler};
use super::upload::upload_handler;
use super::ApiError;
use crate::config::NodeConfig;
use crate::detection::{AzureVisionClient, DetectionError, DetectionService, ObjectDetector};
use crate::storage::{ImageStore, PROCESSED_URL_PREFIX, UPLOADS_URL_PREFIX};
use crate::vision::AnnotationRenderer;

/// Upper bound on a multipart upload request body
pub const MAX_UPLOAD_BODY_BYTES: usize = 64 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<NodeConfig>,
    pub store: Arc<ImageStore>,
    pub detection_service: Arc<DetectionService>,
}

impl AppState {
    /// Production state: Azure client and the configured label font
    pub fn from_config(config: NodeConfig) -> Result<Self, DetectionError> {
        let detector = AzureVisionClient::from_config(&config)?;
        if !detector.is_configured() {
            warn!("Remote vision service not configured; detection requests will fail until VISION_ENDPOINT and VISION_KEY are set");
        }
        let renderer = AnnotationRenderer::from_font_path(config.label_font_path.as_deref());
        Ok(Self::with_detector(config, Arc::new(detector), renderer))
    }

    /// State with an explicit detector, e.g. a stub in tests
    pub fn with_detector(
        config: NodeConfig,
        detector: Arc<dyn ObjectDetector>,
        renderer: AnnotationRenderer,
    ) -> Self {
        let store = Arc::new(ImageStore::from_config(&config));
        let detection_service = Arc::new(DetectionService::new(
            store.clone(),
            detector,
            Arc::new(renderer),
        ));
        Self {
            config: Arc::new(config),
            store,
            detection_service,
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    ApiError::InternalError(detail).into_response()
}

pub fn create_app(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(health_handler))
        .route(
            "/upload",
            post(upload_handler).layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES)),
        )
        .route("/detections/:image_id", get(detect_objects_handler))
        .route("/detections/:image_id/image", get(detect_image_handler))
        .route("/images", get(list_images_handler))
        .route("/images/:image_id", delete(delete_image_handler));

    Router::new()
        .route("/", get(root_handler))
        .nest("/api", api)
        .nest_service(
            UPLOADS_URL_PREFIX,
            ServeDir::new(state.config.upload_dir.clone()),
        )
        .nest_service(
            PROCESSED_URL_PREFIX,
            ServeDir::new(state.config.processed_dir.clone()),
        )
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

pub async fn start_server(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = state.config.listen_addr;
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection endpoints against a local stand-in for the vision API

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use image::ImageFormat;
use std::time::Duration;
use tower::util::ServiceExt;
use vision_overlay_node::api::create_app;

use crate::common::*;

const CLIENT_TIMEOUT: Duration = Duration::from_secs(5);

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_upload_detect_and_fetch_processed_image() {
    let vision = spawn_fake_vision(VisionBehavior::Respond(cup_payload())).await;
    let root = tempfile::tempdir().unwrap();
    let state = test_state(temp_config(&root, Some(&vision.base_url)), CLIENT_TIMEOUT);
    let app = create_app(state);

    // Upload
    let upload = Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .header(header::CONTENT_TYPE, multipart_content_type())
        .body(multipart_body(&[Part {
            field: "files[]",
            filename: Some("kitchen.png"),
            content_type: "image/png",
            data: &png_bytes(64, 64),
        }]))
        .unwrap();
    let response = app.clone().oneshot(upload).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let uploaded = body_json(response).await;
    let saved = uploaded["files"][0]["saved_filename"].as_str().unwrap().to_string();
    let image_id = saved.trim_end_matches(".png").to_string();

    // Detect
    let response = app
        .clone()
        .oneshot(get(&format!("/api/detections/{}", image_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let url = body["processed_image_url"].as_str().unwrap().to_string();
    assert_eq!(url, format!("/api/processed_uploads/processed_{}", image_id));
    assert!(root
        .path()
        .join("processed")
        .join(format!("processed_{}", image_id))
        .is_file());

    // The remote call carried the key, the content type and the feature selector
    let requests = vision.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].subscription_key.as_deref(), Some(TEST_KEY));
    assert_eq!(
        requests[0].content_type.as_deref(),
        Some("application/octet-stream")
    );
    assert_eq!(requests[0].visual_features.as_deref(), Some("Objects"));
    assert!(requests[0].body_len > 0);

    // The returned URL resolves to a JPEG
    let response = app.oneshot(get(&url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body_bytes(response).await;
    assert!(image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).is_ok());
}

#[tokio::test]
async fn test_rerun_overwrites_processed_image() {
    let vision = spawn_fake_vision(VisionBehavior::Respond(cup_payload())).await;
    let root = tempfile::tempdir().unwrap();
    let state = test_state(temp_config(&root, Some(&vision.base_url)), CLIENT_TIMEOUT);
    std::fs::write(root.path().join("uploads").join("pic.png"), png_bytes(64, 64)).unwrap();
    let app = create_app(state);

    for _ in 0..2 {
        let response = app.clone().oneshot(get("/api/detections/pic")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(vision.call_count(), 2);
    let processed: Vec<_> = std::fs::read_dir(root.path().join("processed"))
        .unwrap()
        .collect();
    assert_eq!(processed.len(), 1);
}

#[tokio::test]
async fn test_stream_variant_returns_jpeg_without_storing() {
    let vision = spawn_fake_vision(VisionBehavior::Respond(cup_payload())).await;
    let root = tempfile::tempdir().unwrap();
    let state = test_state(temp_config(&root, Some(&vision.base_url)), CLIENT_TIMEOUT);
    std::fs::write(root.path().join("uploads").join("street.png"), png_bytes(64, 64)).unwrap();

    let response = create_app(state)
        .oneshot(get("/api/detections/street/image"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "inline; filename=processed_street"
    );
    let bytes = body_bytes(response).await;
    let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (64, 64));
    assert!(!root.path().join("processed").join("processed_street").exists());
}

#[tokio::test]
async fn test_unknown_image_is_not_found_and_remote_not_called() {
    let vision = spawn_fake_vision(VisionBehavior::Respond(cup_payload())).await;
    let root = tempfile::tempdir().unwrap();
    let state = test_state(temp_config(&root, Some(&vision.base_url)), CLIENT_TIMEOUT);

    let response = create_app(state)
        .oneshot(get("/api/detections/does-not-exist"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error_type"], "not_found");
    assert_eq!(vision.call_count(), 0);
}

#[tokio::test]
async fn test_missing_credentials_is_configuration_error() {
    let root = tempfile::tempdir().unwrap();
    let state = test_state(temp_config(&root, None), CLIENT_TIMEOUT);
    std::fs::write(root.path().join("uploads").join("pic.png"), png_bytes(32, 32)).unwrap();

    let response = create_app(state)
        .oneshot(get("/api/detections/pic"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error_type"], "configuration_error");
    assert!(body["message"].as_str().unwrap().contains("VISION_ENDPOINT"));
}

#[tokio::test]
async fn test_upstream_rejection_and_timeout_are_distinct() {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(root.path().join("uploads")).unwrap();

    let rejecting = spawn_fake_vision(VisionBehavior::Status(401, "Access denied".into())).await;
    let state = test_state(temp_config(&root, Some(&rejecting.base_url)), CLIENT_TIMEOUT);
    std::fs::write(root.path().join("uploads").join("pic.png"), png_bytes(32, 32)).unwrap();
    let response = create_app(state)
        .oneshot(get("/api/detections/pic"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let upstream = body_json(response).await;
    assert_eq!(upstream["error_type"], "upstream_error");
    assert_eq!(upstream["details"]["upstream_status"], 401);

    let slow = spawn_fake_vision(VisionBehavior::Slow(Duration::from_secs(3))).await;
    let state = test_state(
        temp_config(&root, Some(&slow.base_url)),
        Duration::from_millis(200),
    );
    let response = create_app(state)
        .oneshot(get("/api/detections/pic"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let timeout = body_json(response).await;
    assert_eq!(timeout["error_type"], "timeout");

    assert!(!root.path().join("processed").join("processed_pic").exists());
}

#[tokio::test]
async fn test_unreadable_remote_payload_is_upstream_error() {
    let vision = spawn_fake_vision(VisionBehavior::Garbage).await;
    let root = tempfile::tempdir().unwrap();
    let state = test_state(temp_config(&root, Some(&vision.base_url)), CLIENT_TIMEOUT);
    std::fs::write(root.path().join("uploads").join("pic.png"), png_bytes(32, 32)).unwrap();

    let response = create_app(state)
        .oneshot(get("/api/detections/pic"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["error_type"], "upstream_error");
}

#[tokio::test]
async fn test_unreachable_remote_is_connectivity_error() {
    let root = tempfile::tempdir().unwrap();
    let state = test_state(temp_config(&root, Some("http://127.0.0.1:1")), CLIENT_TIMEOUT);
    std::fs::write(root.path().join("uploads").join("pic.png"), png_bytes(32, 32)).unwrap();

    let response = create_app(state)
        .oneshot(get("/api/detections/pic"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["error_type"], "connectivity_error");
}

#[tokio::test]
async fn test_undecodable_upload_is_invalid_image() {
    let vision = spawn_fake_vision(VisionBehavior::Respond(cup_payload())).await;
    let root = tempfile::tempdir().unwrap();
    let state = test_state(temp_config(&root, Some(&vision.base_url)), CLIENT_TIMEOUT);
    std::fs::write(
        root.path().join("uploads").join("fake.jpg"),
        b"fake image content",
    )
    .unwrap();

    let response = create_app(state)
        .oneshot(get("/api/detections/fake"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error_type"], "invalid_image");
}

#[tokio::test]
async fn test_traversal_identifier_rejected() {
    let vision = spawn_fake_vision(VisionBehavior::Respond(cup_payload())).await;
    let root = tempfile::tempdir().unwrap();
    let state = test_state(temp_config(&root, Some(&vision.base_url)), CLIENT_TIMEOUT);

    let response = create_app(state)
        .oneshot(get("/api/detections/a..b"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error_type"], "validation_error");
    assert_eq!(vision.call_count(), 0);
}

#[tokio::test]
async fn test_processed_write_failure_is_io_error() {
    let vision = spawn_fake_vision(VisionBehavior::Respond(cup_payload())).await;
    let root = tempfile::tempdir().unwrap();
    let state = test_state(temp_config(&root, Some(&vision.base_url)), CLIENT_TIMEOUT);
    std::fs::write(root.path().join("uploads").join("pic.png"), png_bytes(32, 32)).unwrap();
    let processed = root.path().join("processed");
    std::fs::remove_dir_all(&processed).unwrap();
    std::fs::write(&processed, b"occupied").unwrap();

    let response = create_app(state)
        .oneshot(get("/api/detections/pic"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error_type"], "io_error");
    assert_eq!(body["message"], "Failed to save processed image");
    assert_eq!(vision.call_count(), 1);
}

#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_upload_is_io_error() {
    use std::os::unix::fs::PermissionsExt;

    let vision = spawn_fake_vision(VisionBehavior::Respond(cup_payload())).await;
    let root = tempfile::tempdir().unwrap();
    let state = test_state(temp_config(&root, Some(&vision.base_url)), CLIENT_TIMEOUT);
    let path = root.path().join("uploads").join("locked.png");
    std::fs::write(&path, png_bytes(32, 32)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o000)).unwrap();
    if std::fs::read(&path).is_ok() {
        // Permission bits are not enforced for this user (e.g. root)
        return;
    }

    let response = create_app(state)
        .oneshot(get("/api/detections/locked"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error_type"], "io_error");
    assert_eq!(vision.call_count(), 0);
}

#[tokio::test]
async fn test_control_character_identifier_rejected() {
    let vision = spawn_fake_vision(VisionBehavior::Respond(cup_payload())).await;
    let root = tempfile::tempdir().unwrap();
    let state = test_state(temp_config(&root, Some(&vision.base_url)), CLIENT_TIMEOUT);
    std::fs::write(root.path().join("uploads").join("a\nb.png"), png_bytes(16, 16)).unwrap();

    let response = create_app(state)
        .oneshot(get("/api/detections/a%0Ab/image"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error_type"], "validation_error");
    assert_eq!(vision.call_count(), 0);
}

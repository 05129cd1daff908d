// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Listing and deletion of processed images

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use std::fs::File;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tower::util::ServiceExt;
use vision_overlay_node::api::create_app;

use crate::common::*;

fn app(root: &tempfile::TempDir) -> Router {
    create_app(test_state(temp_config(root, None), Duration::from_secs(1)))
}

fn write_with_mtime(path: &Path, age_secs: u64) {
    std::fs::write(path, b"jpeg").unwrap();
    let modified = SystemTime::now() - Duration::from_secs(age_secs);
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(modified)
        .unwrap();
}

async fn list(app: &Router, query: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/images{}", query))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

async fn delete(app: &Router, image_id: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/api/images/{}", image_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn test_pagination_over_five_images() {
    let root = tempfile::tempdir().unwrap();
    let app = app(&root);
    let processed = root.path().join("processed");
    for (age, name) in ["a", "b", "c", "d", "e"].iter().enumerate() {
        write_with_mtime(&processed.join(format!("processed_{}.jpg", name)), age as u64 * 10);
    }

    let mut sizes = Vec::new();
    for page in 1..=4 {
        let (status, body) = list(&app, &format!("?page={}&page_size=2", page)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 5);
        assert_eq!(body["page"], page);
        assert_eq!(body["page_size"], 2);
        sizes.push(body["items"].as_array().unwrap().len());
    }
    assert_eq!(sizes, vec![2, 2, 1, 0]);
}

#[tokio::test]
async fn test_listing_is_newest_first_with_entry_shape() {
    let root = tempfile::tempdir().unwrap();
    let app = app(&root);
    let processed = root.path().join("processed");
    write_with_mtime(&processed.join("processed_old.jpg"), 300);
    write_with_mtime(&processed.join("processed_new.png"), 5);
    write_with_mtime(&processed.join("processed_mid.jpeg"), 60);

    let (status, body) = list(&app, "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 10);

    let items = body["items"].as_array().unwrap();
    let ids: Vec<&str> = items.iter().map(|i| i["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["processed_new", "processed_mid", "processed_old"]);

    let first = &items[0];
    assert_eq!(first["filename"], "processed_new.png");
    assert_eq!(first["url"], "/api/processed_uploads/processed_new.png");
    let date = first["uploadDate"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(date).is_ok());
}

#[tokio::test]
async fn test_listing_skips_other_extensions() {
    let root = tempfile::tempdir().unwrap();
    let app = app(&root);
    let processed = root.path().join("processed");
    write_with_mtime(&processed.join("processed_keep.JPG"), 1);
    write_with_mtime(&processed.join("notes.txt"), 1);
    write_with_mtime(&processed.join("anim.gif"), 1);
    write_with_mtime(&processed.join("processed_noext"), 1);

    let (status, body) = list(&app, "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["filename"], "processed_keep.JPG");
}

#[tokio::test]
async fn test_missing_processed_directory_lists_empty() {
    let root = tempfile::tempdir().unwrap();
    let app = app(&root);
    std::fs::remove_dir_all(root.path().join("processed")).unwrap();

    let (status, body) = list(&app, "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_out_of_range_pagination_is_validation_error() {
    let root = tempfile::tempdir().unwrap();
    let app = app(&root);

    for (query, field) in [
        ("?page=0", "page"),
        ("?page=-1", "page"),
        ("?page_size=0", "page_size"),
        ("?page_size=101", "page_size"),
    ] {
        let (status, body) = list(&app, query).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", query);
        assert_eq!(body["error_type"], "validation_error");
        assert_eq!(body["details"]["field"], field);
    }

    let (status, body) = list(&app, "?page=abc").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_type"], "validation_error");
}

#[tokio::test]
async fn test_page_size_bounds_accepted() {
    let root = tempfile::tempdir().unwrap();
    let app = app(&root);

    let (status, _) = list(&app, "?page=1&page_size=1").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = list(&app, "?page=1&page_size=100").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_removes_original_and_processed() {
    let root = tempfile::tempdir().unwrap();
    let app = app(&root);
    std::fs::write(root.path().join("uploads").join("cat.png"), b"x").unwrap();
    std::fs::write(root.path().join("processed").join("processed_cat.png"), b"x").unwrap();

    let (status, body) = delete(&app, "cat").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Image 'cat' deleted successfully");
    assert_eq!(body["processed_deleted"], true);
    assert_eq!(body["original_deleted"], true);
    assert!(!root.path().join("uploads").join("cat.png").exists());
    assert!(!root.path().join("processed").join("processed_cat.png").exists());
}

#[tokio::test]
async fn test_delete_orphaned_processed_image() {
    let root = tempfile::tempdir().unwrap();
    let app = app(&root);
    std::fs::write(root.path().join("processed").join("processed_dog.jpg"), b"x").unwrap();

    let (status, body) = delete(&app, "dog").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["processed_deleted"], true);
    assert_eq!(body["original_deleted"], false);
}

#[tokio::test]
async fn test_delete_original_only() {
    let root = tempfile::tempdir().unwrap();
    let app = app(&root);
    std::fs::write(root.path().join("uploads").join("bird.jpg"), b"x").unwrap();

    let (status, body) = delete(&app, "bird").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["processed_deleted"], false);
    assert_eq!(body["original_deleted"], true);
}

#[tokio::test]
async fn test_delete_unknown_image_is_not_found() {
    let root = tempfile::tempdir().unwrap();
    let app = app(&root);

    let (status, body) = delete(&app, "nothing-here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_type"], "not_found");
}

#[tokio::test]
async fn test_delete_rejects_traversal_identifier() {
    let root = tempfile::tempdir().unwrap();
    let app = app(&root);
    std::fs::write(root.path().join("uploads").join("keep.png"), b"x").unwrap();

    let (status, body) = delete(&app, "a..b").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_type"], "validation_error");
    assert!(root.path().join("uploads").join("keep.png").exists());
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Artifact resolution tests
//!
//! A throwaway HTTP server on 127.0.0.1 stands in for the artifact host.

use axum::{http::StatusCode, routing::get, Router};
use mammo_screen::classifier::{ensure_artifact, loader::fetch_artifact, ClassifierError, ModelSource};
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

const ARTIFACT_BYTES: &[u8] = b"fake-onnx-artifact-bytes";

async fn spawn_artifact_host() -> SocketAddr {
    let app = Router::new()
        .route("/model.onnx", get(|| async { ARTIFACT_BYTES }))
        .route("/empty.onnx", get(|| async { "" }))
        .route("/missing.onnx", get(|| async { StatusCode::NOT_FOUND }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn url(addr: SocketAddr, path: &str) -> Url {
    Url::parse(&format!("http://{}{}", addr, path)).unwrap()
}

/// Test 1: An existing local artifact is used as-is
#[tokio::test]
async fn test_local_artifact_short_circuits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.onnx");
    std::fs::write(&path, b"local").unwrap();

    // The URL is never contacted
    let source = ModelSource::local(&path)
        .with_remote(Url::parse("http://127.0.0.1:9/model.onnx").unwrap(), true);
    assert_eq!(ensure_artifact(&source).await.unwrap(), path);
    assert_eq!(std::fs::read(&path).unwrap(), b"local");
}

/// Test 2: Missing artifact without a URL is unavailable
#[tokio::test]
async fn test_missing_artifact_without_url() {
    let dir = tempfile::tempdir().unwrap();
    let source = ModelSource::local(dir.path().join("model.onnx"));

    match ensure_artifact(&source).await {
        Err(ClassifierError::Unavailable(msg)) => assert!(msg.contains("Model not found")),
        other => panic!("expected Unavailable, got {:?}", other),
    }
}

/// Test 3: Remote fetch is opt-in
#[tokio::test]
async fn test_remote_fetch_disabled_by_default() {
    let addr = spawn_artifact_host().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.onnx");
    let source = ModelSource::local(&path).with_remote(url(addr, "/model.onnx"), false);

    match ensure_artifact(&source).await {
        Err(ClassifierError::Unavailable(msg)) => assert!(msg.contains("ALLOW_REMOTE_MODEL_FETCH")),
        other => panic!("expected Unavailable, got {:?}", other),
    }
    assert!(!path.exists());
}

/// Test 4: Allowed fetch writes the artifact and nothing else
#[tokio::test]
async fn test_remote_fetch_persists_artifact() {
    let addr = spawn_artifact_host().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.onnx");
    let source = ModelSource::local(&path).with_remote(url(addr, "/model.onnx"), true);

    assert_eq!(ensure_artifact(&source).await.unwrap(), path);
    assert_eq!(std::fs::read(&path).unwrap(), ARTIFACT_BYTES);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

/// Test 5: Error statuses are not written to disk
#[tokio::test]
async fn test_error_status_leaves_no_file() {
    let addr = spawn_artifact_host().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.onnx");

    let result = fetch_artifact(&url(addr, "/missing.onnx"), &path, Duration::from_secs(5)).await;
    match result {
        Err(ClassifierError::Unavailable(msg)) => assert!(msg.contains("404")),
        other => panic!("expected Unavailable, got {:?}", other),
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

/// Test 6: An empty body is rejected
#[tokio::test]
async fn test_empty_body_rejected() {
    let addr = spawn_artifact_host().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.onnx");

    let result = fetch_artifact(&url(addr, "/empty.onnx"), &path, Duration::from_secs(5)).await;
    assert!(matches!(result, Err(ClassifierError::Unavailable(_))));
    assert!(!path.exists());
}

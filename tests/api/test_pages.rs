// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Static page and health tests

use axum::http::StatusCode;
use mammo_screen::{
    api::HealthResponse,
    classifier::StaticClassifier,
    pipeline::DEFAULT_INFERENCE_TIMEOUT,
    report::{ReportStore, ReportStoreConfig},
};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use super::common::*;

/// Test 1: Each home page visit increments the counter
#[tokio::test]
async fn test_home_counts_visits() {
    let app = test_app(0.9);

    let first = body_text(app.router.clone().oneshot(get_request("/")).await.unwrap()).await;
    let second = body_text(app.router.clone().oneshot(get_request("/")).await.unwrap()).await;

    assert!(first.contains("Visitors: <strong>1</strong>"));
    assert!(second.contains("Visitors: <strong>2</strong>"));
    assert!(second.contains("action=\"/predict\""));
    assert_eq!(app.state.visitors.current(), 2);
}

/// Test 2: The invalid-image notice is shown after a rejected upload
#[tokio::test]
async fn test_home_shows_invalid_image_notice() {
    let app = test_app(0.9);
    let html = body_text(
        app.router
            .clone()
            .oneshot(get_request("/?error=invalid-image"))
            .await
            .unwrap(),
    )
    .await;
    assert!(html.contains("could not be read as an image"));
}

/// Test 3: Informational pages render and do not count visits
#[tokio::test]
async fn test_informational_pages() {
    let app = test_app(0.9);
    for uri in ["/recommendations", "/faq", "/disclaimer", "/analytics"] {
        let response = app.router.clone().oneshot(get_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        let html = body_text(response).await;
        assert!(!html.contains("{{"), "unfilled placeholder on {}", uri);
    }
    assert_eq!(app.state.visitors.current(), 0);
}

/// Test 4: Analytics counts every prediction served, even once its report is evicted
#[tokio::test]
async fn test_analytics_counters() {
    let app = test_app_with(
        StaticClassifier::new(0.9),
        Arc::new(ReportStore::new(ReportStoreConfig {
            capacity: NonZeroUsize::new(1).unwrap(),
            ttl: Duration::from_secs(60),
        })),
        DEFAULT_INFERENCE_TIMEOUT,
    );
    app.router.clone().oneshot(get_request("/")).await.unwrap();
    for _ in 0..3 {
        let response = app
            .router
            .clone()
            .oneshot(predict_request(multipart_body("file", Some("scan.png"), &black_png())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let html = body_text(app.router.clone().oneshot(get_request("/analytics")).await.unwrap()).await;
    assert!(html.contains("Home page visitors</td><td><strong>1</strong>"));
    assert!(html.contains("Predictions served</td><td><strong>3</strong>"));
    assert!(html.contains("Reports available for download</td><td><strong>1</strong>"));
    assert!(html.contains("<td>0.50</td>"));
    assert_eq!(app.state.predictions.current(), 3);
}

/// Test 5: Health reports the configured threshold
#[tokio::test]
async fn test_health() {
    let app = test_app(0.9);
    let response = app.router.clone().oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health: HealthResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.threshold, 0.5);
    assert_eq!(health.stored_reports, 0);
}

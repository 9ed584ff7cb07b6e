// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Report download tests for GET /reports/:id and GET /download_report

use axum::http::{header, StatusCode};
use tower::ServiceExt;

use super::common::*;

/// Test 1: Nothing to download before the first prediction
#[tokio::test]
async fn test_download_before_any_prediction_is_not_found() {
    let app = test_app(0.9);
    let response = app
        .router
        .clone()
        .oneshot(get_request("/download_report"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Test 2: Unknown and malformed ids are not found
#[tokio::test]
async fn test_unknown_report_ids() {
    let app = test_app(0.9);
    for uri in [
        "/reports/not-a-uuid",
        "/reports/00000000-0000-0000-0000-000000000000",
    ] {
        let response = app.router.clone().oneshot(get_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}

/// Test 3: Downloads carry PDF headers; the legacy route serves the latest report
#[tokio::test]
async fn test_latest_report_download_headers() {
    let app = test_app(0.9);
    let response = app
        .router
        .clone()
        .oneshot(predict_request(multipart_body("file", Some("scan.png"), &black_png())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .clone()
        .oneshot(get_request("/download_report"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"prediction_report.pdf\""
    );

    let pdf = body_bytes(response).await;
    assert!(pdf.starts_with(b"%PDF"));
    assert!(contains(&pdf, "Mammogram Cancer Prediction Report"));
    assert!(contains(&pdf, "Prediction Result: Malignant"));
}

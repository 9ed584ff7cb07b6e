// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared helpers for API tests: app construction, uploads, and body reads

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Request},
    response::Response,
    Router,
};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use mammo_screen::{
    api::{create_router, AppState},
    classifier::{ClassifierHandle, StaticClassifier},
    decision::DecisionPolicy,
    pipeline::{Predictor, DEFAULT_INFERENCE_TIMEOUT},
    report::{ReportStore, ReportStoreConfig},
    vision::TargetSize,
};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

pub const BOUNDARY: &str = "mammo-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub classifier: Arc<StaticClassifier>,
}

pub fn test_app(score: f32) -> TestApp {
    test_app_with(
        StaticClassifier::new(score),
        Arc::new(ReportStore::new(ReportStoreConfig::default())),
        DEFAULT_INFERENCE_TIMEOUT,
    )
}

pub fn test_app_with(
    classifier: StaticClassifier,
    reports: Arc<ReportStore>,
    inference_timeout: Duration,
) -> TestApp {
    let classifier = Arc::new(classifier);
    let handle: ClassifierHandle = classifier.clone();
    let predictor = Predictor::new(
        handle,
        DecisionPolicy::default(),
        TargetSize::default(),
        inference_timeout,
    )
    .expect("static classifier matches the default target");

    let state = AppState::new(predictor, reports);
    TestApp {
        router: create_router(state.clone()),
        state,
        classifier,
    }
}

/// 256x256 black grayscale PNG
pub fn black_png() -> Vec<u8> {
    let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(256, 256, Luma([0])));
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    buf
}

/// Multipart body with a single field
pub fn multipart_body(field: &str, filename: Option<&str>, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    match filename {
        Some(name) => body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                field, name
            )
            .as_bytes(),
        ),
        None => body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", field).as_bytes(),
        ),
    }
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn predict_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn json_request(uri: &str, json: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub fn contains(haystack: &[u8], needle: &str) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle.as_bytes())
}

/// Pull the `/reports/<id>` link out of a result page
pub fn report_url(html: &str) -> String {
    let start = html.find("/reports/").expect("result page links a report");
    let end = html[start..]
        .find('"')
        .map(|offset| start + offset)
        .expect("report link is quoted");
    html[start..end].to_string()
}

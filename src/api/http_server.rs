// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{DefaultBodyLimit, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use super::classify::classify_handler;
use super::pages::{
    analytics_handler, disclaimer_handler, faq_handler, home_handler, recommendations_handler,
};
use super::predict::predict_form_handler;
use super::reports::{download_latest_handler, download_report_handler};
use super::counters::Counter;
use crate::pipeline::Predictor;
use crate::report::ReportStore;

/// Request body cap; leaves room for multipart framing and base64 overhead
/// on top of the 10 MiB image limit
pub const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
    pub reports: Arc<ReportStore>,
    /// Home page visits
    pub visitors: Arc<Counter>,
    /// Successful predictions whose report was stored
    pub predictions: Arc<Counter>,
}

impl AppState {
    pub fn new(predictor: Predictor, reports: Arc<ReportStore>) -> Self {
        Self {
            predictor: Arc::new(predictor),
            reports,
            visitors: Arc::new(Counter::new()),
            predictions: Arc::new(Counter::new()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub threshold: f32,
    pub stored_reports: usize,
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::version::VERSION_NUMBER.to_string(),
        threshold: state.predictor.policy().threshold(),
        stored_reports: state.reports.len().await,
    })
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Pages
        .route("/", get(home_handler))
        .route("/recommendations", get(recommendations_handler))
        .route("/faq", get(faq_handler))
        .route("/disclaimer", get(disclaimer_handler))
        .route("/analytics", get(analytics_handler))
        // Prediction
        .route("/predict", post(predict_form_handler))
        .route("/v1/classify", post(classify_handler))
        // Reports
        .route("/download_report", get(download_latest_handler))
        .route("/reports/:id", get(download_report_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until ctrl-c
pub async fn start_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = signal::ctrl_c().await;
            info!("Shutting down...");
        })
        .await?;

    Ok(())
}

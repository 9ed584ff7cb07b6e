// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classify endpoint handler

use axum::{extract::State, Json};
use bytes::Bytes;
use tracing::info;

use super::request::ClassifyRequest;
use super::response::ClassifyResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::api::predict::predict_and_store;
use crate::vision::decode_base64_bytes;

/// POST /v1/classify - Screen a base64-encoded mammogram
///
/// Runs the same pipeline as the form flow and stores a report that can be
/// fetched from the returned `reportUrl`.
pub async fn classify_handler(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    request.validate()?;

    let encoded = request.image.as_deref().unwrap_or_default();
    let bytes = decode_base64_bytes(encoded)
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid image: {}", e)))?;

    info!(size_bytes = bytes.len(), "Received classify request");

    let outcome = predict_and_store(&state, Bytes::from(bytes)).await?;
    Ok(Json(ClassifyResponse::from(&outcome)))
}

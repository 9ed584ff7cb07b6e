// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Form-based prediction flow (POST /predict)

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::multipart::Multipart;
use bytes::Bytes;
use chrono::{Local, NaiveDateTime};
use tracing::{info, warn};

use super::errors::ApiError;
use super::http_server::AppState;
use super::pages::{render_error, render_result, INVALID_IMAGE_FLAG};
use super::upload::ImageUpload;
use crate::pipeline::Prediction;
use crate::report::{self, ReportId};

/// A finished prediction whose report is stored and downloadable
#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    pub prediction: Prediction,
    pub report_id: ReportId,
    pub generated_at: NaiveDateTime,
}

impl PredictionOutcome {
    pub fn report_url(&self) -> String {
        format!("/reports/{}", self.report_id)
    }
}

/// Score an upload, render its report, and store it under a fresh id
pub(crate) async fn predict_and_store(
    state: &AppState,
    image: Bytes,
) -> Result<PredictionOutcome, ApiError> {
    let prediction = state.predictor.predict(image).await?;

    let generated_at = Local::now().naive_local();
    let pdf = report::render(&prediction.decision, generated_at)?;
    let report_id = state
        .reports
        .insert(prediction.decision, generated_at, pdf)
        .await;

    let served = state.predictions.increment_and_get();
    info!(report_id = %report_id, served, "Report stored");

    Ok(PredictionOutcome {
        prediction,
        report_id,
        generated_at,
    })
}

/// POST /predict - multipart form with a `file` field
///
/// A missing upload sends the browser back to the form. An unreadable image,
/// a broken multipart body or an oversized request does the same, with a notice.
pub async fn predict_form_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Response {
    let upload = match ImageUpload::from_multipart(multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => {
            warn!("Prediction form submitted without a file");
            return Redirect::to("/").into_response();
        }
        Err(e) => {
            warn!("Malformed multipart upload: {}", e);
            return Redirect::to(&format!("/?error={}", INVALID_IMAGE_FLAG)).into_response();
        }
    };

    info!(
        filename = upload.filename(),
        size_bytes = upload.len(),
        "Received scan upload"
    );

    match predict_and_store(&state, upload.into_bytes()).await {
        Ok(outcome) => Html(render_result(&outcome)).into_response(),
        Err(e) if e.is_invalid_upload() => {
            warn!("Rejected upload: {}", e);
            Redirect::to(&format!("/?error={}", INVALID_IMAGE_FLAG)).into_response()
        }
        Err(e) => {
            let status = e.status_code();
            let message = match status {
                StatusCode::GATEWAY_TIMEOUT => {
                    "The analysis took too long. Please try again.".to_string()
                }
                _ => e.to_response().message,
            };
            (status, Html(render_error(&message))).into_response()
        }
    }
}

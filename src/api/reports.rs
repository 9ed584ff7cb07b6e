// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Report download endpoints

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use super::errors::ApiError;
use super::http_server::AppState;
use crate::report::{ReportId, StoredReport, REPORT_FILENAME};

fn pdf_response(report: StoredReport) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", REPORT_FILENAME),
            ),
        ],
        report.pdf,
    )
        .into_response()
}

/// GET /reports/:id - the report produced by one specific prediction
pub async fn download_report_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let not_found = || ApiError::NotFound(format!("Report {} not found", id));

    let report_id: ReportId = id.parse().map_err(|_| not_found())?;
    let report = state.reports.get(&report_id).await.ok_or_else(not_found)?;

    debug!(report_id = %report_id, size_bytes = report.pdf.len(), "Serving report");
    Ok(pdf_response(report))
}

/// GET /download_report - the most recent report, for bookmarked links
pub async fn download_latest_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let report = state
        .reports
        .latest()
        .await
        .ok_or_else(|| ApiError::NotFound("No report has been generated yet".to_string()))?;

    debug!(report_id = %report.id, "Serving latest report");
    Ok(pdf_response(report))
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Downloadable screening reports
//!
//! - `pdf` - Renders a decision into a single-page PDF
//! - `store` - Keeps rendered reports per request, with eviction

pub mod pdf;
pub mod store;

use thiserror::Error;

pub use pdf::{render, ReportLines, REPORT_TITLE, TIMESTAMP_FORMAT};
pub use store::{ReportId, ReportStore, ReportStoreConfig, StoredReport};

/// File name offered to the browser for every report download
pub const REPORT_FILENAME: &str = "prediction_report.pdf";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to encode PDF: {0}")]
    Encode(String),
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classify response types

use serde::{Deserialize, Serialize};

use crate::api::predict::PredictionOutcome;
use crate::decision::Label;
use crate::report::ReportId;

/// Response from a screening prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyResponse {
    /// Machine label (positive, negative)
    pub label: Label,
    /// Human-readable label
    pub label_name: String,
    /// Raw classifier score in [0, 1]
    pub score: f32,
    /// Confidence in [0, 1]
    pub confidence: f32,
    /// Confidence as shown to users, e.g. "87.00%"
    pub confidence_percent: String,
    pub report_id: ReportId,
    pub report_url: String,
    pub processing_time_ms: u64,
}

impl From<&PredictionOutcome> for ClassifyResponse {
    fn from(outcome: &PredictionOutcome) -> Self {
        let decision = outcome.prediction.decision;
        Self {
            label: decision.label,
            label_name: decision.label.display_name().to_string(),
            score: outcome.prediction.score,
            confidence: decision.confidence,
            confidence_percent: decision.confidence_percent(),
            report_id: outcome.report_id,
            report_url: outcome.report_url(),
            processing_time_ms: outcome.prediction.elapsed.as_millis() as u64,
        }
    }
}

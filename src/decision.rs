// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decision policy: raw classifier score to a labeled, human-facing result

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Default probability cut-off for the positive class
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Outcome class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Positive,
    Negative,
}

impl Label {
    /// Name shown on result pages and reports
    pub fn display_name(&self) -> &'static str {
        match self {
            Label::Positive => "Malignant (Cancerous)",
            Label::Negative => "Benign (Non-cancerous)",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Labeled result derived from a score
///
/// `confidence` is the probability of the chosen class as a bare fraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Decision {
    pub label: Label,
    pub confidence: f32,
}

impl Decision {
    /// Confidence formatted for display, e.g. `"90.00%"`
    pub fn confidence_percent(&self) -> String {
        format_percent(self.confidence)
    }
}

/// Format a fraction as a percentage with two decimals
pub fn format_percent(fraction: f32) -> String {
    format!("{:.2}%", f64::from(fraction) * 100.0)
}

/// Map a score to a decision
///
/// Scores strictly above `threshold` are Positive. A score equal to the
/// threshold goes to Negative; the tie-break is arbitrary but fixed.
pub fn decide(score: f32, threshold: f32) -> Decision {
    if score > threshold {
        Decision {
            label: Label::Positive,
            confidence: score,
        }
    } else {
        Decision {
            label: Label::Negative,
            confidence: 1.0 - score,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("Decision threshold must be in (0, 1), got {0}")]
pub struct InvalidThreshold(pub f32);

/// Threshold-carrying policy handed to the pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionPolicy {
    threshold: f32,
}

impl DecisionPolicy {
    pub fn new(threshold: f32) -> Result<Self, InvalidThreshold> {
        if !threshold.is_finite() || threshold <= 0.0 || threshold >= 1.0 {
            return Err(InvalidThreshold(threshold));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn decide(&self, score: f32) -> Decision {
        decide(score, self.threshold)
    }
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Screening pipeline: upload bytes -> tensor -> score -> decision
//!
//! Preprocessing and scoring are CPU-bound and run on the blocking pool.
//! Scoring is bounded by a timeout so a stuck model surfaces as an error
//! instead of a hung request.

use std::time::{Duration, Instant};

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::classifier::{ClassifierError, ClassifierHandle};
use crate::decision::{Decision, DecisionPolicy};
use crate::vision::{normalize, PreprocessError, TargetSize};

/// Default upper bound on a single inference
pub const DEFAULT_INFERENCE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error("Inference timed out after {0:?}")]
    Timeout(Duration),

    #[error("Pipeline task failed: {0}")]
    Task(String),
}

impl PredictError {
    /// True when the upload itself was at fault
    pub fn is_decode_error(&self) -> bool {
        matches!(self, PredictError::Preprocess(PreprocessError::Decode(_)))
    }
}

/// Outcome of a single run through the pipeline
#[derive(Debug, Clone, Copy)]
pub struct Prediction {
    pub decision: Decision,
    pub score: f32,
    pub elapsed: Duration,
}

/// Wires preprocessing, the classifier handle, and the decision policy together
#[derive(Clone)]
pub struct Predictor {
    classifier: ClassifierHandle,
    policy: DecisionPolicy,
    target: TargetSize,
    inference_timeout: Duration,
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor")
            .field("policy", &self.policy)
            .field("target", &self.target)
            .field("inference_timeout", &self.inference_timeout)
            .finish_non_exhaustive()
    }
}

impl Predictor {
    /// Build a predictor, checking that the preprocessor output fits the classifier input
    pub fn new(
        classifier: ClassifierHandle,
        policy: DecisionPolicy,
        target: TargetSize,
        inference_timeout: Duration,
    ) -> Result<Self, ClassifierError> {
        let expected = classifier.input_shape();
        let produced = target.tensor_shape();
        if expected != produced {
            return Err(ClassifierError::ShapeMismatch {
                expected: expected.to_vec(),
                actual: produced.to_vec(),
            });
        }

        Ok(Self {
            classifier,
            policy,
            target,
            inference_timeout,
        })
    }

    pub fn policy(&self) -> DecisionPolicy {
        self.policy
    }

    pub fn target(&self) -> TargetSize {
        self.target
    }

    /// Run an upload through the whole pipeline
    ///
    /// Uploads that fail to decode never reach the classifier.
    pub async fn predict(&self, image: Bytes) -> Result<Prediction, PredictError> {
        let start = Instant::now();
        let target = self.target;

        let tensor = tokio::task::spawn_blocking(move || normalize(&image, target))
            .await
            .map_err(|e| PredictError::Task(e.to_string()))??;

        debug!(shape = ?tensor.shape(), "Upload normalized");

        let classifier = self.classifier.clone();
        let scoring = tokio::task::spawn_blocking(move || classifier.score(&tensor));

        let score = match tokio::time::timeout(self.inference_timeout, scoring).await {
            Ok(joined) => joined.map_err(|e| PredictError::Task(e.to_string()))?,
            Err(_) => {
                warn!(
                    timeout_ms = self.inference_timeout.as_millis() as u64,
                    "Inference timed out"
                );
                return Err(PredictError::Timeout(self.inference_timeout));
            }
        };

        let score = match score {
            Ok(score) => score,
            Err(e @ ClassifierError::ShapeMismatch { .. }) => {
                error!("Preprocessor/classifier contract violated: {}", e);
                debug_assert!(false, "preprocessor/classifier contract violated: {}", e);
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        let decision = self.policy.decide(score);
        let elapsed = start.elapsed();

        info!(
            score,
            label = ?decision.label,
            confidence = %decision.confidence_percent(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Prediction complete"
        );

        Ok(Prediction {
            decision,
            score,
            elapsed,
        })
    }
}

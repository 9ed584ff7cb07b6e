// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Binary image classifier wrapper
//!
//! Components:
//! - `onnx` - ONNX Runtime backed classifier artifact
//! - `loader` - Resolves the artifact locally or fetches it (opt-in)
//! - `manager` - Loads the artifact once per process
//! - `mock` - Fixed-score classifier for tests and dry runs

pub mod loader;
pub mod manager;
pub mod mock;
pub mod onnx;

use std::sync::Arc;

use ndarray::Array4;
use thiserror::Error;

pub use loader::{ensure_artifact, ModelSource};
pub use manager::{ClassifierConfig, ClassifierManager};
pub use mock::StaticClassifier;
pub use onnx::OnnxClassifier;

/// Errors raised by classifier loading and scoring
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Model unavailable: {0}")]
    Unavailable(String),

    #[error("Tensor shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Classifier produced an out-of-range score: {0}")]
    InvalidScore(f32),
}

/// A loaded model that maps a `[1, H, W, 1]` tensor to a positive-class probability
///
/// Implementations must be deterministic: the same tensor always yields the same score.
pub trait Classifier: Send + Sync {
    /// Input shape the artifact was trained on
    fn input_shape(&self) -> [usize; 4];

    /// Score a preprocessed tensor
    fn score(&self, tensor: &Array4<f32>) -> Result<f32, ClassifierError>;
}

/// Shared handle passed explicitly to the request layer
pub type ClassifierHandle = Arc<dyn Classifier>;

/// Reject tensors that do not match the classifier's input contract
pub fn check_shape(expected: [usize; 4], tensor: &Array4<f32>) -> Result<(), ClassifierError> {
    if tensor.shape() != expected.as_slice() {
        return Err(ClassifierError::ShapeMismatch {
            expected: expected.to_vec(),
            actual: tensor.shape().to_vec(),
        });
    }
    Ok(())
}

/// Scores must be finite probabilities
pub fn check_score(score: f32) -> Result<f32, ClassifierError> {
    if !score.is_finite() || !(0.0..=1.0).contains(&score) {
        return Err(ClassifierError::InvalidScore(score));
    }
    Ok(score)
}

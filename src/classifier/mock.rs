// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use ndarray::Array4;

use super::{check_shape, Classifier, ClassifierError};

/// Classifier that always returns the same score
///
/// Counts calls so tests can assert whether inference was reached, and can
/// optionally stall to exercise inference timeouts.
#[derive(Debug)]
pub struct StaticClassifier {
    score: f32,
    input_shape: [usize; 4],
    /// Shape `score` actually accepts, when it differs from the advertised one
    scoring_shape: Option<[usize; 4]>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StaticClassifier {
    pub fn new(score: f32) -> Self {
        Self {
            score,
            input_shape: [1, 256, 256, 1],
            scoring_shape: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_input_shape(mut self, shape: [usize; 4]) -> Self {
        self.input_shape = shape;
        self
    }

    /// Advertise `input_shape` but reject anything except `shape` when scoring
    pub fn with_scoring_shape(mut self, shape: [usize; 4]) -> Self {
        self.scoring_shape = Some(shape);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `score` calls that passed the shape check
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for StaticClassifier {
    fn input_shape(&self) -> [usize; 4] {
        self.input_shape
    }

    fn score(&self, tensor: &Array4<f32>) -> Result<f32, ClassifierError> {
        check_shape(self.scoring_shape.unwrap_or(self.input_shape), tensor)?;
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        Ok(self.score)
    }
}

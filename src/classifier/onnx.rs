// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ONNX Runtime backed screening classifier
//!
//! The exported model takes a single `[1, H, W, 1]` float tensor and emits a
//! single sigmoid probability for the positive (malignant) class.

use anyhow::{Context, Result};
use ndarray::{Array4, ArrayViewD};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Value, ValueType};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use super::{check_score, check_shape, Classifier, ClassifierError};

/// Screening classifier running on the CPU execution provider
#[derive(Clone)]
pub struct OnnxClassifier {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    /// Expected input shape
    input_shape: [usize; 4],
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("input_name", &self.input_name)
            .field("input_shape", &self.input_shape)
            .finish_non_exhaustive()
    }
}

impl OnnxClassifier {
    /// Load the classifier artifact from disk
    ///
    /// The model's declared input dims are checked against `input_shape`;
    /// dynamic dims take the configured size.
    ///
    /// # Errors
    /// Returns `ClassifierError::Unavailable` if the file is missing or
    /// ONNX Runtime cannot build a session from it, and
    /// `ClassifierError::ShapeMismatch` if the model was exported for a
    /// different input size.
    pub fn load<P: AsRef<Path>>(
        model_path: P,
        input_shape: [usize; 4],
        intra_threads: usize,
    ) -> Result<Self, ClassifierError> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            return Err(ClassifierError::Unavailable(format!(
                "Model not found at: {}",
                model_path.display()
            )));
        }

        info!("Loading screening model from {}", model_path.display());

        let session = build_session(model_path, intra_threads)
            .map_err(|e| ClassifierError::Unavailable(format!("{:#}", e)))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "input".to_string());

        let declared = session.inputs.first().and_then(|input| {
            debug!("Screening model input type: {:?}", input.input_type);
            match &input.input_type {
                ValueType::Tensor { shape, .. } => Some(shape.to_vec()),
                _ => None,
            }
        });
        let input_shape = match declared {
            Some(dims) => resolve_input_shape(&dims, input_shape)?,
            None => {
                warn!("Screening model declares no tensor input, assuming {:?}", input_shape);
                input_shape
            }
        };

        info!(
            "✅ Screening model loaded (input: {}, shape: {:?})",
            input_name, input_shape
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            input_shape,
        })
    }
}

/// Reconcile the model's declared input dims with the configured tensor shape
///
/// `-1` marks a dynamic dim and accepts the configured size; every fixed dim
/// (and the rank) must agree.
fn resolve_input_shape(
    declared: &[i64],
    configured: [usize; 4],
) -> Result<[usize; 4], ClassifierError> {
    let expected: Vec<usize> = declared
        .iter()
        .enumerate()
        .map(|(axis, &dim)| match usize::try_from(dim) {
            Ok(fixed) => fixed,
            Err(_) => configured.get(axis).copied().unwrap_or_default(),
        })
        .collect();

    if expected == configured {
        Ok(configured)
    } else {
        Err(ClassifierError::ShapeMismatch {
            expected,
            actual: configured.to_vec(),
        })
    }
}

/// First element of the first model output
fn first_score(output: Option<&ArrayViewD<'_, f32>>) -> Result<f32, ClassifierError> {
    let output =
        output.ok_or_else(|| ClassifierError::Inference("model produced no outputs".to_string()))?;
    output
        .iter()
        .next()
        .copied()
        .ok_or_else(|| ClassifierError::Inference("model produced an empty output".to_string()))
}

fn build_session(model_path: &Path, intra_threads: usize) -> Result<Session> {
    let session = Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([CPUExecutionProvider::default().build()])
        .context("Failed to set CPU execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(intra_threads)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path)
        .context(format!(
            "Failed to load screening model from {}",
            model_path.display()
        ))?;
    Ok(session)
}

impl Classifier for OnnxClassifier {
    fn input_shape(&self) -> [usize; 4] {
        self.input_shape
    }

    fn score(&self, tensor: &Array4<f32>) -> Result<f32, ClassifierError> {
        check_shape(self.input_shape, tensor)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifierError::Inference("session lock poisoned".to_string()))?;

        let input_value = Value::from_array(tensor.to_owned())
            .map_err(|e| ClassifierError::Inference(format!("Failed to create input tensor: {}", e)))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let output_tensor = if outputs.len() == 0 {
            None
        } else {
            Some(outputs[0].try_extract_array::<f32>().map_err(|e| {
                ClassifierError::Inference(format!("Failed to extract output: {}", e))
            })?)
        };
        let score = first_score(output_tensor.as_ref())?;

        debug!(score, "Screening model scored tensor");

        check_score(score)
    }
}

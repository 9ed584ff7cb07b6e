// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process-scope classifier loading
//!
//! The artifact is expensive to load, so the manager loads it at most once and
//! hands out clones of the same handle afterwards. `main` owns the manager and
//! passes the handle to the HTTP layer explicitly.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::info;

use super::loader::{ensure_artifact, ModelSource};
use super::onnx::OnnxClassifier;
use super::{ClassifierError, ClassifierHandle};

/// Configuration for loading the screening classifier
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub source: ModelSource,
    pub input_shape: [usize; 4],
    pub intra_threads: usize,
}

/// Owns the single classifier instance for this process
#[derive(Default)]
pub struct ClassifierManager {
    cell: OnceCell<ClassifierHandle>,
}

impl ClassifierManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the ONNX artifact described by `config`, or return the already loaded handle
    pub async fn load(&self, config: &ClassifierConfig) -> Result<ClassifierHandle, ClassifierError> {
        self.get_or_init(|| async move {
            let path = ensure_artifact(&config.source).await?;
            let shape = config.input_shape;
            let threads = config.intra_threads;

            let classifier =
                tokio::task::spawn_blocking(move || OnnxClassifier::load(path, shape, threads))
                    .await
                    .map_err(|e| {
                        ClassifierError::Unavailable(format!("Model load task failed: {}", e))
                    })??;

            Ok(Arc::new(classifier) as ClassifierHandle)
        })
        .await
    }

    /// Run `init` only if no classifier has been loaded yet
    ///
    /// A failed `init` leaves the manager empty so a later call may retry.
    pub async fn get_or_init<F, Fut>(&self, init: F) -> Result<ClassifierHandle, ClassifierError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ClassifierHandle, ClassifierError>>,
    {
        if let Some(handle) = self.cell.get() {
            return Ok(handle.clone());
        }

        let handle = self.cell.get_or_try_init(init).await?;
        info!("Classifier ready (input shape {:?})", handle.input_shape());
        Ok(handle.clone())
    }

    /// The loaded classifier, if any
    pub fn get(&self) -> Option<ClassifierHandle> {
        self.cell.get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod classifier;
pub mod config;
pub mod decision;
pub mod pipeline;
pub mod report;
pub mod version;
pub mod vision;

// Re-export main types
pub use api::{create_router, start_server, ApiError, AppState};
pub use classifier::{Classifier, ClassifierError, ClassifierHandle, ClassifierManager};
pub use config::{AppConfig, ConfigError};
pub use decision::{Decision, DecisionPolicy, Label};
pub use pipeline::{PredictError, Prediction, Predictor};
pub use report::{ReportId, ReportStore};

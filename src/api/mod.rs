// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod classify;
pub mod counters;
pub mod errors;
pub mod http_server;
pub mod pages;
pub mod predict;
pub mod reports;
pub mod upload;

pub use classify::{classify_handler, ClassifyRequest, ClassifyResponse};
pub use counters::Counter;
pub use errors::{ApiError, ErrorResponse};
pub use http_server::{create_router, start_server, AppState, HealthResponse, MAX_BODY_SIZE};
pub use predict::{predict_form_handler, PredictionOutcome};
pub use upload::ImageUpload;

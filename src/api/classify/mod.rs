// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classify API endpoint module
//!
//! Provides POST /v1/classify for JSON clients that send a base64 scan.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::classify_handler;
pub use request::ClassifyRequest;
pub use response::ClassifyResponse;

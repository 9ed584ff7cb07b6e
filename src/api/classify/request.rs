// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classify request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::vision::image_utils::MAX_IMAGE_SIZE;

/// Largest base64 payload that can still decode to an accepted image
const MAX_ENCODED_SIZE: usize = MAX_IMAGE_SIZE / 3 * 4 + 4;

/// Request for a single screening prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyRequest {
    /// Base64-encoded image data, optionally as a data URL
    #[serde(default)]
    pub image: Option<String>,
}

impl ClassifyRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let image = match self.image.as_deref().map(str::trim) {
            Some(image) if !image.is_empty() => image,
            _ => {
                return Err(ApiError::ValidationError {
                    field: "image".to_string(),
                    message: "image is required".to_string(),
                })
            }
        };

        if image.len() > MAX_ENCODED_SIZE {
            return Err(ApiError::ValidationError {
                field: "image".to_string(),
                message: format!(
                    "image exceeds maximum size of {} bytes",
                    MAX_IMAGE_SIZE
                ),
            });
        }

        Ok(())
    }
}

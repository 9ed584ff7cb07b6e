// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the screening classifier
//!
//! Produces an NHWC tensor `[1, H, W, 1]` of grayscale intensities in `[0, 1]`.

use image::imageops::{self, FilterType};
use image::DynamicImage;
use ndarray::Array4;
use thiserror::Error;

use super::image_utils::{decode_image_bytes, ImageError};

/// Default side length of the square classifier input
pub const DEFAULT_TARGET_SIZE: u32 = 256;

/// Errors raised while turning an upload into a tensor
#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] ImageError),

    #[error("Invalid target dimensions: {width}x{height}")]
    Dimension { width: u32, height: u32 },
}

/// Fixed resolution every image is resized to before inference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub fn new(width: u32, height: u32) -> Result<Self, PreprocessError> {
        if width == 0 || height == 0 {
            return Err(PreprocessError::Dimension { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn square(side: u32) -> Result<Self, PreprocessError> {
        Self::new(side, side)
    }

    /// Tensor shape produced for this target: `[1, height, width, 1]`
    pub fn tensor_shape(&self) -> [usize; 4] {
        [1, self.height as usize, self.width as usize, 1]
    }
}

impl Default for TargetSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_TARGET_SIZE,
            height: DEFAULT_TARGET_SIZE,
        }
    }
}

/// Decode raw upload bytes and normalize them into a classifier tensor
pub fn normalize(bytes: &[u8], target: TargetSize) -> Result<Array4<f32>, PreprocessError> {
    let image = decode_image_bytes(bytes)?;
    normalize_image(&image, target)
}

/// Normalize an already decoded image
///
/// Steps (order matters for parity with the trained model):
/// 1. Convert to single-channel grayscale (luminance weighted)
/// 2. Resize to the target resolution with Lanczos3
/// 3. Scale 0-255 intensities to 0.0-1.0
/// 4. Reshape to `[1, H, W, 1]`
pub fn normalize_image(
    image: &DynamicImage,
    target: TargetSize,
) -> Result<Array4<f32>, PreprocessError> {
    if target.width == 0 || target.height == 0 {
        return Err(PreprocessError::Dimension {
            width: target.width,
            height: target.height,
        });
    }

    let gray = image.to_luma8();
    let resized = imageops::resize(&gray, target.width, target.height, FilterType::Lanczos3);

    let values: Vec<f32> = resized
        .into_raw()
        .into_iter()
        .map(|p| p as f32 / 255.0)
        .collect();

    Array4::from_shape_vec(target.tensor_shape(), values).map_err(|_| {
        PreprocessError::Dimension {
            width: target.width,
            height: target.height,
        }
    })
}

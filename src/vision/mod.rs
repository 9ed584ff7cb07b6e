// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image intake for the screening pipeline
//!
//! This module provides:
//! - Upload decoding with magic-byte format detection and size limits
//! - Grayscale normalization into the classifier's `[1, H, W, 1]` tensor

pub mod image_utils;
pub mod preprocessing;

pub use image_utils::{decode_base64_bytes, decode_image_bytes, ImageError, MAX_IMAGE_SIZE};
pub use preprocessing::{normalize, normalize_image, PreprocessError, TargetSize, DEFAULT_TARGET_SIZE};

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Upload decoding: base64 unwrapping, format sniffing and size limits

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};
use thiserror::Error;

/// Largest scan accepted, in raw bytes (10 MiB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Upload is {size} bytes; scans are limited to {max} bytes")]
    TooLarge { size: usize, max: usize },

    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Upload is not a PNG, JPEG, WebP, GIF, BMP or TIFF image")]
    UnsupportedFormat,

    #[error("Scan could not be decoded: {0}")]
    DecodeFailed(#[source] image::ImageError),

    #[error("Upload is empty")]
    EmptyData,
}

/// A file signature: every `(offset, magic)` pair must match
struct Signature {
    format: ImageFormat,
    parts: &'static [(usize, &'static [u8])],
}

impl Signature {
    fn matches(&self, bytes: &[u8]) -> bool {
        self.parts
            .iter()
            .all(|&(offset, magic)| bytes.get(offset..offset + magic.len()) == Some(magic))
    }
}

const SIGNATURES: &[Signature] = &[
    Signature { format: ImageFormat::Png, parts: &[(0, b"\x89PNG")] },
    Signature { format: ImageFormat::Jpeg, parts: &[(0, b"\xFF\xD8\xFF")] },
    Signature { format: ImageFormat::WebP, parts: &[(0, b"RIFF"), (8, b"WEBP")] },
    Signature { format: ImageFormat::Gif, parts: &[(0, b"GIF87a")] },
    Signature { format: ImageFormat::Gif, parts: &[(0, b"GIF89a")] },
    Signature { format: ImageFormat::Bmp, parts: &[(0, b"BM")] },
    Signature { format: ImageFormat::Tiff, parts: &[(0, b"II*\0")] },
    Signature { format: ImageFormat::Tiff, parts: &[(0, b"MM\0*")] },
];

/// Unwrap a base64 upload from the JSON API
///
/// A `data:image/...;base64,` prefix is accepted and stripped.
pub fn decode_base64_bytes(encoded: &str) -> Result<Vec<u8>, ImageError> {
    let trimmed = encoded.trim();
    let payload = match trimmed.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => trimmed,
    };
    if payload.is_empty() {
        return Err(ImageError::EmptyData);
    }

    Ok(STANDARD.decode(payload)?)
}

/// Decode uploaded bytes into an image, sniffing the format from its signature
pub fn decode_image_bytes(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }
    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(ImageError::TooLarge {
            size: bytes.len(),
            max: MAX_IMAGE_SIZE,
        });
    }

    let format = sniff_format(bytes).ok_or(ImageError::UnsupportedFormat)?;
    image::load_from_memory_with_format(bytes, format).map_err(ImageError::DecodeFailed)
}

fn sniff_format(bytes: &[u8]) -> Option<ImageFormat> {
    SIGNATURES
        .iter()
        .find(|signature| signature.matches(bytes))
        .map(|signature| signature.format)
}

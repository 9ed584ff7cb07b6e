// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Validated upload type for the HTML form flow
//!
//! An `ImageUpload` can only exist if the form carried a `file` field with a
//! file name and a non-empty body. Everything else is "no upload".

use axum_extra::extract::multipart::{Multipart, MultipartError};
use bytes::Bytes;

/// Multipart field carrying the scan
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Clone)]
pub struct ImageUpload {
    filename: String,
    bytes: Bytes,
}

impl ImageUpload {
    /// Returns `None` for a missing file name or an empty body
    pub fn new(filename: Option<&str>, bytes: Bytes) -> Option<Self> {
        let filename = filename.map(str::trim).filter(|name| !name.is_empty())?;
        if bytes.is_empty() {
            return None;
        }
        Some(Self {
            filename: filename.to_string(),
            bytes,
        })
    }

    /// Pull the `file` field out of a multipart form
    ///
    /// Other fields are skipped. `Ok(None)` means the form had no usable upload.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Option<Self>, MultipartError> {
        while let Some(field) = multipart.next_field().await? {
            if field.name() != Some(UPLOAD_FIELD) {
                continue;
            }
            let filename = field.file_name().map(str::to_owned);
            let bytes = field.bytes().await?;
            return Ok(Self::new(filename.as_deref(), bytes));
        }
        Ok(None)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

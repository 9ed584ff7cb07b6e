// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Model artifact resolution
//!
//! The artifact is read from a local path. If it is missing and a remote URL is
//! configured, it can be fetched, but only when remote fetching was explicitly
//! enabled. Fetched bytes are written to a temp file in the destination
//! directory and renamed into place, so an interrupted fetch never leaves a
//! truncated artifact behind.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};
use url::Url;

use super::ClassifierError;

/// Where the classifier artifact comes from
#[derive(Debug, Clone)]
pub struct ModelSource {
    /// Local artifact path (checked first)
    pub local_path: PathBuf,
    /// Optional fallback URL
    pub remote_url: Option<Url>,
    /// Remote fetch is opt-in
    pub allow_remote: bool,
    /// Timeout for the whole remote fetch
    pub fetch_timeout: Duration,
}

impl ModelSource {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            local_path: path.into(),
            remote_url: None,
            allow_remote: false,
            fetch_timeout: Duration::from_secs(300),
        }
    }

    pub fn with_remote(mut self, url: Url, allow_remote: bool) -> Self {
        self.remote_url = Some(url);
        self.allow_remote = allow_remote;
        self
    }
}

/// Make sure the artifact exists locally, fetching it if allowed
pub async fn ensure_artifact(source: &ModelSource) -> Result<PathBuf, ClassifierError> {
    let path = &source.local_path;

    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        info!("Using local model artifact at {}", path.display());
        return Ok(path.clone());
    }

    let Some(url) = source.remote_url.as_ref() else {
        return Err(ClassifierError::Unavailable(format!(
            "Model not found at: {}",
            path.display()
        )));
    };

    if !source.allow_remote {
        warn!(
            "Model missing at {} and remote fetch from {} is disabled",
            path.display(),
            url
        );
        return Err(ClassifierError::Unavailable(format!(
            "Model not found at: {} (remote fetch disabled, set ALLOW_REMOTE_MODEL_FETCH=true to enable)",
            path.display()
        )));
    }

    let size = fetch_artifact(url, path, source.fetch_timeout).await?;
    info!("✅ Fetched model artifact ({} bytes) to {}", size, path.display());
    Ok(path.clone())
}

/// Download the artifact and persist it atomically at `dest`
///
/// Returns the number of bytes written.
pub async fn fetch_artifact(
    url: &Url,
    dest: &Path,
    timeout: Duration,
) -> Result<u64, ClassifierError> {
    info!("Fetching model artifact from {}", url);

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ClassifierError::Unavailable(format!("Failed to build HTTP client: {}", e)))?;

    let response = client.get(url.clone()).send().await.map_err(|e| {
        ClassifierError::Unavailable(format!("Failed to fetch model from {}: {}", url, e))
    })?;

    if !response.status().is_success() {
        let status = response.status();
        return Err(ClassifierError::Unavailable(format!(
            "Model download from {} returned {}",
            url, status
        )));
    }

    let bytes = response.bytes().await.map_err(|e| {
        ClassifierError::Unavailable(format!("Failed to read model body from {}: {}", url, e))
    })?;

    if bytes.is_empty() {
        return Err(ClassifierError::Unavailable(format!(
            "Model download from {} returned an empty body",
            url
        )));
    }

    let size = bytes.len() as u64;
    let dest = dest.to_path_buf();
    tokio::task::spawn_blocking(move || persist_atomically(&dest, &bytes))
        .await
        .map_err(|e| ClassifierError::Unavailable(format!("Model write task failed: {}", e)))?
        .map_err(|e| ClassifierError::Unavailable(format!("Failed to write model: {}", e)))?;

    Ok(size)
}

/// Write to a sibling temp file, fsync, then rename over `dest`
fn persist_atomically(dest: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(())
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration
//!
//! Every option can be passed as a flag or read from the environment
//! (a `.env` file is loaded first by `main`).

use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use url::Url;

use crate::classifier::{ClassifierConfig, ModelSource};
use crate::decision::DecisionPolicy;
use crate::report::ReportStoreConfig;
use crate::vision::TargetSize;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.into(),
    }
}

/// Mammogram screening web service
#[derive(Parser, Debug, Clone)]
#[command(name = "mammo-screen")]
#[command(about = "Upload a mammogram, get a screening label, confidence and PDF report", long_about = None)]
pub struct AppConfig {
    /// Address to bind the HTTP server to
    #[arg(long, env = "API_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind the HTTP server to
    #[arg(long, env = "API_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Local path of the classifier artifact
    #[arg(long, env = "MODEL_PATH", default_value = "./mammogram_model.onnx")]
    pub model_path: PathBuf,

    /// Fallback URL for the artifact when it is missing locally
    #[arg(long, env = "MODEL_URL")]
    pub model_url: Option<String>,

    /// Allow fetching the artifact from MODEL_URL at startup
    #[arg(long, env = "ALLOW_REMOTE_MODEL_FETCH", default_value_t = false)]
    pub allow_remote_model_fetch: bool,

    /// Timeout for the artifact download, in seconds
    #[arg(long, env = "MODEL_FETCH_TIMEOUT_SECS", default_value_t = 300)]
    pub model_fetch_timeout_secs: u64,

    /// Side length of the square classifier input
    #[arg(long, env = "TARGET_SIZE", default_value_t = 256)]
    pub target_size: u32,

    /// Scores strictly above this are labeled positive
    #[arg(long, env = "DECISION_THRESHOLD", default_value_t = 0.5)]
    pub threshold: f32,

    /// Upper bound on a single inference, in milliseconds
    #[arg(long, env = "INFERENCE_TIMEOUT_MS", default_value_t = 10_000)]
    pub inference_timeout_ms: u64,

    /// ONNX Runtime intra-op threads
    #[arg(long, env = "INFERENCE_THREADS", default_value_t = 4)]
    pub inference_threads: usize,

    /// Maximum number of reports kept for download
    #[arg(long, env = "REPORT_CAPACITY", default_value_t = 128)]
    pub report_capacity: usize,

    /// How long a report stays downloadable, in seconds
    #[arg(long, env = "REPORT_TTL_SECS", default_value_t = 3600)]
    pub report_ttl_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            model_path: PathBuf::from("./mammogram_model.onnx"),
            model_url: None,
            allow_remote_model_fetch: false,
            model_fetch_timeout_secs: 300,
            target_size: 256,
            threshold: 0.5,
            inference_timeout_ms: 10_000,
            inference_threads: 4,
            report_capacity: 128,
            report_ttl_secs: 3600,
        }
    }
}

impl AppConfig {
    /// Check every option before anything is loaded
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        self.target()?;
        self.policy()?;
        self.report_store()?;
        self.model_source()?;

        if self.inference_timeout_ms == 0 {
            return Err(invalid("inference_timeout_ms", "must be greater than 0"));
        }
        if self.model_fetch_timeout_secs == 0 {
            return Err(invalid("model_fetch_timeout_secs", "must be greater than 0"));
        }
        if self.inference_threads == 0 {
            return Err(invalid("inference_threads", "must be greater than 0"));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| invalid("host", format!("{}", e)))
    }

    pub fn target(&self) -> Result<TargetSize, ConfigError> {
        TargetSize::square(self.target_size).map_err(|e| invalid("target_size", e.to_string()))
    }

    pub fn policy(&self) -> Result<DecisionPolicy, ConfigError> {
        DecisionPolicy::new(self.threshold).map_err(|e| invalid("threshold", e.to_string()))
    }

    pub fn inference_timeout(&self) -> Duration {
        Duration::from_millis(self.inference_timeout_ms)
    }

    pub fn report_store(&self) -> Result<ReportStoreConfig, ConfigError> {
        let capacity = NonZeroUsize::new(self.report_capacity)
            .ok_or_else(|| invalid("report_capacity", "must be greater than 0"))?;
        if self.report_ttl_secs == 0 {
            return Err(invalid("report_ttl_secs", "must be greater than 0"));
        }
        Ok(ReportStoreConfig {
            capacity,
            ttl: Duration::from_secs(self.report_ttl_secs),
        })
    }

    pub fn model_source(&self) -> Result<ModelSource, ConfigError> {
        let mut source = ModelSource::local(&self.model_path);
        source.fetch_timeout = Duration::from_secs(self.model_fetch_timeout_secs);

        match self.model_url.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(raw) => {
                let url = Url::parse(raw).map_err(|e| invalid("model_url", e.to_string()))?;
                if url.scheme() != "http" && url.scheme() != "https" {
                    return Err(invalid("model_url", "only http and https URLs are supported"));
                }
                Ok(source.with_remote(url, self.allow_remote_model_fetch))
            }
            None if self.allow_remote_model_fetch => Err(invalid(
                "allow_remote_model_fetch",
                "remote fetch enabled but MODEL_URL is not set",
            )),
            None => Ok(source),
        }
    }

    pub fn classifier(&self) -> Result<ClassifierConfig, ConfigError> {
        Ok(ClassifierConfig {
            source: self.model_source()?,
            input_shape: self.target()?.tensor_shape(),
            intra_threads: self.inference_threads,
        })
    }
}

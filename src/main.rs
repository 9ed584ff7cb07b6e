// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use mammo_screen::{
    api::{start_server, AppState},
    classifier::ClassifierManager,
    config::AppConfig,
    pipeline::Predictor,
    report::ReportStore,
    version,
};
use std::{env, sync::Arc, time::Duration};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// How often expired reports are swept
const REPORT_PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap reads the environment
    dotenv::dotenv().ok();

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("Starting {}", version::get_version_string());

    let config = AppConfig::parse();
    config.validate()?;

    let classifier_config = config.classifier()?;
    info!(
        "Loading classifier from {}",
        classifier_config.source.local_path.display()
    );

    let manager = ClassifierManager::new();
    let classifier = manager
        .load(&classifier_config)
        .await
        .context("Classifier could not be loaded")?;

    let predictor = Predictor::new(
        classifier,
        config.policy()?,
        config.target()?,
        config.inference_timeout(),
    )
    .context("Classifier does not accept the configured input size")?;
    info!(
        "Decision threshold {:.2}, input {}x{}",
        predictor.policy().threshold(),
        predictor.target().width,
        predictor.target().height
    );

    let reports = Arc::new(ReportStore::new(config.report_store()?));
    let purge = reports.spawn_purge_task(REPORT_PURGE_INTERVAL);

    let state = AppState::new(predictor, reports);
    let result = start_server(config.bind_addr()?, state).await;

    purge.abort();
    info!("Goodbye!");
    result
}

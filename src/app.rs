//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - reads configuration from the environment / `.env`
//! - installs file logging when requested
//! - loads both tables once
//! - hands over to the dashboard, which re-runs the pipeline on every change

use std::path::Path;
use std::sync::Mutex;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::DashboardConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `arima-dash` binary.
pub fn run() -> Result<(), AppError> {
    let config = DashboardConfig::from_env()?;
    init_logging(config.log_file.as_deref())?;
    info!(
        order = %config.order,
        train_end = config.split.train_end(),
        test_years = ?config.split.test_years(),
        "starting dashboard"
    );

    let datasets = pipeline::load_datasets(&config.datasets);
    crate::tui::run(datasets, config.order, config.split)
}

/// Log to a file, never to the terminal the dashboard draws on. Without a
/// log file no subscriber is installed and events are dropped.
fn init_logging(path: Option<&Path>) -> Result<(), AppError> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open log file '{}': {e}", path.display())))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "arima_dash=info".into()))
        .try_init()
        .map_err(|e| AppError::new(2, format!("Failed to initialize logging: {e}")))
}

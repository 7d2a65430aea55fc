// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # A/B Testing Backend Server
//!
//! The `abtest-server` binary wires the in-memory stores, the experiment
//! and metrics services, and the HTTP surface together and serves them.
//!
//! ## Configuration
//!
//! All settings come from flags or environment variables:
//!
//! - `--host` / `ABTEST_HOST` - bind address (default: 127.0.0.1)
//! - `--port` / `ABTEST_PORT` - bind port (default: 8000)
//! - `--log-level` / `ABTEST_LOG_LEVEL` - tracing filter (default: info)
//! - `--selector` / `ABTEST_SELECTOR` - variant selection strategy,
//!   `deterministic` (visitor-stable) or `random` (reassigns on every
//!   view; only suitable when no visitor identity is available)
//!
//! State is process-local and vanishes on restart.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use abtest_core::application::experiment::ExperimentService;
use abtest_core::application::metrics::MetricsService;
use abtest_core::application::selector::SelectionStrategy;
use abtest_core::infrastructure::repositories::{InMemoryEventStore, InMemoryTestCatalog};
use abtest_core::presentation::api::{app, AppState};

/// A/B testing backend - variant assignment and conversion metrics
#[derive(Parser)]
#[command(name = "abtest-server")]
#[command(version, about, long_about = None)]
struct Cli {
    /// HTTP API host
    #[arg(long, env = "ABTEST_HOST", default_value = "127.0.0.1")]
    host: String,

    /// HTTP API port
    #[arg(long, env = "ABTEST_PORT", default_value = "8000")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ABTEST_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Variant selection strategy (random, deterministic)
    #[arg(long, env = "ABTEST_SELECTOR", default_value = "deterministic")]
    selector: SelectionStrategy,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level)
        .with_context(|| format!("Invalid log level '{}'", cli.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let catalog = Arc::new(InMemoryTestCatalog::new());
    let events = Arc::new(InMemoryEventStore::new());

    let state = AppState {
        experiment_service: Arc::new(ExperimentService::new(
            catalog.clone(),
            events.clone(),
            cli.selector.build(),
        )),
        metrics_service: Arc::new(MetricsService::new(catalog.clone(), events)),
        catalog,
    };

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(selector = %cli.selector, "A/B testing backend listening on {}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server shutting down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
    }
}

//! LatencyTrail - HTTP endpoint latency monitor
//!
//! Probes the configured endpoints once per tick, keeps every measurement in
//! a JSON log and rewrites a summary of lifetime and recent statistics.

mod cli;
mod config;
mod db;
mod probe;
mod scheduler;

use clap::Parser;
use cli::Cli;
use config::MonitorConfig;
use scheduler::{log_summary, Monitor};

use std::process::ExitCode;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("latencytrail=info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    let cli = Cli::parse();

    // Load configuration
    let cfg = match MonitorConfig::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        "Monitoring {} endpoint(s), log at {}, results at {}",
        cfg.urls.len(),
        cfg.measurements_file.display(),
        cfg.results_file.display()
    );

    let client = match probe::build_client() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to create HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let interval = cfg.check_interval();
    let mut monitor = Monitor::new(cfg, client);
    tracing::info!("Continuing from {} measurement(s)", monitor.store().len());

    if cli.once {
        let summary = monitor.tick().await;
        log_summary(&summary);
        return ExitCode::SUCCESS;
    }

    // Ctrl-C is only acted on between ticks
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, stopping after the current check");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                tracing::warn!("Cannot listen for interrupts: {}", e);
                std::future::pending::<()>().await;
            }
        }
    });

    monitor.run_continuous(interval, shutdown_rx).await;

    ExitCode::SUCCESS
}

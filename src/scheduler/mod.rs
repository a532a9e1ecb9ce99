//! Scheduler module for running probe ticks and deriving statistics.

mod publish;
mod summary;

pub use publish::*;
pub use summary::*;

use crate::config::MonitorConfig;
use crate::db::{self, MeasurementStore, Summary};
use crate::probe::run_probe;

use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;

/// Owns the measurement log and runs ticks against the configured targets.
pub struct Monitor {
    config: MonitorConfig,
    client: reqwest::Client,
    store: MeasurementStore,
    results_file: PathBuf,
    publisher: Option<GitPublisher>,
}

impl Monitor {
    /// Create a monitor and restore the log from disk.
    ///
    /// The raw log is loaded first. A previous summary with window values then
    /// takes precedence and replaces it.
    pub fn new(config: MonitorConfig, client: reqwest::Client) -> Self {
        let mut store = MeasurementStore::new(&config.measurements_file);
        store.load();

        if store.is_empty() {
            tracing::info!("No previous measurements found");
        }

        let results_file = config.results_file.clone();
        match db::read_prior_summary(&results_file) {
            Ok(Some(prior)) => {
                store.reconcile_from_summary(&prior);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Could not load existing results: {}", e),
        }

        let publisher = config
            .auto_publish
            .then(|| GitPublisher::for_file(&results_file));

        Self {
            config,
            client,
            store,
            results_file,
            publisher,
        }
    }

    pub fn store(&self) -> &MeasurementStore {
        &self.store
    }

    /// Run one tick: probe, append, persist, summarize, publish.
    ///
    /// Nothing in here fails the tick; I/O and publish errors are logged.
    pub async fn tick(&mut self) -> Summary {
        let mut batch = Vec::with_capacity(self.config.urls.len());
        for target in &self.config.urls {
            batch.push(run_probe(&self.client, target).await);
        }
        self.store.append(batch);

        if let Err(e) = self.store.persist() {
            tracing::error!("Failed to save measurements: {}", e);
        }

        let summary = summarize(self.store.all());

        match db::write_summary(&self.results_file, &summary) {
            Ok(()) => tracing::info!("Statistics saved to {}", self.results_file.display()),
            Err(e) => tracing::error!("Failed to save results: {}", e),
        }

        if let Some(publisher) = &self.publisher {
            match publisher.publish(&self.results_file).await {
                Ok(()) => {}
                Err(e @ PublishError::NotRepository(_)) => {
                    tracing::warn!("Skipping publication: {}", e)
                }
                Err(e) => tracing::error!("Failed to publish results: {}", e),
            }
        }

        summary
    }

    /// Run ticks until `shutdown` flips to true.
    ///
    /// Shutdown is only observed between ticks, so a tick in progress always
    /// finishes persisting.
    pub async fn run_continuous(&mut self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        tracing::info!("Starting monitoring (interval: {:?})", interval);

        loop {
            let summary = self.tick().await;
            log_summary(&summary);

            if *shutdown.borrow() {
                break;
            }

            tracing::info!("Waiting {:?} until the next check", interval);
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Monitoring stopped");
    }
}

/// Log the statistics report for one tick.
pub fn log_summary(summary: &Summary) {
    let Some(stats) = &summary.stats else {
        tracing::info!("No measurements recorded yet");
        return;
    };

    tracing::info!(
        "Total checks: {} (success: {}, failed: {}, rate: {}%)",
        summary.total_checks,
        stats.successful_checks,
        stats.failed_checks,
        stats.success_rate
    );
    tracing::info!(
        "Response time avg {}ms, median {}ms, fastest {}ms, slowest {}ms",
        stats.avg_response_time_ms,
        stats.median_response_time_ms,
        stats.min_response_time_ms,
        stats.max_response_time_ms
    );
    tracing::info!(
        "Last {}: success {}, failed {}, rate {}%, avg {}ms, median {}ms",
        stats.last_10_values.len(),
        stats.last_10_successful,
        stats.last_10_failed,
        stats.last_10_success_rate,
        stats.last_10_avg_response_time_ms,
        stats.last_10_median_response_time_ms
    );

    for value in summary.last_10_values() {
        tracing::info!(
            "  {} #{}: {}ms ({})",
            if value.success { "ok  " } else { "FAIL" },
            value.measurement,
            value.response_time_ms,
            value.timestamp.format(db::timestamp::SECONDS_FORMAT)
        );
    }
}

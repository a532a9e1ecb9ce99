//! Probe module for endpoint monitoring.
//!
//! Runs one HTTP check per target and classifies the outcome into a
//! [`Measurement`].

mod http;

pub use http::*;

use std::time::Instant;
use thiserror::Error;

use crate::config::TargetConfig;
use crate::db::{timestamp, Measurement};

/// Probe error types.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("probe timed out")]
    Timeout,
    #[error("connection error: {0}")]
    Connection(String),
    #[error("{0}")]
    Other(String),
}

impl ProbeError {
    /// The value recorded in a measurement's `error` field.
    pub fn label(&self) -> String {
        match self {
            ProbeError::Timeout => "Timeout".to_string(),
            ProbeError::Connection(_) => "Connection Error".to_string(),
            ProbeError::Other(msg) => msg.clone(),
        }
    }
}

/// Round to `decimals` places, ties to even on the exact binary value.
pub fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}

/// Round to two decimals.
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// Probe `target` once and record the outcome.
///
/// Transport failures never escape: they become a failed measurement that
/// still carries the elapsed time.
pub async fn run_probe(client: &reqwest::Client, target: &TargetConfig) -> Measurement {
    tracing::debug!("Checking {} ({}) at {}", target.name, target.description, target.url);

    let timestamp = timestamp::now_micros();
    let start = Instant::now();

    let result = run_http_probe(client, &target.url, target.timeout_duration()).await;
    let response_time_ms = round2(start.elapsed().as_secs_f64() * 1000.0);

    let (status_code, success, error) = match result {
        Ok(response) => {
            let status_check = response.status == target.expected_status;
            let content_check = target.expected_content.is_empty()
                || response.body.contains(&target.expected_content);
            let success = status_check && content_check;

            if success {
                tracing::info!("{}: {} ({}ms)", target.name, response.status, response_time_ms);
            } else {
                tracing::warn!(
                    "{}: {} ({}ms) status_ok={} content_ok={}",
                    target.name,
                    response.status,
                    response_time_ms,
                    status_check,
                    content_check
                );
            }

            (Some(response.status), success, None)
        }
        Err(e) => {
            match &e {
                ProbeError::Timeout => {
                    tracing::warn!("{}: Timeout after {}ms", target.name, response_time_ms)
                }
                ProbeError::Connection(msg) => tracing::warn!(
                    "{}: Connection Error after {}ms: {}",
                    target.name,
                    response_time_ms,
                    msg
                ),
                ProbeError::Other(msg) => {
                    tracing::error!("{}: {} after {}ms", target.name, msg, response_time_ms)
                }
            }
            (None, false, Some(e.label()))
        }
    };

    Measurement {
        timestamp,
        name: target.name.clone(),
        url: target.url.clone(),
        status_code,
        response_time_ms,
        success,
        error,
    }
}

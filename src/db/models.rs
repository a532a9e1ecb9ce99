//! Stored record types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::timestamp;

/// One probe attempt against one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Probe start time
    #[serde(with = "timestamp::micros")]
    pub timestamp: NaiveDateTime,
    pub name: String,
    pub url: String,
    /// HTTP status, absent when the exchange never completed
    pub status_code: Option<u16>,
    /// Wall-clock latency of the attempt, failed attempts included
    pub response_time_ms: f64,
    pub success: bool,
    /// `Timeout`, `Connection Error` or the raw transport message
    pub error: Option<String>,
}

/// One entry of the recent window, as stored in the summary file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowValue {
    /// 1-based position inside the window
    pub measurement: usize,
    #[serde(with = "timestamp::seconds")]
    pub timestamp: NaiveDateTime,
    pub response_time_ms: f64,
    pub success: bool,
}

/// Statistics derived from the whole measurement log.
///
/// An empty log produces only `total_checks = 0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_checks: usize,
    #[serde(flatten)]
    pub stats: Option<SummaryStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub successful_checks: usize,
    pub failed_checks: usize,
    /// Percentage, one decimal
    pub success_rate: f64,
    pub avg_response_time_ms: f64,
    pub median_response_time_ms: f64,
    pub min_response_time_ms: f64,
    pub max_response_time_ms: f64,
    pub last_10_avg_response_time_ms: f64,
    pub last_10_median_response_time_ms: f64,
    pub last_10_min_response_time_ms: f64,
    pub last_10_max_response_time_ms: f64,
    pub last_10_successful: usize,
    pub last_10_failed: usize,
    pub last_10_success_rate: f64,
    pub last_10_values: Vec<WindowValue>,
}

impl Summary {
    pub fn last_10_values(&self) -> &[WindowValue] {
        self.stats
            .as_ref()
            .map(|s| s.last_10_values.as_slice())
            .unwrap_or_default()
    }
}

/// The parts of a previously written summary file needed at startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriorSummary {
    #[serde(default)]
    pub last_10_values: Vec<WindowValue>,
}

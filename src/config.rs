//! Configuration module for LatencyTrail.
//!
//! Loads the monitor configuration from a JSON file with sensible defaults
//! for every optional field.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration error types.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Monitor configuration loaded from the JSON config file.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Endpoints probed on every tick, in order.
    #[serde(default)]
    pub urls: Vec<TargetConfig>,
    /// Commit and push the results file after every tick (default: false)
    #[serde(default)]
    pub auto_publish: bool,
    /// Minutes to sleep between ticks in continuous mode (default: 1)
    #[serde(default = "default_check_interval_minutes")]
    pub check_interval_minutes: f64,
    /// Raw measurement log (default: "measurements.json")
    #[serde(default = "default_measurements_file")]
    pub measurements_file: PathBuf,
    /// Derived statistics file (default: "results.json")
    #[serde(default = "default_results_file")]
    pub results_file: PathBuf,
}

/// A single endpoint to probe.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    pub name: String,
    pub url: String,
    /// Request timeout in seconds (default: 15)
    #[serde(default = "default_timeout")]
    pub timeout: f64,
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
    /// Marker the body must contain; an empty string disables the check.
    #[serde(default = "default_expected_content")]
    pub expected_content: String,
    #[serde(default)]
    pub description: String,
}

fn default_check_interval_minutes() -> f64 {
    1.0
}

fn default_measurements_file() -> PathBuf {
    PathBuf::from("measurements.json")
}

fn default_results_file() -> PathBuf {
    PathBuf::from("results.json")
}

fn default_timeout() -> f64 {
    15.0
}

fn default_expected_status() -> u16 {
    200
}

fn default_expected_content() -> String {
    "isValid".to_string()
}

impl TargetConfig {
    pub fn timeout_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout).unwrap_or(Duration::MAX)
    }
}

impl MonitorConfig {
    /// Load and validate the configuration file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: MonitorConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !is_positive_duration(self.check_interval_minutes * 60.0) {
            return Err(ConfigError::Invalid(format!(
                "check_interval_minutes must be a positive number of minutes, got {}",
                self.check_interval_minutes
            )));
        }

        for target in &self.urls {
            if !is_positive_duration(target.timeout) {
                return Err(ConfigError::Invalid(format!(
                    "timeout for {} must be a positive number of seconds, got {}",
                    target.name, target.timeout
                )));
            }
        }

        Ok(())
    }

    /// Sleep between two ticks of the continuous loop.
    pub fn check_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.check_interval_minutes * 60.0).unwrap_or(Duration::MAX)
    }
}

fn is_positive_duration(secs: f64) -> bool {
    secs > 0.0 && Duration::try_from_secs_f64(secs).is_ok()
}

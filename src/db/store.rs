//! JSON file store for the measurement log and the summary file.

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::models::*;
use super::timestamp;

/// Identity given to measurements rebuilt from a summary file.
pub const RECOVERED_NAME: &str = "VIES API";
pub const RECOVERED_URL: &str =
    "https://ec.europa.eu/taxation_customs/vies/rest-api/ms/CZ/vat/CZ26185610";
/// Error recorded on rebuilt measurements that had failed.
pub const RECOVERED_ERROR: &str = "Previous error";

pub const CHECKER_VERSION: &str = "1.0";

/// Storage error types.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("JSON error on {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Append-only measurement log backed by a JSON array file.
#[derive(Debug)]
pub struct MeasurementStore {
    path: PathBuf,
    measurements: Vec<Measurement>,
}

impl MeasurementStore {
    /// Create an empty store that persists to `path`. Nothing is read yet.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            measurements: Vec::new(),
        }
    }

    /// Replace the in-memory log with the persisted one.
    ///
    /// A missing or unreadable file leaves the log empty.
    pub fn load(&mut self) {
        self.measurements = match read_json::<Vec<Measurement>>(&self.path) {
            Ok(Some(measurements)) => {
                tracing::info!(
                    "Loaded {} measurements from {}",
                    measurements.len(),
                    self.path.display()
                );
                measurements
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Ignoring measurement log: {}", e);
                Vec::new()
            }
        };
    }

    /// Rebuild the log from the window of a previous summary.
    ///
    /// Whatever `load` produced is discarded. Returns false and leaves the log
    /// untouched when the summary has no window values.
    pub fn reconcile_from_summary(&mut self, summary: &PriorSummary) -> bool {
        if summary.last_10_values.is_empty() {
            return false;
        }

        let discarded = self.measurements.len();
        self.measurements = summary
            .last_10_values
            .iter()
            .map(|value| Measurement {
                timestamp: timestamp::truncate_to_second(value.timestamp),
                name: RECOVERED_NAME.to_string(),
                url: RECOVERED_URL.to_string(),
                status_code: if value.success { Some(200) } else { None },
                response_time_ms: value.response_time_ms,
                success: value.success,
                error: if value.success {
                    None
                } else {
                    Some(RECOVERED_ERROR.to_string())
                },
            })
            .collect();

        tracing::info!(
            "Rebuilt {} measurements from previous results (discarded {} loaded)",
            self.measurements.len(),
            discarded
        );
        true
    }

    /// Append a batch in the order received.
    pub fn append<I>(&mut self, batch: I)
    where
        I: IntoIterator<Item = Measurement>,
    {
        self.measurements.extend(batch);
    }

    pub fn all(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Write the full log as indented JSON.
    pub fn persist(&self) -> Result<(), StoreError> {
        write_json(&self.path, &self.measurements)
    }
}

#[derive(Serialize)]
struct SummaryDocument<'a> {
    #[serde(flatten)]
    summary: &'a Summary,
    last_updated: String,
    checker_version: &'static str,
}

/// Overwrite the summary file with `summary`, stamped with the write time.
pub fn write_summary<P: AsRef<Path>>(path: P, summary: &Summary) -> Result<(), StoreError> {
    let doc = SummaryDocument {
        summary,
        last_updated: timestamp::now_micros()
            .format(timestamp::MICROS_FORMAT)
            .to_string(),
        checker_version: CHECKER_VERSION,
    };
    write_json(path.as_ref(), &doc)
}

/// Read a previously written summary file. `Ok(None)` when it does not exist.
pub fn read_prior_summary<P: AsRef<Path>>(path: P) -> Result<Option<PriorSummary>, StoreError> {
    read_json(path.as_ref())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    let body = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    std::fs::write(path, body).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

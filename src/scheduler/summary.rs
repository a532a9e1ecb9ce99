//! Summary statistics over the measurement log.

use crate::db::{timestamp, Measurement, Summary, SummaryStats, WindowValue};
use crate::probe::{round2, round_to};

/// Number of most recent measurements in the recent-trend window.
pub const WINDOW_SIZE: usize = 10;

/// Latency statistics over one slice of the log.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LatencyStats {
    pub avg: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

/// Compute the full summary from scratch.
///
/// Always recomputes over the whole log, so a log that was just rebuilt from a
/// previous summary is handled like any other.
pub fn summarize(log: &[Measurement]) -> Summary {
    if log.is_empty() {
        return Summary {
            total_checks: 0,
            stats: None,
        };
    }

    let total_checks = log.len();
    let successful_checks = count_successful(log);
    let latency = latency_stats(log);

    let window = &log[log.len().saturating_sub(WINDOW_SIZE)..];
    let window_successful = count_successful(window);
    let window_latency = latency_stats(window);

    let last_10_values = window
        .iter()
        .enumerate()
        .map(|(i, m)| WindowValue {
            measurement: i + 1,
            timestamp: timestamp::truncate_to_second(m.timestamp),
            response_time_ms: m.response_time_ms,
            success: m.success,
        })
        .collect();

    Summary {
        total_checks,
        stats: Some(SummaryStats {
            successful_checks,
            failed_checks: total_checks - successful_checks,
            success_rate: success_rate(successful_checks, total_checks),
            avg_response_time_ms: round2(latency.avg),
            median_response_time_ms: round2(latency.median),
            min_response_time_ms: round2(latency.min),
            max_response_time_ms: round2(latency.max),
            last_10_avg_response_time_ms: round2(window_latency.avg),
            last_10_median_response_time_ms: round2(window_latency.median),
            last_10_min_response_time_ms: round2(window_latency.min),
            last_10_max_response_time_ms: round2(window_latency.max),
            last_10_successful: window_successful,
            last_10_failed: window.len() - window_successful,
            last_10_success_rate: success_rate(window_successful, window.len()),
            last_10_values,
        }),
    }
}

fn count_successful(log: &[Measurement]) -> usize {
    log.iter().filter(|m| m.success).count()
}

/// Percentage with one decimal; zero for an empty slice.
fn success_rate(successful: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(successful as f64 / total as f64 * 100.0, 1)
}

/// Latency statistics over the non-zero response times of `log`.
///
/// A latency of exactly zero is treated as missing and left out, matching the
/// files produced by earlier versions. All fields are zero when nothing is left.
pub fn latency_stats(log: &[Measurement]) -> LatencyStats {
    let mut values: Vec<f64> = log
        .iter()
        .map(|m| m.response_time_ms)
        .filter(|v| *v != 0.0)
        .collect();

    if values.is_empty() {
        return LatencyStats::default();
    }

    let sum: f64 = values.iter().sum();
    let avg = sum / values.len() as f64;

    values.sort_by(|a, b| a.total_cmp(b));

    LatencyStats {
        avg,
        median: median_sorted(&values),
        min: values[0],
        max: values[values.len() - 1],
    }
}

/// Median of an ascending, non-empty slice.
fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_micro_opt(8, 0, 0, 654_321)
            .unwrap()
    }

    fn log_of(latencies: &[f64]) -> Vec<Measurement> {
        latencies
            .iter()
            .enumerate()
            .map(|(i, &latency)| Measurement {
                timestamp: base() + Duration::minutes(i as i64),
                name: "target".to_string(),
                url: "https://example.com".to_string(),
                status_code: Some(200),
                response_time_ms: latency,
                success: true,
                error: None,
            })
            .collect()
    }

    #[test]
    fn test_empty_log() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_checks, 0);
        assert!(summary.stats.is_none());
        assert!(summary.last_10_values().is_empty());

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json, serde_json::json!({"total_checks": 0}));
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(latency_stats(&log_of(&[30.0, 10.0, 20.0])).median, 20.0);
        assert_eq!(latency_stats(&log_of(&[40.0, 10.0, 30.0, 20.0])).median, 25.0);
    }

    #[test]
    fn test_counts_and_rates() {
        let mut log = log_of(&[100.0, 200.0, 300.0]);
        log[1].success = false;
        log[1].status_code = Some(500);

        let summary = summarize(&log);
        let stats = summary.stats.as_ref().unwrap();
        assert_eq!(summary.total_checks, 3);
        assert_eq!(stats.successful_checks, 2);
        assert_eq!(stats.failed_checks, 1);
        assert_eq!(stats.successful_checks + stats.failed_checks, summary.total_checks);
        assert_eq!(stats.success_rate, 66.7);
        assert_eq!(stats.avg_response_time_ms, 200.0);
        assert_eq!(stats.min_response_time_ms, 100.0);
        assert_eq!(stats.max_response_time_ms, 300.0);
        assert_eq!(stats.last_10_success_rate, 66.7);
    }

    #[test]
    fn test_window_is_tail_of_log() {
        let latencies: Vec<f64> = (1..=15).map(|i| i as f64 * 10.0).collect();
        let log = log_of(&latencies);

        let summary = summarize(&log);
        let stats = summary.stats.as_ref().unwrap();
        let values = &stats.last_10_values;

        assert_eq!(values.len(), 10);
        for (i, value) in values.iter().enumerate() {
            assert_eq!(value.measurement, i + 1);
            assert_eq!(value.response_time_ms, log[i + 5].response_time_ms);
            assert_eq!(
                value.timestamp,
                timestamp::truncate_to_second(log[i + 5].timestamp)
            );
        }
        assert_eq!(stats.last_10_min_response_time_ms, 60.0);
        assert_eq!(stats.last_10_max_response_time_ms, 150.0);
        assert_eq!(stats.last_10_avg_response_time_ms, 105.0);
        assert_eq!(stats.last_10_median_response_time_ms, 105.0);
        assert_eq!(stats.min_response_time_ms, 10.0);
    }

    #[test]
    fn test_short_log_window_is_whole_log() {
        let log = log_of(&[5.0, 6.0]);
        let summary = summarize(&log);
        assert_eq!(summary.last_10_values().len(), 2);
        assert_eq!(summary.last_10_values()[1].measurement, 2);
    }

    #[test]
    fn test_window_timestamp_serialized_to_second() {
        let summary = summarize(&log_of(&[5.0]));
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["last_10_values"][0]["timestamp"], "2025-01-02T08:00:00");
        assert_eq!(json["last_10_values"][0]["measurement"], 1);
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let mut log = log_of(&[12.5, 80.25, 33.0, 41.75]);
        log[2].success = false;
        assert_eq!(summarize(&log), summarize(&log));
    }

    #[test]
    fn test_total_checks_matches_log_length() {
        for n in 1..=25 {
            let latencies: Vec<f64> = (0..n).map(|i| 1.0 + i as f64).collect();
            let summary = summarize(&log_of(&latencies));
            assert_eq!(summary.total_checks, n);
            assert_eq!(summary.last_10_values().len(), n.min(WINDOW_SIZE));
        }
    }

    #[test]
    fn test_rounding_ties_to_even() {
        let mut latencies = vec![10.125];
        latencies.extend(std::iter::repeat(0.0).take(15));
        let mut log = log_of(&latencies);
        for m in log.iter_mut().skip(1) {
            m.success = false;
        }

        let summary = summarize(&log);
        let stats = summary.stats.as_ref().unwrap();
        assert_eq!(stats.success_rate, 6.2);
        assert_eq!(stats.avg_response_time_ms, 10.12);
        assert_eq!(stats.median_response_time_ms, 10.12);

        for m in log.iter_mut().take(5) {
            m.success = true;
        }
        assert_eq!(summarize(&log).stats.unwrap().success_rate, 31.2);
    }

    // Zero latency is treated as missing, so it drops out of every aggregate.
    #[test]
    fn test_zero_latency_excluded_from_aggregates() {
        let log = log_of(&[0.0, 10.0, 20.0]);
        let summary = summarize(&log);
        let stats = summary.stats.as_ref().unwrap();

        assert_eq!(summary.total_checks, 3);
        assert_eq!(stats.min_response_time_ms, 10.0);
        assert_eq!(stats.avg_response_time_ms, 15.0);
        assert_eq!(stats.median_response_time_ms, 15.0);
        assert_eq!(stats.last_10_values[0].response_time_ms, 0.0);

        let only_zero = summarize(&log_of(&[0.0]));
        let stats = only_zero.stats.as_ref().unwrap();
        assert_eq!(stats.avg_response_time_ms, 0.0);
        assert_eq!(stats.max_response_time_ms, 0.0);
    }
}

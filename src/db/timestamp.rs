//! Timestamp formats used in the JSON files.
//!
//! Measurements carry local time with microsecond precision, window values
//! are truncated to the second. Parsing accepts every shape either file
//! has ever been written with.

use chrono::{DateTime, Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serializer};

pub const MICROS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
pub const SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Current local time at microsecond precision.
pub fn now_micros() -> NaiveDateTime {
    let now = Local::now().naive_local();
    let micros = now.nanosecond() / 1_000 * 1_000;
    now.with_nanosecond(micros).unwrap_or(now)
}

/// Drop the sub-second part of a timestamp.
pub fn truncate_to_second(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_nanosecond(0).unwrap_or(dt)
}

/// Parse a timestamp string from a measurement or summary file.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let formats = ["%Y-%m-%dT%H:%M:%S%.f", SECONDS_FORMAT, "%Y-%m-%d %H:%M:%S%.f"];

    for fmt in &formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Local).naive_local())
}

fn deserialize_any<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_timestamp(&s)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s)))
}

/// `%Y-%m-%dT%H:%M:%S.ffffff`
pub mod micros {
    use super::*;

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&dt.format(MICROS_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        deserialize_any(deserializer)
    }
}

/// `%Y-%m-%dT%H:%M:%S`
pub mod seconds {
    use super::*;

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&dt.format(SECONDS_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        deserialize_any(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_micro_opt(9, 26, 53, 589_793)
            .unwrap()
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!(parse_timestamp("2025-03-14T09:26:53.589793"), Some(sample()));
        assert_eq!(
            parse_timestamp("2025-03-14T09:26:53"),
            Some(truncate_to_second(sample()))
        );
        assert_eq!(
            parse_timestamp("2025-03-14 09:26:53.589793"),
            Some(sample())
        );
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_formats_render() {
        assert_eq!(
            sample().format(MICROS_FORMAT).to_string(),
            "2025-03-14T09:26:53.589793"
        );
        assert_eq!(
            truncate_to_second(sample()).format(MICROS_FORMAT).to_string(),
            "2025-03-14T09:26:53.000000"
        );
        assert_eq!(
            sample().format(SECONDS_FORMAT).to_string(),
            "2025-03-14T09:26:53"
        );
    }

    #[test]
    fn test_now_has_microsecond_precision() {
        assert_eq!(now_micros().nanosecond() % 1_000, 0);
    }
}

//! Date utility functions for schedule snapshots
//!
//! Durations and CPM offsets are plain day counts on one implicit calendar.
//! Calendar dates only appear on the raw activity records (planned and
//! actual dates) and in the data-date comparisons of the quality checks.

use chrono::{NaiveDate, NaiveDateTime};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date-time layouts produced by common schedule exports
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse a date string, ignoring any time-of-day component
/// Returns None for empty or unrecognized input
pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    let trimmed = date_str.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(d) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Some(d);
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|dt| dt.date())
}

/// Format a date in "YYYY-MM-DD" form
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Check whether a planned date has already passed relative to the data date
pub fn is_past(date: NaiveDate, data_date: NaiveDate) -> bool {
    date < data_date
}

/// Serde adapter for optional dates on input records
///
/// Deserializing accepts every layout `parse_date` understands; empty or
/// malformed strings become `None` instead of failing the whole network.
pub mod opt_date {
    use super::{format_date, parse_date};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_some(&format_date(*d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn parse_plain_and_timestamped_dates() {
        assert_eq!(parse_date("2024-03-01"), Some(d("2024-03-01")));
        assert_eq!(parse_date("2024-03-01 08:00"), Some(d("2024-03-01")));
        assert_eq!(parse_date("2024-03-01T17:30:00"), Some(d("2024-03-01")));
        assert_eq!(parse_date("  2024-03-01  "), Some(d("2024-03-01")));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("01/03/2024"), None);
        assert_eq!(parse_date("2024-13-40"), None);
    }

    #[test]
    fn is_past_is_strict() {
        assert!(is_past(d("2024-01-01"), d("2024-01-02")));
        assert!(!is_past(d("2024-01-02"), d("2024-01-02")));
    }

    #[test]
    fn opt_date_serde() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Holder {
            #[serde(default, with = "opt_date")]
            at: Option<NaiveDate>,
        }

        let h: Holder = serde_json::from_str(r#"{"at":"2024-02-29 08:00"}"#).unwrap();
        assert_eq!(h.at, Some(d("2024-02-29")));

        let h: Holder = serde_json::from_str(r#"{"at":"not a date"}"#).unwrap();
        assert_eq!(h.at, None);

        let h: Holder = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(h.at, None);

        let out = serde_json::to_string(&Holder { at: Some(d("2024-02-29")) }).unwrap();
        assert_eq!(out, r#"{"at":"2024-02-29"}"#);
    }
}

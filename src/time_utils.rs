// SPDX-License-Identifier: MIT

//! Shared helpers for date/time formatting and comparison.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 with microsecond precision and a `Z`
/// suffix. All document timestamps are stored in this format.
pub fn now_rfc3339() -> String {
    format_utc_rfc3339(Utc::now())
}

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Whether an RFC3339 timestamp falls within the last `minutes` minutes.
///
/// Unparseable or missing timestamps count as outside the window.
pub fn is_within_minutes(timestamp: &str, minutes: i64) -> bool {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(ts) => {
            let age = Utc::now().signed_duration_since(ts.with_timezone(&Utc));
            age >= chrono::Duration::zero() && age <= chrono::Duration::minutes(minutes)
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_rfc3339_has_z_suffix() {
        let ts = now_rfc3339();
        assert!(ts.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn test_is_within_minutes() {
        let just_now = format_utc_rfc3339(Utc::now() - chrono::Duration::seconds(30));
        assert!(is_within_minutes(&just_now, 2));

        let stale = format_utc_rfc3339(Utc::now() - chrono::Duration::minutes(5));
        assert!(!is_within_minutes(&stale, 2));

        assert!(!is_within_minutes("not-a-timestamp", 2));
        assert!(!is_within_minutes("", 2));
    }
}

//! Jira-style timestamps such as `2024-01-01T09:00:00.000+0900`.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const JIRA_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";
const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Stand-in for a missing or malformed backlog timestamp.
pub const SENTINEL_TIMESTAMP: &str = "2030-01-01T00:00:00.000+0000";

/// An instant that keeps the offset it was reported in.
///
/// Serializes back with a 4-digit offset suffix so values survive a round trip unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    pub fn parse(value: &str) -> Option<Self> {
        DateTime::parse_from_str(value, JIRA_FORMAT)
            .or_else(|_| DateTime::parse_from_rfc3339(value))
            .ok()
            .map(Self)
    }

    /// Parse, substituting [`SENTINEL_TIMESTAMP`] when absent or malformed.
    pub fn parse_or_sentinel(value: Option<&str>) -> Self {
        value
            .and_then(Self::parse)
            .unwrap_or_else(Self::sentinel)
    }

    pub fn sentinel() -> Self {
        let naive = NaiveDate::from_ymd_opt(2030, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        Self(naive.and_utc().fixed_offset())
    }

    pub fn as_datetime(&self) -> &DateTime<FixedOffset> {
        &self.0
    }

    /// Whole wall-clock minutes from `self` to `later`, truncated toward zero.
    pub fn minutes_until(&self, later: &Timestamp) -> i64 {
        later.0.signed_duration_since(self.0).num_minutes()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(OUTPUT_FORMAT))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_jira_format_and_keeps_offset() {
        let ts = Timestamp::parse("2024-01-01T09:00:00.000+0900").unwrap();
        assert_eq!(ts.as_datetime().offset().local_minus_utc(), 9 * 3600);
        assert_eq!(ts.to_string(), "2024-01-01T09:00:00.000+0900");
    }

    #[test]
    fn accepts_rfc3339_and_missing_fraction() {
        let a = Timestamp::parse("2024-01-01T09:00:00+09:00").unwrap();
        let b = Timestamp::parse("2024-01-01T09:00:00+0900").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "2024-01-01T09:00:00.000+0900");
    }

    #[test]
    fn sentinel_for_missing_or_malformed() {
        let sentinel = Timestamp::sentinel();
        assert_eq!(sentinel.to_string(), SENTINEL_TIMESTAMP);
        assert_eq!(Timestamp::parse_or_sentinel(None), sentinel);
        assert_eq!(Timestamp::parse_or_sentinel(Some("not a date")), sentinel);
    }

    #[test]
    fn minutes_compare_instants_across_offsets() {
        let start = Timestamp::parse("2024-01-01T09:00:00.000+0900").unwrap();
        let end = Timestamp::parse("2024-01-01T01:30:00.000+0000").unwrap();
        assert_eq!(start.minutes_until(&end), 90);
        assert!(start < end);
    }
}

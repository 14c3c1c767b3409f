//! # Temporal Types — UTC-Only Timestamps and Validity Windows
//!
//! `Timestamp` enforces UTC with Z suffix at seconds precision, so the
//! canonical byte sequence of a timestamped payload is deterministic.
//! `TimeWindow` models the validity window the acceptor stamps onto a
//! transaction and the tolerance the notary checks it against.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A UTC-only timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// From a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 string, rejecting non-UTC offsets.
    ///
    /// Only the `Z` suffix is accepted — even `+00:00`, though semantically
    /// equivalent, is rejected so that canonical byte representations stay
    /// deterministic.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if !s.ends_with('Z') {
            return Err(CoreError::Timestamp(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| CoreError::Timestamp(format!("invalid RFC 3339 timestamp {s:?}: {e}")))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Unix epoch seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Absolute distance to another timestamp, in seconds.
    pub fn abs_diff_secs(&self, other: &Timestamp) -> u64 {
        (self.epoch_secs() - other.epoch_secs()).unsigned_abs()
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

/// A transaction validity window: a midpoint with symmetric tolerance.
///
/// The acceptor anchors the window at its local wall clock when it
/// re-derives the transaction; the notary refuses to sign when the
/// midpoint is outside its own tolerance of the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Center of the window.
    pub midpoint: Timestamp,
    /// Symmetric tolerance in seconds on each side of the midpoint.
    pub tolerance_secs: u64,
}

impl TimeWindow {
    /// Default notary timestamp tolerance.
    pub const DEFAULT_TOLERANCE_SECS: u64 = 30;

    /// A window centered on the given instant with the given tolerance.
    pub fn new(midpoint: Timestamp, tolerance_secs: u64) -> Self {
        Self {
            midpoint,
            tolerance_secs,
        }
    }

    /// A window centered on the current wall clock with the default
    /// 30-second tolerance.
    pub fn around_now() -> Self {
        Self::new(Timestamp::now(), Self::DEFAULT_TOLERANCE_SECS)
    }

    /// Whether an instant falls inside this window.
    pub fn contains(&self, instant: &Timestamp) -> bool {
        instant.abs_diff_secs(&self.midpoint) <= self.tolerance_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    #[test]
    fn now_has_no_subseconds() {
        assert_eq!(Timestamp::now().as_datetime().nanosecond(), 0);
    }

    #[test]
    fn from_utc_truncates() {
        let dt = Utc
            .with_ymd_and_hms(2026, 1, 15, 12, 30, 45)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        assert_eq!(Timestamp::from_utc(dt).to_iso8601(), "2026-01-15T12:30:45Z");
    }

    #[test]
    fn parse_rejects_offsets() {
        assert!(Timestamp::parse("2026-01-15T12:00:00+00:00").is_err());
        assert!(Timestamp::parse("2026-01-15T17:00:00+05:00").is_err());
        assert!(Timestamp::parse("not-a-date").is_err());
    }

    #[test]
    fn parse_accepts_z() {
        assert_eq!(at("2026-01-15T12:00:00Z").to_iso8601(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn ordering() {
        assert!(at("2026-01-15T12:00:00Z") < at("2026-01-15T12:00:01Z"));
    }

    #[test]
    fn window_contains_midpoint_and_edges() {
        let w = TimeWindow::new(at("2026-01-15T12:00:00Z"), 30);
        assert!(w.contains(&at("2026-01-15T12:00:00Z")));
        assert!(w.contains(&at("2026-01-15T12:00:30Z")));
        assert!(w.contains(&at("2026-01-15T11:59:30Z")));
        assert!(!w.contains(&at("2026-01-15T12:00:31Z")));
        assert!(!w.contains(&at("2026-01-15T11:59:29Z")));
    }

    #[test]
    fn serde_roundtrip() {
        let w = TimeWindow::new(at("2026-01-15T12:00:00Z"), 30);
        let json = serde_json::to_string(&w).unwrap();
        let back: TimeWindow = serde_json::from_str(&json).unwrap();
        assert_eq!(w, back);
    }
}

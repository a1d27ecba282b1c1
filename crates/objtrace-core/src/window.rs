//! Time bucketing
//!
//! A caller-supplied timestamp is only approximate, so searches run over the
//! half-hour bucket containing it rather than around the instant itself.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Bucket length in minutes
pub const BUCKET_MINUTES: i64 = 30;

const BUCKET_SECS: i64 = BUCKET_MINUTES * 60;

/// Half-open search window `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// The bucket containing `instant`, aligned to UTC half-hour boundaries
    pub fn containing(instant: DateTime<Utc>) -> Self {
        let offset_secs = instant.timestamp().rem_euclid(BUCKET_SECS);
        let start = instant
            - Duration::seconds(offset_secs)
            - Duration::nanoseconds(i64::from(instant.timestamp_subsec_nanos()));
        Self {
            start,
            end: start + Duration::minutes(BUCKET_MINUTES),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Parse an RFC 3339 timestamp and return its bucket
pub fn bucket(timestamp: &str) -> Result<TimeWindow, chrono::ParseError> {
    let instant = parse_timestamp(timestamp)?;
    Ok(TimeWindow::containing(instant))
}

/// Parse an RFC 3339 timestamp into UTC
pub fn parse_timestamp(timestamp: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(timestamp).map(|t| t.with_timezone(&Utc))
}

//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wire format for gateway request times: ISO-8601 with milliseconds and an
/// explicit offset, e.g. `2024-01-01T12:00:00.123+00:00`.
const GATEWAY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the timestamp as Unix milliseconds.
    pub fn as_unix_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Renders the timestamp the way the gateway expects `requestTime`.
    pub fn to_gateway_format(&self) -> String {
        self.0.format(GATEWAY_TIME_FORMAT).to_string()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

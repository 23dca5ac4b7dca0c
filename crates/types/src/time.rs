//! Block time representation.
//!
//! Block timestamps are kept as signed microseconds since the Unix epoch (UTC).
//! Signed arithmetic lets the emission engine observe a clock that stutters or
//! runs backwards without wrapping; all differences saturate instead of
//! overflowing.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Microseconds per second.
pub const MICROS_PER_SEC: i64 = 1_000_000;

/// Fixed emission year: 365 days, not calendar aware.
pub const ONE_YEAR: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// [`ONE_YEAR`] expressed in microseconds.
pub const ONE_YEAR_MICROS: i64 = 365 * 24 * 60 * 60 * MICROS_PER_SEC;

/// Block timestamp in microseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BlockTime(i64);

impl BlockTime {
    pub const UNIX_EPOCH: Self = Self(0);

    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    pub const fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(MICROS_PER_SEC))
    }

    pub const fn as_micros(self) -> i64 {
        self.0
    }

    /// Signed distance from `earlier` to `self`, in microseconds.
    ///
    /// Negative when `self` precedes `earlier`. Saturates at the `i64` bounds.
    pub fn micros_since(self, earlier: BlockTime) -> i64 {
        self.0.saturating_sub(earlier.0)
    }

    /// `true` when at least `period` has passed between `earlier` and `self`.
    ///
    /// A negative distance never satisfies a period, including a zero period.
    pub fn has_elapsed(self, earlier: BlockTime, period: Duration) -> bool {
        let elapsed = self.micros_since(earlier);
        elapsed >= 0 && elapsed >= duration_micros(period)
    }

    pub fn saturating_add(self, span: Duration) -> Self {
        Self(self.0.saturating_add(duration_micros(span)))
    }

    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime.timestamp_micros())
    }

    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        let secs = self.0.div_euclid(MICROS_PER_SEC);
        let nanos = (self.0.rem_euclid(MICROS_PER_SEC) * 1_000) as u32;
        DateTime::<Utc>::from_timestamp(secs, nanos)
    }

    /// Current wall-clock time. Only hosts call this; the engine never does.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }
}

impl fmt::Display for BlockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(datetime) => f.write_str(&datetime.to_rfc3339_opts(SecondsFormat::Micros, true)),
            None => write!(f, "{}us", self.0),
        }
    }
}

impl FromStr for BlockTime {
    type Err = chrono::ParseError;

    /// Parses an RFC 3339 timestamp, e.g. `2024-01-01T00:00:00Z`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = DateTime::parse_from_rfc3339(s.trim())?;
        Ok(Self::from_datetime(parsed.with_timezone(&Utc)))
    }
}

impl From<DateTime<Utc>> for BlockTime {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::from_datetime(datetime)
    }
}

/// Convert a duration to whole microseconds, saturating at `i64::MAX`.
pub fn duration_micros(span: Duration) -> i64 {
    i64::try_from(span.as_micros()).unwrap_or(i64::MAX)
}

//! Signed nanosecond durations
//!
//! Samples, means and derived statistics are all carried as a signed count
//! of nanoseconds. `std::time::Duration` cannot represent the negative
//! deltas the running mean produces, so it is only accepted as input.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

const NANOS_PER_MICRO: i64 = 1_000;
const NANOS_PER_MILLI: i64 = 1_000_000;
const NANOS_PER_SEC: i64 = 1_000_000_000;

/// A signed duration in nanoseconds
///
/// Serialized as a bare integer, so `Nanos(1500)` is written as `1500`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Nanos(pub i64);

impl Nanos {
    /// Zero duration
    pub const ZERO: Nanos = Nanos(0);
    /// Largest representable duration (about 292 years)
    pub const MAX: Nanos = Nanos(i64::MAX);
    /// Smallest representable duration
    pub const MIN: Nanos = Nanos(i64::MIN);

    /// Create a duration from a nanosecond count
    pub const fn new(nanos: i64) -> Self {
        Nanos(nanos)
    }

    /// Nanosecond count
    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// Duration in (fractional) seconds
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / NANOS_PER_SEC as f64
    }

    /// Duration in (fractional) milliseconds
    pub fn as_millis_f64(self) -> f64 {
        self.0 as f64 / NANOS_PER_MILLI as f64
    }

    /// Convert to a chrono `TimeDelta`
    pub fn to_time_delta(self) -> TimeDelta {
        TimeDelta::nanoseconds(self.0)
    }

    /// Clamp a wide intermediate back into the `i64` range
    pub(crate) fn saturating_from_i128(value: i128) -> Self {
        Nanos(i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX }))
    }
}

impl From<Duration> for Nanos {
    /// Saturates at [`Nanos::MAX`] for durations beyond `i64` nanoseconds.
    fn from(duration: Duration) -> Self {
        Nanos(i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX))
    }
}

impl From<TimeDelta> for Nanos {
    /// Saturates at the `i64` bounds, keeping the sign of the delta.
    fn from(delta: TimeDelta) -> Self {
        match delta.num_nanoseconds() {
            Some(nanos) => Nanos(nanos),
            None if delta < TimeDelta::zero() => Nanos::MIN,
            None => Nanos::MAX,
        }
    }
}

impl From<Nanos> for TimeDelta {
    fn from(nanos: Nanos) -> Self {
        nanos.to_time_delta()
    }
}

impl From<i64> for Nanos {
    fn from(nanos: i64) -> Self {
        Nanos(nanos)
    }
}

impl fmt::Display for Nanos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.0.unsigned_abs();
        if abs < NANOS_PER_MICRO as u64 {
            write!(f, "{}ns", self.0)
        } else if abs < NANOS_PER_MILLI as u64 {
            write!(f, "{:.3}µs", self.0 as f64 / NANOS_PER_MICRO as f64)
        } else if abs < NANOS_PER_SEC as u64 {
            write!(f, "{:.3}ms", self.as_millis_f64())
        } else {
            write!(f, "{:.3}s", self.as_secs_f64())
        }
    }
}

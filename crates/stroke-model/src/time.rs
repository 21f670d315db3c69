//! Timestamps and durations.
//!
//! Both types are plain seconds stored as `f64`. `Time` is monotonic within a
//! stroke; the only sample allowed to jump backwards is the `Down` that starts
//! a new stroke. Callers that record integer nanoseconds convert with
//! [`Time::from_nanos`].

use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A point in time, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Time(pub f64);

/// A signed span of time, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Duration(pub f64);

impl Time {
    pub const fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    pub fn from_nanos(ns: u64) -> Self {
        Self(ns as f64 / 1_000_000_000.0)
    }

    pub fn as_secs(self) -> f64 {
        self.0
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl Duration {
    pub const ZERO: Duration = Duration(0.0);

    pub const fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    /// The period of a rate given in Hz.
    pub fn from_rate(hz: f64) -> Self {
        Self(1.0 / hz)
    }

    pub fn as_secs(self) -> f64 {
        self.0
    }
}

impl Sub for Time {
    type Output = Duration;
    fn sub(self, rhs: Time) -> Duration {
        Duration(self.0 - rhs.0)
    }
}

impl Add<Duration> for Time {
    type Output = Time;
    fn add(self, rhs: Duration) -> Time {
        Time(self.0 + rhs.0)
    }
}

impl AddAssign<Duration> for Time {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs.0;
    }
}

impl Sub<Duration> for Time {
    type Output = Time;
    fn sub(self, rhs: Duration) -> Time {
        Time(self.0 - rhs.0)
    }
}

impl Add for Duration {
    type Output = Duration;
    fn add(self, rhs: Duration) -> Duration {
        Duration(self.0 + rhs.0)
    }
}

impl Sub for Duration {
    type Output = Duration;
    fn sub(self, rhs: Duration) -> Duration {
        Duration(self.0 - rhs.0)
    }
}

impl Mul<f64> for Duration {
    type Output = Duration;
    fn mul(self, rhs: f64) -> Duration {
        Duration(self.0 * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_arithmetic() {
        let start = Time(1.5);
        let end = start + Duration(0.25);
        assert_eq!(end, Time(1.75));
        assert_eq!(end - start, Duration(0.25));
        assert_eq!(end - Duration(0.75), Time(1.0));
        assert!(end > start);
    }

    #[test]
    fn test_nanos_conversion() {
        assert!((Time::from_nanos(1_500_000_000).as_secs() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_rate_period() {
        assert!((Duration::from_rate(200.0).as_secs() - 0.005).abs() < 1e-12);
        assert_eq!(Duration(0.01) * 3.0, Duration(0.03));
    }

    #[test]
    fn test_serializes_as_plain_seconds() {
        assert_eq!(serde_json::to_string(&Time(0.5)).unwrap(), "0.5");
        let parsed: Duration = serde_json::from_str("0.02").unwrap();
        assert_eq!(parsed, Duration(0.02));
    }
}

//! Simulation time model.
//!
//! # Design
//!
//! `Time` is an absolute simulation instant in seconds since the start of the
//! run, driven by an external discrete-event scheduler.  Differences between
//! instants are [`Duration`]s:
//!
//!   Time − Time     = Duration
//!   Time ± Duration = Time
//!
//! Perception results are tagged with the `Time` at which they were computed
//! via [`TimeStamped`], so consumers can tell this tick's data from stale data.

use std::fmt;

use crate::Duration;

// ── Time ─────────────────────────────────────────────────────────────────────

/// An absolute simulation instant in seconds.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Time(pub f64);

impl Time {
    pub const ZERO: Time = Time(0.0);

    #[inline]
    pub const fn new(si: f64) -> Self {
        Time(si)
    }

    #[inline]
    pub const fn si(self) -> f64 {
        self.0
    }

    /// The later of two instants.
    #[inline]
    pub fn max(self, other: Time) -> Time {
        Time(self.0.max(other.0))
    }
}

impl std::ops::Sub for Time {
    type Output = Duration;
    #[inline]
    fn sub(self, rhs: Time) -> Duration {
        Duration(self.0 - rhs.0)
    }
}

impl std::ops::Add<Duration> for Time {
    type Output = Time;
    #[inline]
    fn add(self, rhs: Duration) -> Time {
        Time(self.0 + rhs.0)
    }
}

impl std::ops::Sub<Duration> for Time {
    type Output = Time;
    #[inline]
    fn sub(self, rhs: Duration) -> Time {
        Time(self.0 - rhs.0)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.3}s", self.0)
    }
}

// ── TimeStamped ───────────────────────────────────────────────────────────────

/// A value paired with the simulation time at which it was produced.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeStamped<T> {
    object:    T,
    timestamp: Time,
}

impl<T> TimeStamped<T> {
    pub fn new(object: T, timestamp: Time) -> Self {
        Self { object, timestamp }
    }

    #[inline]
    pub fn object(&self) -> &T {
        &self.object
    }

    #[inline]
    pub fn timestamp(&self) -> Time {
        self.timestamp
    }

    pub fn into_object(self) -> T {
        self.object
    }
}

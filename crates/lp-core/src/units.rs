//! SI-based scalar quantities.
//!
//! Every quantity is an `f64` newtype in base SI units (m, m/s, m/s², s).
//! Only the cross-unit products the kinematics actually needs are provided:
//!
//! ```text
//! Speed × Duration        = Length
//! Acceleration × Duration = Speed
//! Length / Duration       = Speed
//! Speed / Duration        = Acceleration
//! ```
//!
//! Values are `PartialOrd` only; use [`total_cmp`](Length::total_cmp) where a
//! total order is required (sorted neighbor sets).

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Generate an SI scalar newtype with same-unit arithmetic.
macro_rules! si_scalar {
    ($(#[$attr:meta])* $name:ident, $unit:literal) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub f64);

        impl $name {
            pub const ZERO: $name = $name(0.0);

            #[inline]
            pub const fn new(si: f64) -> Self {
                $name(si)
            }

            /// Value in SI base units.
            #[inline]
            pub const fn si(self) -> f64 {
                self.0
            }

            #[inline]
            pub fn abs(self) -> Self {
                $name(self.0.abs())
            }

            #[inline]
            pub fn min(self, other: Self) -> Self {
                $name(self.0.min(other.0))
            }

            #[inline]
            pub fn max(self, other: Self) -> Self {
                $name(self.0.max(other.0))
            }

            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            /// `self < 0`.
            #[inline]
            pub fn lt0(self) -> bool {
                self.0 < 0.0
            }

            /// `self <= 0`.
            #[inline]
            pub fn le0(self) -> bool {
                self.0 <= 0.0
            }

            /// IEEE 754 total order (`NaN` sorts last).
            #[inline]
            pub fn total_cmp(&self, other: &Self) -> Ordering {
                self.0.total_cmp(&other.0)
            }
        }

        impl Add for $name {
            type Output = $name;
            #[inline]
            fn add(self, rhs: $name) -> $name {
                $name(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = $name;
            #[inline]
            fn sub(self, rhs: $name) -> $name {
                $name(self.0 - rhs.0)
            }
        }

        impl AddAssign for $name {
            #[inline]
            fn add_assign(&mut self, rhs: $name) {
                self.0 += rhs.0;
            }
        }

        impl SubAssign for $name {
            #[inline]
            fn sub_assign(&mut self, rhs: $name) {
                self.0 -= rhs.0;
            }
        }

        impl Neg for $name {
            type Output = $name;
            #[inline]
            fn neg(self) -> $name {
                $name(-self.0)
            }
        }

        impl Mul<f64> for $name {
            type Output = $name;
            #[inline]
            fn mul(self, rhs: f64) -> $name {
                $name(self.0 * rhs)
            }
        }

        impl Div<f64> for $name {
            type Output = $name;
            #[inline]
            fn div(self, rhs: f64) -> $name {
                $name(self.0 / rhs)
            }
        }

        /// Ratio of two quantities of the same unit.
        impl Div for $name {
            type Output = f64;
            #[inline]
            fn div(self, rhs: $name) -> f64 {
                self.0 / rhs.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:.3} {}", self.0, $unit)
            }
        }
    };
}

si_scalar! {
    /// A longitudinal distance in metres.  Headways are signed.
    Length, "m"
}

si_scalar! {
    /// A speed in metres per second.
    Speed, "m/s"
}

si_scalar! {
    /// An acceleration in metres per second squared.
    Acceleration, "m/s2"
}

si_scalar! {
    /// A time span in seconds.
    Duration, "s"
}

// ── Cross-unit products ───────────────────────────────────────────────────────

impl Mul<Duration> for Speed {
    type Output = Length;
    #[inline]
    fn mul(self, rhs: Duration) -> Length {
        Length(self.0 * rhs.0)
    }
}

impl Mul<Speed> for Duration {
    type Output = Length;
    #[inline]
    fn mul(self, rhs: Speed) -> Length {
        Length(self.0 * rhs.0)
    }
}

impl Mul<Duration> for Acceleration {
    type Output = Speed;
    #[inline]
    fn mul(self, rhs: Duration) -> Speed {
        Speed(self.0 * rhs.0)
    }
}

impl Div<Duration> for Length {
    type Output = Speed;
    #[inline]
    fn div(self, rhs: Duration) -> Speed {
        Speed(self.0 / rhs.0)
    }
}

impl Div<Duration> for Speed {
    type Output = Acceleration;
    #[inline]
    fn div(self, rhs: Duration) -> Acceleration {
        Acceleration(self.0 / rhs.0)
    }
}

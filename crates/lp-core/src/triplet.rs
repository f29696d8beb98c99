//! Headway, speed and acceleration of one perceived neighbor.

use crate::{Acceleration, Length, Speed};

/// Immutable `(headway, speed, acceleration)` bundle produced by estimation
/// and anticipation.  A fresh value is returned by every transformation.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NeighborTriplet {
    pub headway:      Length,
    pub speed:        Speed,
    pub acceleration: Acceleration,
}

impl NeighborTriplet {
    #[inline]
    pub fn new(headway: Length, speed: Speed, acceleration: Acceleration) -> Self {
        Self { headway, speed, acceleration }
    }

    /// Copy with a different headway.
    #[inline]
    pub fn with_headway(self, headway: Length) -> Self {
        Self { headway, ..self }
    }
}

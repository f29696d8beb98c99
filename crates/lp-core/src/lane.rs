//! Lane-relative addressing.
//!
//! A [`RelativeLane`] names a lane only by its lateral offset from the ego
//! GTU's current lane.  The signed *rank* is the canonical form:
//!
//! ```text
//!   rank:   -2      -1      0       1       2
//!         LEFT[2]  LEFT  CURRENT  RIGHT  RIGHT[2]
//! ```
//!
//! Equality, hashing and ordering all go through the rank, so iterating a
//! sorted cross-section runs from the far left to the far right.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::{PerceptionError, PerceptionResult};

// ── LateralDirection ──────────────────────────────────────────────────────────

/// Lateral side relative to the driving direction.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LateralDirection {
    Left,
    None,
    Right,
}

impl LateralDirection {
    #[inline]
    pub fn is_left(self) -> bool {
        matches!(self, LateralDirection::Left)
    }

    #[inline]
    pub fn is_right(self) -> bool {
        matches!(self, LateralDirection::Right)
    }

    #[inline]
    pub fn is_none(self) -> bool {
        matches!(self, LateralDirection::None)
    }

    /// The opposite side; `None` stays `None`.
    pub fn flip(self) -> Self {
        match self {
            LateralDirection::Left  => LateralDirection::Right,
            LateralDirection::None  => LateralDirection::None,
            LateralDirection::Right => LateralDirection::Left,
        }
    }

    /// `-1` for left, `0` for none, `1` for right.
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            LateralDirection::Left  => -1,
            LateralDirection::None  => 0,
            LateralDirection::Right => 1,
        }
    }
}

impl fmt::Display for LateralDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LateralDirection::Left  => "LEFT",
            LateralDirection::None  => "NONE",
            LateralDirection::Right => "RIGHT",
        })
    }
}

// ── RelativeLane ──────────────────────────────────────────────────────────────

/// A lane identified by lateral direction and number of lanes from the ego
/// lane.
///
/// Invariant: `num_lanes == 0 ⇔ lat == LateralDirection::None`.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelativeLane {
    lat:       LateralDirection,
    num_lanes: u32,
}

impl RelativeLane {
    pub const CURRENT: RelativeLane = RelativeLane { lat: LateralDirection::None, num_lanes: 0 };
    pub const LEFT: RelativeLane = RelativeLane { lat: LateralDirection::Left, num_lanes: 1 };
    pub const RIGHT: RelativeLane = RelativeLane { lat: LateralDirection::Right, num_lanes: 1 };
    pub const SECOND_LEFT: RelativeLane = RelativeLane { lat: LateralDirection::Left, num_lanes: 2 };
    pub const SECOND_RIGHT: RelativeLane = RelativeLane { lat: LateralDirection::Right, num_lanes: 2 };

    /// Create a relative lane `num_lanes` lanes towards `lat`.
    ///
    /// Fails with [`PerceptionError::InvalidArgument`] when the count is
    /// negative or inconsistent with the direction.
    pub fn new(lat: LateralDirection, num_lanes: i32) -> PerceptionResult<Self> {
        if num_lanes < 0 {
            return Err(PerceptionError::InvalidArgument(format!(
                "number of lanes may not be negative, got {num_lanes}"
            )));
        }
        if lat.is_none() && num_lanes != 0 {
            return Err(PerceptionError::InvalidArgument(format!(
                "lateral direction NONE requires 0 lanes, got {num_lanes}"
            )));
        }
        if !lat.is_none() && num_lanes == 0 {
            return Err(PerceptionError::InvalidArgument(format!(
                "lateral direction {lat} requires at least 1 lane"
            )));
        }
        Ok(Self { lat, num_lanes: num_lanes as u32 })
    }

    /// Inverse of [`rank`](Self::rank).
    pub fn from_rank(rank: i32) -> Self {
        match rank.cmp(&0) {
            Ordering::Less    => Self { lat: LateralDirection::Left, num_lanes: rank.unsigned_abs() },
            Ordering::Equal   => Self::CURRENT,
            Ordering::Greater => Self { lat: LateralDirection::Right, num_lanes: rank as u32 },
        }
    }

    /// Signed lane offset: negative to the left, positive to the right.
    #[inline]
    pub fn rank(self) -> i32 {
        self.lat.sign() * self.num_lanes as i32
    }

    #[inline]
    pub fn lateral_direction(self) -> LateralDirection {
        self.lat
    }

    #[inline]
    pub fn num_lanes(self) -> u32 {
        self.num_lanes
    }

    #[inline]
    pub fn is_current(self) -> bool {
        self.lat.is_none()
    }

    #[inline]
    pub fn is_left(self) -> bool {
        self.lat.is_left()
    }

    #[inline]
    pub fn is_right(self) -> bool {
        self.lat.is_right()
    }

    /// The lane directly left of this one.
    #[inline]
    pub fn left(self) -> Self {
        self.add(Self::LEFT)
    }

    /// The lane directly right of this one.
    #[inline]
    pub fn right(self) -> Self {
        self.add(Self::RIGHT)
    }

    /// Algebraic composition: the `other` lane as seen from `self`.
    ///
    /// `RelativeLane::LEFT.add(RelativeLane::SECOND_RIGHT) == RelativeLane::RIGHT`.
    #[inline]
    pub fn add(self, other: RelativeLane) -> Self {
        Self::from_rank(self.rank() + other.rank())
    }
}

impl std::ops::Add for RelativeLane {
    type Output = RelativeLane;
    #[inline]
    fn add(self, rhs: RelativeLane) -> RelativeLane {
        RelativeLane::add(self, rhs)
    }
}

impl PartialEq for RelativeLane {
    fn eq(&self, other: &Self) -> bool {
        self.rank() == other.rank()
    }
}

impl Eq for RelativeLane {}

impl Hash for RelativeLane {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
    }
}

impl PartialOrd for RelativeLane {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RelativeLane {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl Default for RelativeLane {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Display for RelativeLane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.num_lanes {
            0 => f.write_str("CURRENT"),
            1 => write!(f, "{}", self.lat),
            n => write!(f, "{}[{}]", self.lat, n),
        }
    }
}

// ── Direction ─────────────────────────────────────────────────────────────────

/// Direction of travel along a lane's design line.
///
/// Positions on a lane are always measured from the lane's start along its
/// design line; a `Minus` record is driven from the lane's end to its start.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    #[default]
    Plus,
    Minus,
}

impl Direction {
    #[inline]
    pub fn is_plus(self) -> bool {
        matches!(self, Direction::Plus)
    }
}

//! Caller-facing representation of one perceived neighbor.

use std::cmp::Ordering;

use lp_core::{Acceleration, GtuId, Length, Speed};
use lp_network::GtuState;

/// Where the neighbor is relative to the ego.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeadwayKind {
    /// Downstream, with the gap between ego front and neighbor rear.
    Ahead(Length),
    /// Upstream, with the gap between neighbor front and ego rear.
    Behind(Length),
    /// Longitudinally overlapping the ego.
    ///
    /// `overlap_front` is the neighbor front minus the ego front,
    /// `overlap_rear` the neighbor rear minus the ego rear, and `overlap` the
    /// length both GTUs share.
    Parallel {
        overlap_front: Length,
        overlap:       Length,
        overlap_rear:  Length,
    },
}

/// Source of a headway's speed and acceleration.
#[derive(Copy, Clone, Debug)]
pub enum Kinematics<'w> {
    /// Read through to the neighbor's live state.
    Live(&'w GtuState),
    /// Values fixed when the headway was created.
    Fixed { speed: Speed, acceleration: Acceleration },
}

#[derive(Copy, Clone, Debug)]
pub struct HeadwayGtu<'w> {
    id:         GtuId,
    length:     Length,
    /// Signed distance the headway was created from; negative for parallel
    /// neighbors.  Used for ordering.
    distance:   Length,
    kind:       HeadwayKind,
    kinematics: Kinematics<'w>,
}

impl<'w> HeadwayGtu<'w> {
    pub fn new(
        id: GtuId,
        length: Length,
        distance: Length,
        kind: HeadwayKind,
        kinematics: Kinematics<'w>,
    ) -> Self {
        Self { id, length, distance, kind, kinematics }
    }

    #[inline]
    pub fn id(&self) -> GtuId {
        self.id
    }

    #[inline]
    pub fn length(&self) -> Length {
        self.length
    }

    #[inline]
    pub fn kind(&self) -> HeadwayKind {
        self.kind
    }

    pub fn speed(&self) -> Speed {
        match self.kinematics {
            Kinematics::Live(gtu) => gtu.speed,
            Kinematics::Fixed { speed, .. } => speed,
        }
    }

    pub fn acceleration(&self) -> Acceleration {
        match self.kinematics {
            Kinematics::Live(gtu) => gtu.acceleration,
            Kinematics::Fixed { acceleration, .. } => acceleration,
        }
    }

    /// Whether speed and acceleration are read from the live neighbor.
    pub fn is_live(&self) -> bool {
        matches!(self.kinematics, Kinematics::Live(_))
    }

    /// Gap to the neighbor; `None` when it overlaps the ego.
    pub fn distance(&self) -> Option<Length> {
        match self.kind {
            HeadwayKind::Ahead(d) | HeadwayKind::Behind(d) => Some(d),
            HeadwayKind::Parallel { .. } => None,
        }
    }

    /// Signed distance, negative for overlapping neighbors.
    #[inline]
    pub fn signed_distance(&self) -> Length {
        self.distance
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self.kind, HeadwayKind::Parallel { .. })
    }

    /// Order by signed distance, then id, for sorted neighbor sets.
    pub fn cmp_distance(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.id.cmp(&other.id))
    }
}

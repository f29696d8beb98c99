//! Headway construction strategies.
//!
//! Every variant dispatches on the sign of the distance the topology walk
//! produced:
//!
//! ```text
//! d >= 0            create_downstream / create_upstream
//! d <  0            create_parallel with (overlap_front, overlap, overlap_rear)
//! |d| > Le + Lo     InconsistentGeometry
//! ```
//!
//! Only [`HeadwayGtuType::Perceived`] holds state; it belongs to one
//! perceiving GTU and must not be shared between GTUs.

use std::cell::Cell;

use tracing::trace;

use lp_core::{Duration, Length, NeighborTriplet, PerceptionError, PerceptionResult, Time};
use lp_network::GtuState;

use crate::{Anticipation, Estimation, HeadwayGtu, HeadwayKind, Kinematics};

// ── Overlap geometry ──────────────────────────────────────────────────────────

/// `(overlap_front, overlap, overlap_rear)` of a neighbor found downstream at
/// `d = neighbor rear - ego front`.
fn overlap_downstream(d: Length, ego: Length, other: Length) -> (Length, Length, Length) {
    let overlap = (d + other).min(Length::ZERO) - d.max(-ego);
    (d + other, overlap, d + ego)
}

/// `(overlap_front, overlap, overlap_rear)` of a neighbor found upstream at
/// `d = ego rear - neighbor front`.
fn overlap_upstream(d: Length, ego: Length, other: Length) -> (Length, Length, Length) {
    let overlap = ego.min(-d) - (-d - other).max(Length::ZERO);
    (-d - ego, overlap, -d - other)
}

fn check_overlap(d: Length, ego: Length, other: Length) -> PerceptionResult<()> {
    if -d > ego + other {
        return Err(PerceptionError::InconsistentGeometry {
            distance:     d,
            ego_length:   ego,
            other_length: other,
        });
    }
    Ok(())
}

// ── HeadwayGtuType ────────────────────────────────────────────────────────────

/// How a perceived neighbor is represented.
pub enum HeadwayGtuType {
    /// Read speed and acceleration through to the live neighbor.
    Wrap,
    /// Snapshot the neighbor's current speed and acceleration.
    Copy,
    /// Estimate the state at `now - reaction_time`, then anticipate it to now.
    Perceived(PerceivedHeadwayGtuType),
}

impl HeadwayGtuType {
    pub fn perceived(estimation: impl Estimation + Send + 'static, anticipation: Anticipation) -> Self {
        HeadwayGtuType::Perceived(PerceivedHeadwayGtuType::new(estimation, anticipation))
    }

    /// Fail with the first parameter `perceiving` lacks for this type.
    pub fn check_parameters(&self, perceiving: &GtuState) -> PerceptionResult<()> {
        if let HeadwayGtuType::Perceived(_) = self {
            perceiving.parameters.reaction_time()?;
        }
        Ok(())
    }

    /// Headway of `perceived` at signed `distance`, found downstream of
    /// `perceiving` when `downstream`, upstream otherwise.
    pub fn create_headway<'w>(
        &self,
        perceiving: &GtuState,
        perceived: &'w GtuState,
        distance: Length,
        downstream: bool,
        now: Time,
    ) -> PerceptionResult<HeadwayGtu<'w>> {
        if distance.0 >= 0.0 {
            return if downstream {
                self.create_downstream(perceiving, perceived, distance, now)
            } else {
                self.create_upstream(perceiving, perceived, distance, now)
            };
        }
        let (ego, other) = (perceiving.length(), perceived.length());
        check_overlap(distance, ego, other)?;
        let (front, overlap, rear) = if downstream {
            overlap_downstream(distance, ego, other)
        } else {
            overlap_upstream(distance, ego, other)
        };
        self.create_parallel(perceiving, perceived, distance, front, overlap, rear, downstream, now)
    }

    pub fn create_downstream<'w>(
        &self,
        perceiving: &GtuState,
        perceived: &'w GtuState,
        distance: Length,
        now: Time,
    ) -> PerceptionResult<HeadwayGtu<'w>> {
        match self {
            HeadwayGtuType::Perceived(p) => p.create_gap(perceiving, perceived, distance, true, now),
            _ => Ok(self.simple(perceived, distance, HeadwayKind::Ahead(distance))),
        }
    }

    pub fn create_upstream<'w>(
        &self,
        perceiving: &GtuState,
        perceived: &'w GtuState,
        distance: Length,
        now: Time,
    ) -> PerceptionResult<HeadwayGtu<'w>> {
        match self {
            HeadwayGtuType::Perceived(p) => p.create_gap(perceiving, perceived, distance, false, now),
            _ => Ok(self.simple(perceived, distance, HeadwayKind::Behind(distance))),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_parallel<'w>(
        &self,
        perceiving: &GtuState,
        perceived: &'w GtuState,
        distance: Length,
        overlap_front: Length,
        overlap: Length,
        overlap_rear: Length,
        downstream: bool,
        now: Time,
    ) -> PerceptionResult<HeadwayGtu<'w>> {
        let kind = HeadwayKind::Parallel { overlap_front, overlap, overlap_rear };
        match self {
            HeadwayGtuType::Perceived(p) => {
                // The gap is reported as is; only speed and acceleration are
                // estimated.
                let t = p.perceive(perceiving, perceived, distance, downstream, now)?;
                Ok(HeadwayGtu::new(
                    perceived.id,
                    perceived.length(),
                    distance,
                    kind,
                    Kinematics::Fixed { speed: t.speed, acceleration: t.acceleration },
                ))
            }
            _ => Ok(self.simple(perceived, distance, kind)),
        }
    }

    /// Wrap and Copy headways.
    fn simple<'w>(&self, perceived: &'w GtuState, distance: Length, kind: HeadwayKind) -> HeadwayGtu<'w> {
        let kinematics = match self {
            HeadwayGtuType::Wrap => Kinematics::Live(perceived),
            _ => Kinematics::Fixed { speed: perceived.speed, acceleration: perceived.acceleration },
        };
        HeadwayGtu::new(perceived.id, perceived.length(), distance, kind, kinematics)
    }
}

// ── PerceivedHeadwayGtuType ───────────────────────────────────────────────────

/// Anticipation bookkeeping shared by every neighbor perceived at one time.
#[derive(Copy, Clone, PartialEq, Debug)]
struct AnticipationCache {
    last_update_time: Time,
    reaction_time:    Duration,
    origin:           Time,
    traveled:         Length,
}

/// State of the [`HeadwayGtuType::Perceived`] variant.
pub struct PerceivedHeadwayGtuType {
    estimation:   Box<dyn Estimation + Send>,
    anticipation: Anticipation,
    cache:        Cell<Option<AnticipationCache>>,
}

impl PerceivedHeadwayGtuType {
    pub fn new(estimation: impl Estimation + Send + 'static, anticipation: Anticipation) -> Self {
        Self {
            estimation: Box::new(estimation),
            anticipation,
            cache: Cell::new(None),
        }
    }

    pub fn anticipation(&self) -> Anticipation {
        self.anticipation
    }

    /// Origin of the latest anticipation, if any headway was created yet.
    pub fn anticipation_origin(&self) -> Option<Time> {
        self.cache.get().map(|c| c.origin)
    }

    /// Ego distance traveled between the latest origin and its update time.
    pub fn traveled_distance(&self) -> Option<Length> {
        self.cache.get().map(|c| c.traveled)
    }

    /// `(origin, traveled)` for `now`, recomputed at most once per distinct
    /// time and reaction time.  The origin never moves backwards.
    fn update(&self, perceiving: &GtuState, now: Time) -> PerceptionResult<(Time, Length)> {
        let reaction_time = perceiving.parameters.reaction_time()?;
        let previous = self.cache.get();
        if let Some(c) = previous {
            if c.last_update_time == now && c.reaction_time == reaction_time {
                return Ok((c.origin, c.traveled));
            }
        }
        let candidate = now - reaction_time;
        let origin = previous.map_or(candidate, |c| c.origin.max(candidate));
        let traveled = perceiving.odometer - perceiving.odometer_at(origin);
        trace!(ego = %perceiving.id, %now, %origin, %traveled, "anticipation origin updated");
        self.cache.set(Some(AnticipationCache {
            last_update_time: now,
            reaction_time,
            origin,
            traveled,
        }));
        Ok((origin, traveled))
    }

    /// Estimated and anticipated triplet of `perceived`.
    fn perceive(
        &self,
        perceiving: &GtuState,
        perceived: &GtuState,
        distance: Length,
        downstream: bool,
        now: Time,
    ) -> PerceptionResult<NeighborTriplet> {
        let (origin, traveled) = self.update(perceiving, now)?;
        let estimated = self
            .estimation
            .estimate(perceiving, perceived, distance, downstream, now, origin)?;
        Ok(self.anticipation.anticipate(estimated, now - origin, traveled, downstream))
    }

    fn create_gap<'w>(
        &self,
        perceiving: &GtuState,
        perceived: &'w GtuState,
        distance: Length,
        downstream: bool,
        now: Time,
    ) -> PerceptionResult<HeadwayGtu<'w>> {
        let t = self.perceive(perceiving, perceived, distance, downstream, now)?;
        let kinematics = Kinematics::Fixed { speed: t.speed, acceleration: t.acceleration };
        let (ego, other) = (perceiving.length(), perceived.length());

        if t.headway.0 >= 0.0 {
            let kind = if downstream { HeadwayKind::Ahead(t.headway) } else { HeadwayKind::Behind(t.headway) };
            return Ok(HeadwayGtu::new(perceived.id, other, t.headway, kind, kinematics));
        }

        // Anticipated into the ego; beyond both lengths it has passed
        // through and keeps zero overlap.
        let d = t.headway.max(-(ego + other));
        let (overlap_front, overlap, overlap_rear) = if downstream {
            overlap_downstream(d, ego, other)
        } else {
            overlap_upstream(d, ego, other)
        };
        let kind = HeadwayKind::Parallel { overlap_front, overlap, overlap_rear };
        Ok(HeadwayGtu::new(perceived.id, other, d, kind, kinematics))
    }
}

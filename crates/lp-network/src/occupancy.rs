//! Per-lane GTU occupancy for one tick.
//!
//! Built once per tick from the network and the GTU store.  Each lane's GTUs
//! are kept in driving order (ascending distance of the reference point from
//! the lane entry) in CSR layout, with the driving positions stored alongside
//! so walks never recompute them:
//!
//! ```text
//! gtus[ lane_start[l] .. lane_start[l+1] ]       GtuIds on lane l
//! positions[ lane_start[l] .. lane_start[l+1] ]  their driving positions
//! ```
//!
//! A GTU is registered on the lane holding its reference point only.

use std::ops::Range;

use lp_core::{GtuId, LaneId, Length};

use crate::{GtuStore, LaneNetwork, NetworkError, NetworkResult};

#[derive(Clone, Debug)]
pub struct LaneOccupancy {
    lane_start: Vec<u32>,
    gtus:       Vec<GtuId>,
    positions:  Vec<Length>,
}

impl LaneOccupancy {
    /// Index every GTU in `store` onto its lane.
    ///
    /// Fails when a GTU references an unknown lane or lies outside its lane.
    pub fn build(network: &LaneNetwork, store: &GtuStore) -> NetworkResult<Self> {
        let lane_count = network.lane_count();

        let mut entries: Vec<(LaneId, Length, GtuId)> = Vec::with_capacity(store.len());
        for gtu in store.iter() {
            let length = network.length(gtu.lane)?;
            if !(gtu.position.0 >= 0.0 && gtu.position <= length) {
                return Err(NetworkError::PositionOutOfRange {
                    gtu: gtu.id,
                    lane: gtu.lane,
                    position: gtu.position,
                    length,
                });
            }
            entries.push((gtu.lane, network.driving_position(gtu.lane, gtu.position), gtu.id));
        }
        entries.sort_unstable_by(|a, b| {
            a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)).then(a.2.cmp(&b.2))
        });

        let mut lane_start = vec![0u32; lane_count + 1];
        for &(lane, _, _) in &entries {
            lane_start[lane.index() + 1] += 1;
        }
        for i in 1..=lane_count {
            lane_start[i] += lane_start[i - 1];
        }

        Ok(Self {
            lane_start,
            gtus: entries.iter().map(|e| e.2).collect(),
            positions: entries.iter().map(|e| e.1).collect(),
        })
    }

    /// Index range of `lane` within [`ids`](Self::ids).
    #[inline]
    pub fn span(&self, lane: LaneId) -> Range<usize> {
        self.lane_start[lane.index()] as usize..self.lane_start[lane.index() + 1] as usize
    }

    /// Every indexed GTU, lane by lane.
    #[inline]
    pub fn ids(&self) -> &[GtuId] {
        &self.gtus
    }

    /// GTUs on `lane` in driving order.
    #[inline]
    pub fn gtus(&self, lane: LaneId) -> &[GtuId] {
        &self.gtus[self.span(lane)]
    }

    /// Driving positions matching [`gtus`](Self::gtus).
    #[inline]
    pub fn positions(&self, lane: LaneId) -> &[Length] {
        &self.positions[self.span(lane)]
    }

    pub fn count(&self, lane: LaneId) -> usize {
        self.span(lane).len()
    }
}

//! Read-only world snapshot handed to perception for one tick.

use lp_core::{GtuId, LaneId, Length, Time};

use crate::{GtuState, GtuStore, LaneNetwork, LaneOccupancy, LaneStructure, NetworkResult};

/// A read-only snapshot of the simulation state for one tick.
///
/// Built once per tick by the simulation loop and shared immutably by every
/// perceiving GTU.  The occupancy index is rebuilt here and every id in it is
/// resolved against the store up front, so walks over a lane never look a
/// GTU up again.
///
/// # Lifetimes
///
/// The network and store borrows live for the whole tick; the simulation
/// may not mutate either while a `PerceptionWorld` is alive.
pub struct PerceptionWorld<'w> {
    time:      Time,
    network:   &'w LaneNetwork,
    gtus:      &'w GtuStore,
    occupancy: LaneOccupancy,
    /// `occupancy.ids()` resolved against `gtus`, same layout.
    resolved:  Vec<&'w GtuState>,
    max_front: Length,
}

impl<'w> PerceptionWorld<'w> {
    pub fn new(time: Time, network: &'w LaneNetwork, gtus: &'w GtuStore) -> NetworkResult<Self> {
        let occupancy = LaneOccupancy::build(network, gtus)?;
        let resolved = occupancy
            .ids()
            .iter()
            .map(|&id| gtus.get(id))
            .collect::<NetworkResult<Vec<_>>>()?;
        let max_front = gtus.iter().map(|g| g.front).fold(Length::ZERO, Length::max);
        Ok(Self { time, network, gtus, occupancy, resolved, max_front })
    }

    /// Current simulation time.
    #[inline]
    pub fn time(&self) -> Time {
        self.time
    }

    #[inline]
    pub fn network(&self) -> &'w LaneNetwork {
        self.network
    }

    #[inline]
    pub fn gtus(&self) -> &'w GtuStore {
        self.gtus
    }

    #[inline]
    pub fn occupancy(&self) -> &LaneOccupancy {
        &self.occupancy
    }

    #[inline]
    pub fn gtu(&self, id: GtuId) -> NetworkResult<&'w GtuState> {
        self.gtus.get(id)
    }

    /// GTUs on `lane` in driving order, with their driving positions.
    #[inline]
    pub fn lane_gtus(&self, lane: LaneId) -> (&[&'w GtuState], &[Length]) {
        let span = self.occupancy.span(lane);
        (&self.resolved[span], self.occupancy.positions(lane))
    }

    /// Largest front offset of any GTU this tick.  A GTU registered on a
    /// lane ending at `x` reaches no further than `x + max_front`.
    #[inline]
    pub fn max_front(&self) -> Length {
        self.max_front
    }

    /// Lane structure around `ego`.
    pub fn lane_structure(
        &self,
        ego: GtuId,
        look_ahead: Length,
        look_back: Length,
    ) -> NetworkResult<LaneStructure> {
        LaneStructure::build(self.network, self.gtu(ego)?, look_ahead, look_back)
    }
}

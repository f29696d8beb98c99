//! Per-GTU neighbor perception with time-stamped caches.
//!
//! A [`DirectNeighborsPerception`] is built once per tick for one ego GTU.
//! Each `update_*` call recomputes one category and stamps it with the
//! world time; the accessors return whatever the last successful update
//! produced.  A failed update leaves no entry behind for its key.
//!
//! ```text
//! update_all
//!   ├─ for LEFT, RIGHT if the lane exists:
//!   │     update_first_leaders, update_first_followers, update_gtu_alongside
//!   └─ for every lane in the cross-section:
//!         update_leaders, update_followers
//! ```

use tracing::{debug, trace, warn};

use lp_core::{
    CacheMap, GtuId, LateralDirection, PerceptionError, PerceptionResult, RelativeLane, TimeStamped,
};
use lp_headway::{HeadwayGtu, HeadwayGtuType};
use lp_network::{GtuState, LaneStructure, PerceptionWorld, RelativePosition};

use crate::neighbors::{self, Search};
use crate::Neighbors;

pub struct DirectNeighborsPerception<'a> {
    world:           &'a PerceptionWorld<'a>,
    ego:             &'a GtuState,
    headway_type:    &'a HeadwayGtuType,
    structure:       LaneStructure,
    leaders:         CacheMap<RelativeLane, TimeStamped<Neighbors<'a>>>,
    followers:       CacheMap<RelativeLane, TimeStamped<Neighbors<'a>>>,
    first_leaders:   CacheMap<LateralDirection, TimeStamped<Vec<HeadwayGtu<'a>>>>,
    first_followers: CacheMap<LateralDirection, TimeStamped<Vec<HeadwayGtu<'a>>>>,
    alongside:       CacheMap<LateralDirection, TimeStamped<bool>>,
}

impl<'a> DirectNeighborsPerception<'a> {
    /// Perception of `ego` in `world`.
    ///
    /// Builds the ego's lane structure from its look-ahead and look-back
    /// parameters; fails when either is missing.
    pub fn new(
        world: &'a PerceptionWorld<'a>,
        ego: GtuId,
        headway_type: &'a HeadwayGtuType,
    ) -> PerceptionResult<Self> {
        let ego = world.gtu(ego)?;
        let look_ahead = ego.parameters.look_ahead()?;
        let look_back = ego.parameters.look_back()?;
        let structure = LaneStructure::build(world.network(), ego, look_ahead, look_back)?;
        Ok(Self {
            world,
            ego,
            headway_type,
            structure,
            leaders: CacheMap::default(),
            followers: CacheMap::default(),
            first_leaders: CacheMap::default(),
            first_followers: CacheMap::default(),
            alongside: CacheMap::default(),
        })
    }

    pub fn ego(&self) -> &'a GtuState {
        self.ego
    }

    pub fn lane_structure(&self) -> &LaneStructure {
        &self.structure
    }

    // ── Updates ───────────────────────────────────────────────────────────────

    /// Refresh every category for every lane the ego can see.
    ///
    /// Every cache is emptied first; on failure only the categories updated
    /// before the failing one hold entries.
    pub fn update_all(&mut self) -> PerceptionResult<()> {
        debug!(
            ego = %self.ego.id,
            time = %self.world.time(),
            lanes = self.structure.cross_section().count(),
            "updating perception"
        );
        self.leaders.clear();
        self.followers.clear();
        self.first_leaders.clear();
        self.first_followers.clear();
        self.alongside.clear();
        for lat in [LateralDirection::Left, LateralDirection::Right] {
            if self.structure.contains(lane_of(lat)) {
                self.update_first_leaders(lat)?;
                self.update_first_followers(lat)?;
                self.update_gtu_alongside(lat)?;
            }
        }
        let lanes: Vec<RelativeLane> = self.structure.cross_section().collect();
        for lane in lanes {
            self.update_leaders(lane)?;
            self.update_followers(lane)?;
        }
        Ok(())
    }

    pub fn update_leaders(&mut self, lane: RelativeLane) -> PerceptionResult<()> {
        self.leaders.remove(&lane);
        let result = self.neighbors(lane, true);
        let set = self.logged("leaders", result)?;
        trace!(ego = %self.ego.id, %lane, records = set.record_count(), "leaders updated");
        self.leaders.insert(lane, TimeStamped::new(set, self.world.time()));
        Ok(())
    }

    pub fn update_followers(&mut self, lane: RelativeLane) -> PerceptionResult<()> {
        self.followers.remove(&lane);
        let result = self.neighbors(lane, false);
        let set = self.logged("followers", result)?;
        trace!(ego = %self.ego.id, %lane, records = set.record_count(), "followers updated");
        self.followers.insert(lane, TimeStamped::new(set, self.world.time()));
        Ok(())
    }

    /// First GTU fully ahead of the ego front on each downstream branch of
    /// the adjacent lane.
    pub fn update_first_leaders(&mut self, lat: LateralDirection) -> PerceptionResult<()> {
        self.first_leaders.remove(&lat);
        let result = self.first_neighbors(lat, true);
        let found = self.logged("first leaders", result)?;
        trace!(ego = %self.ego.id, ?lat, count = found.len(), "first leaders updated");
        self.first_leaders.insert(lat, TimeStamped::new(found, self.world.time()));
        Ok(())
    }

    /// First GTU fully behind the ego rear on each upstream branch of the
    /// adjacent lane.
    pub fn update_first_followers(&mut self, lat: LateralDirection) -> PerceptionResult<()> {
        self.first_followers.remove(&lat);
        let result = self.first_neighbors(lat, false);
        let found = self.logged("first followers", result)?;
        trace!(ego = %self.ego.id, ?lat, count = found.len(), "first followers updated");
        self.first_followers.insert(lat, TimeStamped::new(found, self.world.time()));
        Ok(())
    }

    /// Whether any GTU on the adjacent lane overlaps the ego longitudinally.
    pub fn update_gtu_alongside(&mut self, lat: LateralDirection) -> PerceptionResult<()> {
        self.alongside.remove(&lat);
        let result = self.find_alongside(lat);
        let found = self.logged("alongside", result)?;
        trace!(ego = %self.ego.id, ?lat, alongside = found, "alongside updated");
        self.alongside.insert(lat, TimeStamped::new(found, self.world.time()));
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn leaders(&self, lane: RelativeLane) -> Option<&Neighbors<'a>> {
        self.leaders.get(&lane).map(TimeStamped::object)
    }

    pub fn followers(&self, lane: RelativeLane) -> Option<&Neighbors<'a>> {
        self.followers.get(&lane).map(TimeStamped::object)
    }

    pub fn first_leaders(&self, lat: LateralDirection) -> Option<&[HeadwayGtu<'a>]> {
        self.first_leaders.get(&lat).map(|t| t.object().as_slice())
    }

    pub fn first_followers(&self, lat: LateralDirection) -> Option<&[HeadwayGtu<'a>]> {
        self.first_followers.get(&lat).map(|t| t.object().as_slice())
    }

    pub fn is_gtu_alongside(&self, lat: LateralDirection) -> Option<bool> {
        self.alongside.get(&lat).map(|t| *t.object())
    }

    pub fn timestamped_leaders(&self, lane: RelativeLane) -> Option<&TimeStamped<Neighbors<'a>>> {
        self.leaders.get(&lane)
    }

    pub fn timestamped_followers(&self, lane: RelativeLane) -> Option<&TimeStamped<Neighbors<'a>>> {
        self.followers.get(&lane)
    }

    pub fn timestamped_first_leaders(
        &self,
        lat: LateralDirection,
    ) -> Option<&TimeStamped<Vec<HeadwayGtu<'a>>>> {
        self.first_leaders.get(&lat)
    }

    pub fn timestamped_first_followers(
        &self,
        lat: LateralDirection,
    ) -> Option<&TimeStamped<Vec<HeadwayGtu<'a>>>> {
        self.first_followers.get(&lat)
    }

    pub fn timestamped_gtu_alongside(&self, lat: LateralDirection) -> Option<&TimeStamped<bool>> {
        self.alongside.get(&lat)
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    /// Fails unless `lat` names a side with an adjacent lane.
    fn check_lateral_direction(&self, lat: LateralDirection) -> PerceptionResult<()> {
        if lat.is_none() {
            return Err(PerceptionError::InvalidArgument(
                "lateral direction must be left or right".into(),
            ));
        }
        if !self.structure.contains(lane_of(lat)) {
            return Err(PerceptionError::InvalidArgument(format!(
                "no adjacent lane on the {lat:?} of {}",
                self.ego.id,
            )));
        }
        Ok(())
    }

    fn neighbors(&self, lane: RelativeLane, downstream: bool) -> PerceptionResult<Neighbors<'a>> {
        let range = if downstream {
            self.ego.parameters.look_ahead()?
        } else {
            self.ego.parameters.look_back()?
        };
        self.headway_type.check_parameters(self.ego)?;
        Neighbors::new(
            self.world,
            &self.structure,
            self.ego,
            self.headway_type,
            lane,
            downstream,
            range,
        )
    }

    fn first_neighbors(
        &self,
        lat: LateralDirection,
        downstream: bool,
    ) -> PerceptionResult<Vec<HeadwayGtu<'a>>> {
        self.check_lateral_direction(lat)?;
        self.headway_type.check_parameters(self.ego)?;
        let root = self.structure.first_record(lane_of(lat))?;
        let search = self.search();
        let found = if downstream {
            let range = self.ego.parameters.look_ahead()?;
            neighbors::first_downstream(&search, root, RelativePosition::Front, RelativePosition::Rear, range)?
        } else {
            let range = self.ego.parameters.look_back()?;
            neighbors::first_upstream(&search, root, RelativePosition::Rear, RelativePosition::Front, range)?
        };
        neighbors::headways(self.headway_type, self.ego, found, downstream, self.world.time())
    }

    fn find_alongside(&self, lat: LateralDirection) -> PerceptionResult<bool> {
        self.check_lateral_direction(lat)?;
        let root = self.structure.first_record(lane_of(lat))?;
        let search = self.search();
        let range = self.ego.length();

        let ahead =
            neighbors::first_downstream(&search, root, RelativePosition::Rear, RelativePosition::Front, range)?;
        if ahead.first().is_some_and(|u| u.distance.0 <= 0.0) {
            return Ok(true);
        }
        let behind =
            neighbors::first_upstream(&search, root, RelativePosition::Front, RelativePosition::Rear, range)?;
        Ok(behind.first().is_some_and(|u| u.distance.0 <= 0.0))
    }

    fn search(&self) -> Search<'_, 'a> {
        Search { world: self.world, structure: &self.structure, ego: self.ego }
    }

    fn logged<T>(&self, what: &'static str, result: PerceptionResult<T>) -> PerceptionResult<T> {
        if let Err(e @ PerceptionError::NetworkInconsistency(_)) = &result {
            warn!(ego = %self.ego.id, what, error = %e, "perception update failed");
        }
        result
    }
}

fn lane_of(lat: LateralDirection) -> RelativeLane {
    if lat.is_left() { RelativeLane::LEFT } else { RelativeLane::RIGHT }
}

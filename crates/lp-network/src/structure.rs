//! Ego-relative lane structure.
//!
//! A [`LaneStructure`] is the lane graph as seen from one ego GTU at one
//! instant.  Every lane within range gets exactly one [`LaneRecord`] holding
//! its `start_distance`: the distance from the ego reference point to the
//! lane's entry, measured along the direction of travel (negative when the
//! entry is behind the ego).
//!
//! ```text
//!              start_distance(LEFT) = -x_left
//!             |<------|
//!   LEFT      |=======|=====X========|====>
//!   CURRENT   |=============E========|====>
//!             |<------------|
//!              start_distance(CURRENT) = -x_ego
//! ```
//!
//! The cross-section records (one per reachable adjacent lane) are the roots.
//! From them the structure expands downstream over successors while a record
//! starts within look-ahead of the ego front, and upstream over predecessors
//! while a record ends within look-back of the ego rear.  A lane reached
//! along two paths at different distances (ring roads) is kept at the first
//! distance only and not linked along the second path.

use std::collections::{BTreeMap, VecDeque};

use tracing::trace;

use lp_core::{Direction, GtuId, LaneId, LateralDirection, Length, RecordId, RelativeLane};

use crate::{GtuState, LaneNetwork, NetworkError, NetworkResult};

/// Distances closer than this are considered the same lane entry.
const LINK_TOLERANCE: f64 = 1e-6;

// ── LaneRecord ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct LaneRecord {
    pub lane:           LaneId,
    pub direction:      Direction,
    /// Cross-section lane this record was reached from.
    pub relative_lane:  RelativeLane,
    /// Distance from the ego reference point to the lane entry.
    pub start_distance: Length,
    pub length:         Length,
    pub next:           Vec<RecordId>,
    pub prev:           Vec<RecordId>,
}

impl LaneRecord {
    #[inline]
    pub fn end_distance(&self) -> Length {
        self.start_distance + self.length
    }

    /// Distance from the ego reference point to a point `driving_position`
    /// into this lane.
    #[inline]
    pub fn distance_to(&self, driving_position: Length) -> Length {
        self.start_distance + driving_position
    }
}

// ── LaneStructure ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct LaneStructure {
    ego:     GtuId,
    records: Vec<LaneRecord>,
    roots:   BTreeMap<RelativeLane, RecordId>,
}

impl LaneStructure {
    /// Build the structure around `ego`, reaching `look_ahead` beyond its
    /// front and `look_back` behind its rear.
    pub fn build(
        network: &LaneNetwork,
        ego: &GtuState,
        look_ahead: Length,
        look_back: Length,
    ) -> NetworkResult<Self> {
        let lane_length = network.length(ego.lane)?;
        let x_ego = network.driving_position(ego.lane, ego.position);
        let fraction = x_ego / lane_length;

        let mut s = Self { ego: ego.id, records: Vec::new(), roots: BTreeMap::new() };
        let mut by_lane: BTreeMap<LaneId, RecordId> = BTreeMap::new();

        // Cross-section: walk outwards on both sides, projecting the ego
        // position onto each lane by its relative progress.
        let root = s.push(network, ego.lane, RelativeLane::CURRENT, -x_ego);
        by_lane.insert(ego.lane, root);
        s.roots.insert(RelativeLane::CURRENT, root);
        for lat in [LateralDirection::Left, LateralDirection::Right] {
            let mut rel = RelativeLane::CURRENT;
            let mut lane = ego.lane;
            while let Some(adj) = network.adjacent(lane, lat) {
                if by_lane.contains_key(&adj) {
                    break;
                }
                rel = if lat.is_left() { rel.left() } else { rel.right() };
                let start = -(network.lane_length[adj.index()] * fraction);
                let id = s.push(network, adj, rel, start);
                by_lane.insert(adj, id);
                s.roots.insert(rel, id);
                lane = adj;
            }
        }

        let downstream_limit = ego.front + look_ahead;
        let upstream_limit = ego.rear - look_back;
        let mut queue: VecDeque<RecordId> = s.roots.values().copied().collect();
        while let Some(from) = queue.pop_front() {
            let (lane, rel, end) = {
                let r = &s.records[from.index()];
                (r.lane, r.relative_lane, r.end_distance())
            };
            if end >= downstream_limit {
                continue;
            }
            for &next in network.next(lane) {
                if let Some(to) = s.link(&mut by_lane, network, next, rel, end, from, true) {
                    queue.push_back(to);
                }
            }
        }

        let mut queue: VecDeque<RecordId> = s.roots.values().copied().collect();
        while let Some(from) = queue.pop_front() {
            let (lane, rel, start) = {
                let r = &s.records[from.index()];
                (r.lane, r.relative_lane, r.start_distance)
            };
            if start <= upstream_limit {
                continue;
            }
            for &prev in network.prev(lane) {
                let prev_start = start - network.lane_length[prev.index()];
                if let Some(to) = s.link(&mut by_lane, network, prev, rel, prev_start, from, false) {
                    queue.push_back(to);
                }
            }
        }

        trace!(ego = %ego.id, records = s.records.len(), lanes = s.roots.len(), "lane structure built");
        Ok(s)
    }

    fn push(&mut self, network: &LaneNetwork, lane: LaneId, rel: RelativeLane, start: Length) -> RecordId {
        let id = RecordId(self.records.len() as u32);
        self.records.push(LaneRecord {
            lane,
            direction: network.lane_direction[lane.index()],
            relative_lane: rel,
            start_distance: start,
            length: network.lane_length[lane.index()],
            next: Vec::new(),
            prev: Vec::new(),
        });
        id
    }

    /// Link `from` to the record of `lane` starting at `start`, creating the
    /// record when the lane has none yet.  Returns the id of a newly created
    /// record, which still needs expanding.
    #[allow(clippy::too_many_arguments)]
    fn link(
        &mut self,
        by_lane: &mut BTreeMap<LaneId, RecordId>,
        network: &LaneNetwork,
        lane: LaneId,
        rel: RelativeLane,
        start: Length,
        from: RecordId,
        downstream: bool,
    ) -> Option<RecordId> {
        let (to, created) = match by_lane.get(&lane) {
            Some(&existing) => {
                let known = self.records[existing.index()].start_distance;
                if (known - start).abs().0 > LINK_TOLERANCE {
                    trace!(%lane, known = %known, found = %start, "lane reached at a second distance, not linked");
                    return None;
                }
                (existing, false)
            }
            None => {
                let id = self.push(network, lane, rel, start);
                by_lane.insert(lane, id);
                (id, true)
            }
        };
        let (up, down) = if downstream { (from, to) } else { (to, from) };
        if !self.records[up.index()].next.contains(&down) {
            self.records[up.index()].next.push(down);
            self.records[down.index()].prev.push(up);
        }
        created.then_some(to)
    }

    pub fn ego(&self) -> GtuId {
        self.ego
    }

    /// Root record of `lane` in the ego's cross-section.
    pub fn first_record(&self, lane: RelativeLane) -> NetworkResult<RecordId> {
        self.roots.get(&lane).copied().ok_or(NetworkError::NoRecord(lane))
    }

    pub fn record(&self, id: RecordId) -> NetworkResult<&LaneRecord> {
        self.records.get(id.index()).ok_or(NetworkError::RecordNotFound(id))
    }

    /// Relative lanes of the cross-section, far left to far right.
    pub fn cross_section(&self) -> impl Iterator<Item = RelativeLane> + '_ {
        self.roots.keys().copied()
    }

    pub fn contains(&self, lane: RelativeLane) -> bool {
        self.roots.contains_key(&lane)
    }

    pub fn records(&self) -> &[LaneRecord] {
        &self.records
    }
}

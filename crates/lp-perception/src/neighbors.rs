//! Topology walks over the lane structure.
//!
//! All positions here are ego-relative: the distance from the ego reference
//! point along the direction of travel, `record.start_distance + driving
//! position`.  A neighbor's reference point therefore lies at
//! `candidate.position` and its front at `candidate.position + gtu.front`.
//!
//! Two kinds of walk:
//!
//! - [`Neighbors`]: every GTU on a relative lane and all lanes reachable
//!   from it, in distance order.  Records are gathered eagerly when the set
//!   is created, GTUs are visited lazily through a k-way merge of one cursor
//!   per record.
//! - [`first_downstream`] / [`first_upstream`]: per branch only the first
//!   GTU, which is what the first leaders, first followers and alongside
//!   checks need at splits and merges.
//!
//! ```text
//!               ┌── L1 ──a──────c──>     leaders(LEFT):       a, b, c
//!   LEFT  ──────┤                        first_leaders(LEFT): a, b
//!               └── L2 ─────b─────>
//!   CURR  ───E──────>
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, VecDeque};

use lp_core::{GtuId, LaneId, Length, PerceptionResult, RecordId, RelativeLane, Time};
use lp_headway::{HeadwayGtu, HeadwayGtuType};
use lp_network::{GtuState, LaneStructure, PerceptionWorld, RelativePosition};

use crate::{FilteredIterable, PerceptionCollectable, UnderlyingDistance};

/// Lateral tie-break applied to the ego front when selecting neighbors on
/// adjacent lanes.
pub const MARGIN: Length = Length(1e-6);

// ── Candidates ────────────────────────────────────────────────────────────────

/// A GTU on a record, with its reference point in ego-relative position.
#[derive(Copy, Clone, Debug)]
pub struct Candidate<'a> {
    pub gtu:      &'a GtuState,
    pub position: Length,
}

impl Candidate<'_> {
    #[inline]
    fn at(&self, pos: RelativePosition) -> Length {
        self.position + self.gtu.offset(pos)
    }
}

/// GTUs on one record in driving order, or reversed when walking upstream.
struct RecordGtus<'a> {
    gtus:       &'a [&'a GtuState],
    positions:  &'a [Length],
    start:      Length,
    downstream: bool,
    remaining:  usize,
}

impl<'a> RecordGtus<'a> {
    fn new(world: &'a PerceptionWorld<'a>, lane: LaneId, start: Length, downstream: bool) -> Self {
        let (gtus, positions) = world.lane_gtus(lane);
        Self { gtus, positions, start, downstream, remaining: gtus.len() }
    }
}

impl<'a> Iterator for RecordGtus<'a> {
    type Item = Candidate<'a>;

    fn next(&mut self) -> Option<Candidate<'a>> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let i = if self.downstream { self.gtus.len() - 1 - self.remaining } else { self.remaining };
        Some(Candidate { gtu: self.gtus[i], position: self.start + self.positions[i] })
    }
}

// ── Record gathering ──────────────────────────────────────────────────────────

/// `(lane, start_distance)` of `root` and every record reachable from it in
/// the walk direction.
///
/// A GTU is registered on the lane of its reference point only, so records
/// against the walk direction are added too while a GTU on them could still
/// pass `threshold`: predecessors ending within `max_front` of it when
/// walking downstream, successors starting before it when walking upstream.
/// Those are not expanded sideways into other branches.
fn reachable(
    structure: &LaneStructure,
    root: RecordId,
    downstream: bool,
    threshold: Length,
    max_front: Length,
) -> PerceptionResult<Vec<(LaneId, Length)>> {
    let mut seen = BTreeSet::from([root]);
    let mut queue = VecDeque::from([root]);
    let mut out = Vec::new();
    while let Some(id) = queue.pop_front() {
        let record = structure.record(id)?;
        out.push((record.lane, record.start_distance));
        let links = if downstream { &record.next } else { &record.prev };
        for &link in links {
            if seen.insert(link) {
                queue.push_back(link);
            }
        }
    }

    let mut queue = VecDeque::from([root]);
    while let Some(id) = queue.pop_front() {
        let record = structure.record(id)?;
        let links = if downstream { &record.prev } else { &record.next };
        for &link in links {
            let other = structure.record(link)?;
            let overhangs = if downstream {
                other.end_distance() + max_front > threshold
            } else {
                other.start_distance < threshold
            };
            if overhangs && seen.insert(link) {
                out.push((other.lane, other.start_distance));
                queue.push_back(link);
            }
        }
    }
    Ok(out)
}

// ── Neighbors ─────────────────────────────────────────────────────────────────

/// Leaders or followers on one relative lane.
///
/// Leaders are GTUs whose front is ahead of the ego front, at distance
/// `neighbor rear - ego front`.  Followers are GTUs whose front is behind the
/// ego front, at distance `ego rear - neighbor front`.  Both are negative for
/// GTUs alongside the ego.  On the left the ego front is shifted by
/// [`MARGIN`] so that a tie counts as a leader and as a follower; on the right
/// a tie counts as neither.
pub struct Neighbors<'a> {
    world:         &'a PerceptionWorld<'a>,
    ego:           &'a GtuState,
    headway_type:  &'a HeadwayGtuType,
    records:       Vec<(LaneId, Length)>,
    downstream:    bool,
    range:         Length,
    threshold:     Length,
}

impl<'a> Neighbors<'a> {
    pub(crate) fn new(
        world: &'a PerceptionWorld<'a>,
        structure: &LaneStructure,
        ego: &'a GtuState,
        headway_type: &'a HeadwayGtuType,
        lane: RelativeLane,
        downstream: bool,
        range: Length,
    ) -> PerceptionResult<Self> {
        let root = structure.first_record(lane)?;
        let shift = if lane.is_left() {
            -MARGIN
        } else if lane.is_right() {
            MARGIN
        } else {
            Length::ZERO
        };
        let threshold = if downstream { ego.front + shift } else { ego.front - shift };
        let records = reachable(structure, root, downstream, threshold, world.max_front())?;
        Ok(Self { world, ego, headway_type, records, downstream, range, threshold })
    }

    pub fn is_downstream(&self) -> bool {
        self.downstream
    }

    /// Number of lane records this set walks.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    fn walk(&self) -> NeighborWalk<'a> {
        let ego_id = self.ego.id;
        let threshold = self.threshold;
        let downstream = self.downstream;
        let cursors = self
            .records
            .iter()
            .map(|&(lane, start)| {
                let predicate: CandidateFilter<'a> = Box::new(move |c: &Candidate<'a>| {
                    let front = c.at(RelativePosition::Front);
                    c.gtu.id != ego_id && if downstream { front > threshold } else { front < threshold }
                });
                FilteredIterable::new(RecordGtus::new(self.world, lane, start, downstream), predicate)
            })
            .collect();
        NeighborWalk {
            ego: self.ego,
            downstream,
            range: self.range,
            cursors,
            heap: BinaryHeap::new(),
            primed: false,
        }
    }
}

impl<'a> PerceptionCollectable for Neighbors<'a> {
    type Object = &'a GtuState;
    type Headway = HeadwayGtu<'a>;

    fn underlying(&self) -> impl Iterator<Item = UnderlyingDistance<&'a GtuState>> + '_ {
        self.walk()
    }

    fn wrap(&self, neighbor: UnderlyingDistance<&'a GtuState>) -> PerceptionResult<HeadwayGtu<'a>> {
        self.headway_type.create_headway(
            self.ego,
            neighbor.object,
            neighbor.distance,
            self.downstream,
            self.world.time(),
        )
    }
}

// ── k-way merge ───────────────────────────────────────────────────────────────

type CandidateFilter<'a> = Box<dyn FnMut(&Candidate<'a>) -> bool + 'a>;

/// Heap entry; the heap pops the smallest distance first, ties by id.
struct Pending<'a> {
    distance: Length,
    gtu:      &'a GtuState,
    cursor:   usize,
}

impl PartialEq for Pending<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending<'_> {}

impl PartialOrd for Pending<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then(other.gtu.id.cmp(&self.gtu.id))
    }
}

struct NeighborWalk<'a> {
    ego:        &'a GtuState,
    downstream: bool,
    range:      Length,
    cursors:    Vec<FilteredIterable<RecordGtus<'a>, CandidateFilter<'a>>>,
    heap:       BinaryHeap<Pending<'a>>,
    primed:     bool,
}

impl<'a> NeighborWalk<'a> {
    fn distance(&self, c: &Candidate<'a>) -> Length {
        if self.downstream {
            c.at(RelativePosition::Rear) - self.ego.front
        } else {
            self.ego.rear - c.at(RelativePosition::Front)
        }
    }

    fn pull(&mut self, cursor: usize) {
        if let Some(c) = self.cursors[cursor].next() {
            let distance = self.distance(&c);
            self.heap.push(Pending { distance, gtu: c.gtu, cursor });
        }
    }
}

impl<'a> Iterator for NeighborWalk<'a> {
    type Item = UnderlyingDistance<&'a GtuState>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.primed {
            self.primed = true;
            for cursor in 0..self.cursors.len() {
                self.pull(cursor);
            }
        }
        let next = self.heap.pop()?;
        if next.distance > self.range {
            self.heap.clear();
            self.cursors.clear();
            return None;
        }
        self.pull(next.cursor);
        Some(UnderlyingDistance::new(next.gtu, next.distance))
    }
}

// ── First GTUs per branch ─────────────────────────────────────────────────────

/// Search context shared by the first-GTU walks.
pub(crate) struct Search<'s, 'a> {
    pub world:     &'a PerceptionWorld<'a>,
    pub structure: &'s LaneStructure,
    pub ego:       &'a GtuState,
}

/// First GTU downstream on every branch from `root`: the nearest GTU whose
/// `other` point is ahead of the ego's `from` point.  Branches without one
/// continue onto their successors while they start within `range` of the
/// ego front.  Sorted by distance `neighbor rear - ego front`.
pub(crate) fn first_downstream<'a>(
    search: &Search<'_, 'a>,
    root: RecordId,
    from: RelativePosition,
    other: RelativePosition,
    range: Length,
) -> PerceptionResult<Vec<UnderlyingDistance<&'a GtuState>>> {
    let ego = search.ego;
    let x = ego.offset(from);
    let mut start = Vec::new();
    branch_upstream(search.structure, root, x, &mut start, &mut BTreeSet::new())?;

    let mut seen: BTreeSet<RecordId> = start.iter().copied().collect();
    let mut queue: VecDeque<RecordId> = start.into_iter().collect();
    let mut out = Vec::new();
    while let Some(id) = queue.pop_front() {
        let record = search.structure.record(id)?;
        let found = RecordGtus::new(search.world, record.lane, record.start_distance, true)
            .find(|c| c.gtu.id != ego.id && c.at(other) > x);
        match found {
            Some(c) => {
                let distance = c.at(RelativePosition::Rear) - ego.front;
                if distance <= range {
                    out.push(UnderlyingDistance::new(c.gtu, distance));
                }
            }
            None => {
                for &next in &record.next {
                    let reach = search.structure.record(next)?.start_distance - ego.front;
                    if reach <= range && seen.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
    }
    Ok(sorted(out))
}

/// Mirror of [`first_downstream`]: the nearest GTU per branch whose `other`
/// point is behind the ego's `from` point, at distance `ego rear - neighbor
/// front`.
pub(crate) fn first_upstream<'a>(
    search: &Search<'_, 'a>,
    root: RecordId,
    from: RelativePosition,
    other: RelativePosition,
    range: Length,
) -> PerceptionResult<Vec<UnderlyingDistance<&'a GtuState>>> {
    let ego = search.ego;
    let x = ego.offset(from);
    let mut start = Vec::new();
    branch_downstream(search.structure, root, x, &mut start, &mut BTreeSet::new())?;

    let mut seen: BTreeSet<RecordId> = start.iter().copied().collect();
    let mut queue: VecDeque<RecordId> = start.into_iter().collect();
    let mut out = Vec::new();
    while let Some(id) = queue.pop_front() {
        let record = search.structure.record(id)?;
        let found = RecordGtus::new(search.world, record.lane, record.start_distance, false)
            .find(|c| c.gtu.id != ego.id && c.at(other) < x);
        match found {
            Some(c) => {
                let distance = ego.rear - c.at(RelativePosition::Front);
                if distance <= range {
                    out.push(UnderlyingDistance::new(c.gtu, distance));
                }
            }
            None => {
                for &prev in &record.prev {
                    let reach = ego.rear - search.structure.record(prev)?.end_distance();
                    if reach <= range && seen.insert(prev) {
                        queue.push_back(prev);
                    }
                }
            }
        }
    }
    Ok(sorted(out))
}

/// Records where a downstream search from ego-relative position `x`
/// starts: `root`, or its predecessors when `x` lies before its entry.
fn branch_upstream(
    structure: &LaneStructure,
    id: RecordId,
    x: Length,
    out: &mut Vec<RecordId>,
    seen: &mut BTreeSet<RecordId>,
) -> PerceptionResult<()> {
    if !seen.insert(id) {
        return Ok(());
    }
    let record = structure.record(id)?;
    if x < record.start_distance && !record.prev.is_empty() {
        for &prev in &record.prev {
            branch_upstream(structure, prev, x, out, seen)?;
        }
    } else {
        out.push(id);
    }
    Ok(())
}

/// Records where an upstream search from `x` starts: `root`, or its
/// successors when `x` lies beyond its end.
fn branch_downstream(
    structure: &LaneStructure,
    id: RecordId,
    x: Length,
    out: &mut Vec<RecordId>,
    seen: &mut BTreeSet<RecordId>,
) -> PerceptionResult<()> {
    if !seen.insert(id) {
        return Ok(());
    }
    let record = structure.record(id)?;
    if x > record.end_distance() && !record.next.is_empty() {
        for &next in &record.next {
            branch_downstream(structure, next, x, out, seen)?;
        }
    } else {
        out.push(id);
    }
    Ok(())
}

fn sorted<'a>(mut found: Vec<UnderlyingDistance<&'a GtuState>>) -> Vec<UnderlyingDistance<&'a GtuState>> {
    found.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.object.id.cmp(&b.object.id)));
    found.dedup_by_key(|u| u.object.id);
    found
}

/// Wrap first-GTU search results into headways at `now`.
pub(crate) fn headways<'a>(
    headway_type: &HeadwayGtuType,
    ego: &GtuState,
    found: Vec<UnderlyingDistance<&'a GtuState>>,
    downstream: bool,
    now: Time,
) -> PerceptionResult<Vec<HeadwayGtu<'a>>> {
    found
        .into_iter()
        .map(|u| headway_type.create_headway(ego, u.object, u.distance, downstream, now))
        .collect()
}

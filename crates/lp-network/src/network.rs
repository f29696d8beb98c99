//! Lane network representation and builder.
//!
//! # Data layout
//!
//! Lanes are stored struct-of-arrays, indexed by `LaneId`.  Successors and
//! predecessors use **Compressed Sparse Row (CSR)** format: the successors of
//! lane `l` occupy
//!
//! ```text
//! next_lanes[ next_start[l] .. next_start[l+1] ]
//! ```
//!
//! and likewise for `prev_start` / `prev_lanes`.  A split is a lane with more
//! than one successor, a merge a lane with more than one predecessor.
//!
//! Lateral adjacency is one slot per side, [`LaneId::INVALID`] when the lane
//! has no neighbor on that side.

use lp_core::{Direction, LaneId, LateralDirection, Length};

use crate::{NetworkError, NetworkResult};

// ── LaneNetwork ───────────────────────────────────────────────────────────────

/// Directed lane graph with lateral adjacency.
///
/// All fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`LaneNetworkBuilder`].
#[derive(Debug, Clone)]
pub struct LaneNetwork {
    // ── Lane data ─────────────────────────────────────────────────────────
    /// Length of each lane's design line.
    pub lane_length: Vec<Length>,

    /// Direction of travel relative to the design line.
    pub lane_direction: Vec<Direction>,

    // ── CSR longitudinal adjacency ────────────────────────────────────────
    /// CSR row pointer into `next_lanes`.  Length = `lane_count + 1`.
    pub next_start: Vec<u32>,
    pub next_lanes: Vec<LaneId>,

    /// CSR row pointer into `prev_lanes`.  Length = `lane_count + 1`.
    pub prev_start: Vec<u32>,
    pub prev_lanes: Vec<LaneId>,

    // ── Lateral adjacency ─────────────────────────────────────────────────
    pub left:  Vec<LaneId>,
    pub right: Vec<LaneId>,
}

impl LaneNetwork {
    pub fn lane_count(&self) -> usize {
        self.lane_length.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lane_length.is_empty()
    }

    #[inline]
    pub fn contains(&self, lane: LaneId) -> bool {
        lane.index() < self.lane_count()
    }

    /// Fails with [`NetworkError::LaneNotFound`] for an unknown lane.
    #[inline]
    pub fn check(&self, lane: LaneId) -> NetworkResult<LaneId> {
        if self.contains(lane) { Ok(lane) } else { Err(NetworkError::LaneNotFound(lane)) }
    }

    pub fn length(&self, lane: LaneId) -> NetworkResult<Length> {
        self.check(lane).map(|l| self.lane_length[l.index()])
    }

    pub fn direction(&self, lane: LaneId) -> NetworkResult<Direction> {
        self.check(lane).map(|l| self.lane_direction[l.index()])
    }

    /// Successor lanes of `lane` (contiguous slice, no allocation).
    #[inline]
    pub fn next(&self, lane: LaneId) -> &[LaneId] {
        let start = self.next_start[lane.index()] as usize;
        let end   = self.next_start[lane.index() + 1] as usize;
        &self.next_lanes[start..end]
    }

    /// Predecessor lanes of `lane`.
    #[inline]
    pub fn prev(&self, lane: LaneId) -> &[LaneId] {
        let start = self.prev_start[lane.index()] as usize;
        let end   = self.prev_start[lane.index() + 1] as usize;
        &self.prev_lanes[start..end]
    }

    /// The lane adjacent to `lane` on side `lat`, if any.  `None` for
    /// [`LateralDirection::None`].
    pub fn adjacent(&self, lane: LaneId, lat: LateralDirection) -> Option<LaneId> {
        let id = match lat {
            LateralDirection::Left  => self.left[lane.index()],
            LateralDirection::Right => self.right[lane.index()],
            LateralDirection::None  => return None,
        };
        id.is_valid().then_some(id)
    }

    /// Distance of design-line position `position` from the lane's entry in
    /// the direction of travel.
    #[inline]
    pub fn driving_position(&self, lane: LaneId, position: Length) -> Length {
        match self.lane_direction[lane.index()] {
            Direction::Plus  => position,
            Direction::Minus => self.lane_length[lane.index()] - position,
        }
    }
}

// ── LaneNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`LaneNetwork`] incrementally, then call [`build`](Self::build).
///
/// Lanes, connections and adjacencies may be added in any order.  `build()`
/// validates every referenced id and assembles the CSR arrays.
///
/// # Example
///
/// ```
/// use lp_core::Length;
/// use lp_network::LaneNetworkBuilder;
///
/// let mut b = LaneNetworkBuilder::new();
/// let a = b.add_lane(Length(100.0));
/// let c = b.add_lane(Length(50.0));
/// b.connect(a, c);
/// let net = b.build().unwrap();
/// assert_eq!(net.next(a), &[c]);
/// assert_eq!(net.prev(c), &[a]);
/// ```
#[derive(Default)]
pub struct LaneNetworkBuilder {
    lengths:     Vec<Length>,
    directions:  Vec<Direction>,
    links:       Vec<(LaneId, LaneId)>,
    adjacencies: Vec<(LaneId, LaneId)>,
}

impl LaneNetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a lane driven along its design line and return its `LaneId`
    /// (sequential from 0).
    pub fn add_lane(&mut self, length: Length) -> LaneId {
        self.add_lane_with_direction(length, Direction::Plus)
    }

    pub fn add_lane_with_direction(&mut self, length: Length, direction: Direction) -> LaneId {
        let id = LaneId(self.lengths.len() as u32);
        self.lengths.push(length);
        self.directions.push(direction);
        id
    }

    /// Traffic leaving `from` enters `to`.
    pub fn connect(&mut self, from: LaneId, to: LaneId) {
        self.links.push((from, to));
    }

    /// `left` lies directly left of `right` (in the direction of travel).
    pub fn set_adjacent(&mut self, left: LaneId, right: LaneId) {
        self.adjacencies.push((left, right));
    }

    pub fn lane_count(&self) -> usize {
        self.lengths.len()
    }

    /// Consume the builder and produce a [`LaneNetwork`].
    ///
    /// Fails when a connection or adjacency names an unknown lane, or when a
    /// lane length is not strictly positive.
    pub fn build(self) -> NetworkResult<LaneNetwork> {
        let lane_count = self.lengths.len();
        let known = |l: LaneId| {
            if l.index() < lane_count { Ok(l) } else { Err(NetworkError::LaneNotFound(l)) }
        };

        for (i, &length) in self.lengths.iter().enumerate() {
            if !(length.is_finite() && length.0 > 0.0) {
                return Err(NetworkError::InvalidLaneLength { lane: LaneId(i as u32), length });
            }
        }
        for &(from, to) in &self.links {
            known(from)?;
            known(to)?;
        }

        let mut left  = vec![LaneId::INVALID; lane_count];
        let mut right = vec![LaneId::INVALID; lane_count];
        for &(l, r) in &self.adjacencies {
            known(l)?;
            known(r)?;
            right[l.index()] = r;
            left[r.index()]  = l;
        }

        let (next_start, next_lanes) = csr(lane_count, self.links.iter().copied());
        let (prev_start, prev_lanes) = csr(lane_count, self.links.iter().map(|&(f, t)| (t, f)));

        Ok(LaneNetwork {
            lane_length: self.lengths,
            lane_direction: self.directions,
            next_start,
            next_lanes,
            prev_start,
            prev_lanes,
            left,
            right,
        })
    }
}

/// Build a CSR row pointer and column array from `(row, column)` pairs.
/// Columns keep their insertion order within a row.
fn csr(rows: usize, pairs: impl Iterator<Item = (LaneId, LaneId)> + Clone) -> (Vec<u32>, Vec<LaneId>) {
    let mut start = vec![0u32; rows + 1];
    for (row, _) in pairs.clone() {
        start[row.index() + 1] += 1;
    }
    for i in 1..=rows {
        start[i] += start[i - 1];
    }

    let mut fill = start.clone();
    let mut cols = vec![LaneId::INVALID; start[rows] as usize];
    for (row, col) in pairs {
        cols[fill[row.index()] as usize] = col;
        fill[row.index()] += 1;
    }
    (start, cols)
}

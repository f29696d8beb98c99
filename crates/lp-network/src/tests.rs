//! Unit tests for lp-network.
//!
//! All tests use small hand-built networks.

#[cfg(test)]
mod helpers {
    use lp_core::{LaneId, Length};

    use crate::{LaneNetwork, LaneNetworkBuilder};

    /// Two parallel lanes of three consecutive 100 m sections each.
    ///
    /// ```text
    ///   L:  0 ──> 2 ──> 4
    ///   R:  1 ──> 3 ──> 5
    /// ```
    pub fn two_lane_road() -> (LaneNetwork, [LaneId; 6]) {
        let mut b = LaneNetworkBuilder::new();
        let ids: Vec<LaneId> = (0..6).map(|_| b.add_lane(Length(100.0))).collect();
        for i in 0..4 {
            b.connect(ids[i], ids[i + 2]);
        }
        for i in (0..6).step_by(2) {
            b.set_adjacent(ids[i], ids[i + 1]);
        }
        let net = b.build().unwrap();
        (net, [ids[0], ids[1], ids[2], ids[3], ids[4], ids[5]])
    }

    /// A single lane splitting into two branches.
    ///
    /// ```text
    ///   0 ──┬──> 1
    ///       └──> 2
    /// ```
    pub fn split() -> (LaneNetwork, [LaneId; 3]) {
        let mut b = LaneNetworkBuilder::new();
        let a = b.add_lane(Length(100.0));
        let l = b.add_lane(Length(80.0));
        let r = b.add_lane(Length(120.0));
        b.connect(a, l);
        b.connect(a, r);
        (b.build().unwrap(), [a, l, r])
    }
}

// ── Builder & network structure ───────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use lp_core::{Direction, LaneId, LateralDirection, Length};

    use super::helpers::{split, two_lane_road};
    use crate::{LaneNetworkBuilder, NetworkError};

    #[test]
    fn empty_build() {
        let net = LaneNetworkBuilder::new().build().unwrap();
        assert_eq!(net.lane_count(), 0);
        assert!(net.is_empty());
    }

    #[test]
    fn csr_successors_and_predecessors() {
        let (net, [a, l, r]) = split();
        assert_eq!(net.next(a), &[l, r]);
        assert!(net.next(l).is_empty());
        assert_eq!(net.prev(l), &[a]);
        assert_eq!(net.prev(r), &[a]);
        assert!(net.prev(a).is_empty());
    }

    #[test]
    fn lateral_adjacency_is_symmetric() {
        let (net, ids) = two_lane_road();
        assert_eq!(net.adjacent(ids[0], LateralDirection::Right), Some(ids[1]));
        assert_eq!(net.adjacent(ids[1], LateralDirection::Left), Some(ids[0]));
        assert_eq!(net.adjacent(ids[0], LateralDirection::Left), None);
        assert_eq!(net.adjacent(ids[0], LateralDirection::None), None);
    }

    #[test]
    fn unknown_lane_in_connection_is_rejected() {
        let mut b = LaneNetworkBuilder::new();
        let a = b.add_lane(Length(10.0));
        b.connect(a, LaneId(9));
        assert_eq!(b.build().unwrap_err(), NetworkError::LaneNotFound(LaneId(9)));
    }

    #[test]
    fn non_positive_length_is_rejected() {
        let mut b = LaneNetworkBuilder::new();
        b.add_lane(Length(0.0));
        assert!(matches!(b.build(), Err(NetworkError::InvalidLaneLength { .. })));
    }

    #[test]
    fn minus_lane_driving_position_runs_backwards() {
        let mut b = LaneNetworkBuilder::new();
        let lane = b.add_lane_with_direction(Length(50.0), Direction::Minus);
        let net = b.build().unwrap();
        assert_eq!(net.driving_position(lane, Length(10.0)), Length(40.0));
    }
}

// ── Kinematic history ─────────────────────────────────────────────────────────

#[cfg(test)]
mod history {
    use lp_core::{Acceleration, LaneId, Length, Speed, Time};

    use crate::GtuState;

    fn gtu() -> GtuState {
        GtuState::new(Length(4.0), LaneId(0), Length(0.0))
    }

    #[test]
    fn no_history_falls_back_to_current_state() {
        let g = gtu().with_speed(Speed(12.0));
        assert_eq!(g.speed_at(Time(3.0)), Speed(12.0));
        assert_eq!(g.odometer_at(Time(3.0)), Length::ZERO);
    }

    #[test]
    fn extrapolates_from_latest_sample_before_query() {
        let mut g = gtu();
        g.set_state(Time(0.0), LaneId(0), Length(0.0), Speed(10.0), Acceleration(1.0), Length(0.0));
        g.set_state(Time(2.0), LaneId(0), Length(22.0), Speed(12.0), Acceleration(0.0), Length(22.0));

        // 10 * 1 + 0.5 * 1 * 1
        assert_eq!(g.odometer_at(Time(1.0)), Length(10.5));
        assert_eq!(g.speed_at(Time(1.0)), Speed(11.0));
        assert_eq!(g.odometer_at(Time(2.0)), Length(22.0));
        assert_eq!(g.acceleration_at(Time(2.5)), Acceleration(0.0));
    }

    #[test]
    fn query_before_first_sample_clamps() {
        let mut g = gtu();
        g.set_state(Time(5.0), LaneId(0), Length(0.0), Speed(8.0), Acceleration(0.0), Length(100.0));
        assert_eq!(g.odometer_at(Time(1.0)), Length(100.0));
    }

    #[test]
    fn decelerating_sample_holds_at_standstill() {
        let mut g = gtu();
        g.set_state(Time(0.0), LaneId(0), Length(0.0), Speed(10.0), Acceleration(-2.0), Length(0.0));
        assert_eq!(g.speed_at(Time(10.0)), Speed::ZERO);
        assert_eq!(g.acceleration_at(Time(10.0)), Acceleration::ZERO);
        assert_eq!(g.odometer_at(Time(10.0)), Length(25.0));
    }

    #[test]
    fn capacity_drops_oldest_sample() {
        let mut g = gtu().with_history_capacity(2);
        for t in 0..4 {
            g.set_state(Time(t as f64), LaneId(0), Length(0.0), Speed(1.0), Acceleration(0.0), Length(t as f64));
        }
        assert_eq!(g.history().len(), 2);
        // earliest kept sample is t = 2
        assert_eq!(g.odometer_at(Time(0.0)), Length(2.0));
    }

    #[test]
    fn same_time_sample_replaces() {
        let mut g = gtu();
        g.set_state(Time(1.0), LaneId(0), Length(0.0), Speed(1.0), Acceleration(0.0), Length(0.0));
        g.set_state(Time(1.0), LaneId(0), Length(0.0), Speed(2.0), Acceleration(0.0), Length(0.0));
        assert_eq!(g.history().len(), 1);
        assert_eq!(g.speed_at(Time(1.0)), Speed(2.0));
    }
}

// ── Store & occupancy ─────────────────────────────────────────────────────────

#[cfg(test)]
mod occupancy {
    use lp_core::{GtuId, Length};

    use super::helpers::two_lane_road;
    use crate::{GtuState, GtuStore, LaneOccupancy, NetworkError};

    #[test]
    fn store_assigns_sequential_ids() {
        let (_, ids) = two_lane_road();
        let mut store = GtuStore::new();
        let a = store.add(GtuState::new(Length(4.0), ids[0], Length(10.0)));
        let b = store.add(GtuState::new(Length(4.0), ids[0], Length(20.0)));
        assert_eq!((a, b), (GtuId(0), GtuId(1)));
        assert_eq!(store.get(b).unwrap().id, b);
        assert_eq!(store.get(GtuId(7)).unwrap_err(), NetworkError::GtuNotFound(GtuId(7)));
    }

    #[test]
    fn gtus_sorted_in_driving_order_per_lane() {
        let (net, ids) = two_lane_road();
        let mut store = GtuStore::new();
        let far = store.add(GtuState::new(Length(4.0), ids[0], Length(80.0)));
        let other = store.add(GtuState::new(Length(4.0), ids[1], Length(50.0)));
        let near = store.add(GtuState::new(Length(4.0), ids[0], Length(10.0)));

        let occ = LaneOccupancy::build(&net, &store).unwrap();
        assert_eq!(occ.gtus(ids[0]), &[near, far]);
        assert_eq!(occ.positions(ids[0]), &[Length(10.0), Length(80.0)]);
        assert_eq!(occ.gtus(ids[1]), &[other]);
        assert_eq!(occ.count(ids[2]), 0);
    }

    #[test]
    fn position_beyond_lane_is_rejected() {
        let (net, ids) = two_lane_road();
        let mut store = GtuStore::new();
        store.add(GtuState::new(Length(4.0), ids[0], Length(101.0)));
        assert!(matches!(
            LaneOccupancy::build(&net, &store),
            Err(NetworkError::PositionOutOfRange { .. })
        ));
    }
}

// ── Lane structure ────────────────────────────────────────────────────────────

#[cfg(test)]
mod structure {
    use lp_core::{Length, PerceptionError, RelativeLane};

    use super::helpers::{split, two_lane_road};
    use crate::{GtuState, GtuStore, LaneStructure, NetworkError, PerceptionWorld};

    #[test]
    fn cross_section_and_start_distances() {
        let (net, ids) = two_lane_road();
        let ego = GtuState::new(Length(4.0), ids[3], Length(30.0));
        let s = LaneStructure::build(&net, &ego, Length(50.0), Length(50.0)).unwrap();

        let lanes: Vec<RelativeLane> = s.cross_section().collect();
        assert_eq!(lanes, vec![RelativeLane::LEFT, RelativeLane::CURRENT]);

        let cur = s.record(s.first_record(RelativeLane::CURRENT).unwrap()).unwrap();
        assert_eq!(cur.lane, ids[3]);
        assert_eq!(cur.start_distance, Length(-30.0));
        let left = s.record(s.first_record(RelativeLane::LEFT).unwrap()).unwrap();
        assert_eq!(left.lane, ids[2]);
        assert_eq!(left.start_distance, Length(-30.0));
    }

    #[test]
    fn expansion_respects_range() {
        let (net, ids) = two_lane_road();
        // lane 3 starts 70 m ahead of the reference point, lane 5 170 m
        let ego = GtuState::new(Length(4.0), ids[1], Length(30.0));
        let s = LaneStructure::build(&net, &ego, Length(80.0), Length(10.0)).unwrap();

        let lanes: Vec<_> = s.records().iter().map(|r| r.lane).collect();
        assert!(lanes.contains(&ids[3]));
        assert!(!lanes.contains(&ids[5]));

        let cur = s.record(s.first_record(RelativeLane::CURRENT).unwrap()).unwrap();
        let next = s.record(cur.next[0]).unwrap();
        assert_eq!(next.start_distance, Length(70.0));
        assert_eq!(next.prev.len(), 1);
    }

    #[test]
    fn split_links_both_branches() {
        let (net, [a, l, r]) = split();
        let ego = GtuState::new(Length(4.0), a, Length(90.0));
        let s = LaneStructure::build(&net, &ego, Length(100.0), Length(100.0)).unwrap();
        let root = s.record(s.first_record(RelativeLane::CURRENT).unwrap()).unwrap();
        let branches: Vec<_> = root.next.iter().map(|&id| s.record(id).unwrap().lane).collect();
        assert_eq!(branches, vec![l, r]);
        for &id in &root.next {
            assert_eq!(s.record(id).unwrap().start_distance, Length(10.0));
        }
    }

    #[test]
    fn missing_relative_lane_converts_to_network_inconsistency() {
        let (net, [a, ..]) = split();
        let ego = GtuState::new(Length(4.0), a, Length(50.0));
        let s = LaneStructure::build(&net, &ego, Length(10.0), Length(10.0)).unwrap();
        let err = s.first_record(RelativeLane::LEFT).unwrap_err();
        assert_eq!(err, NetworkError::NoRecord(RelativeLane::LEFT));
        assert!(matches!(PerceptionError::from(err), PerceptionError::NetworkInconsistency(_)));
    }

    #[test]
    fn world_builds_structure_for_stored_gtu() {
        let (net, ids) = two_lane_road();
        let mut store = GtuStore::new();
        let ego = store.add(GtuState::new(Length(4.0), ids[0], Length(50.0)));
        let world = PerceptionWorld::new(lp_core::Time(1.0), &net, &store).unwrap();
        let s = world.lane_structure(ego, Length(100.0), Length(100.0)).unwrap();
        assert_eq!(s.ego(), ego);
        assert!(s.contains(RelativeLane::RIGHT));
    }

    #[test]
    fn world_resolves_lane_gtus_in_driving_order() {
        let (net, ids) = two_lane_road();
        let mut store = GtuStore::new();
        let far = store.add(GtuState::new(Length(4.0), ids[0], Length(60.0)));
        let truck = store.add(GtuState::new(Length(16.0), ids[0], Length(20.0)));
        let world = PerceptionWorld::new(lp_core::Time(1.0), &net, &store).unwrap();

        let (gtus, positions) = world.lane_gtus(ids[0]);
        let order: Vec<_> = gtus.iter().map(|g| g.id).collect();
        assert_eq!(order, vec![truck, far]);
        assert_eq!(positions.len(), 2);
        assert!(world.lane_gtus(ids[1]).0.is_empty());
        assert_eq!(world.max_front(), Length(8.0));
        assert_eq!(world.time(), lp_core::Time(1.0));
    }
}

//! Unit tests for lp-headway.

#[cfg(test)]
mod helpers {
    use lp_core::{LaneId, Length, Speed};
    use lp_network::GtuState;

    /// A GTU of `length` with its reference point at the front.
    pub fn gtu(length: f64, speed: f64) -> GtuState {
        GtuState::new(Length(length), LaneId(0), Length(0.0))
            .with_offsets(Length::ZERO, Length(-length))
            .with_speed(Speed(speed))
    }
}

// ── Anticipation ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod anticipation {
    use proptest::prelude::*;

    use lp_core::{Acceleration, Duration, Length, NeighborTriplet, Speed};

    use crate::Anticipation;

    fn triplet(headway: f64, speed: f64, acceleration: f64) -> NeighborTriplet {
        NeighborTriplet::new(Length(headway), Speed(speed), Acceleration(acceleration))
    }

    #[test]
    fn none_is_identity() {
        let t = triplet(30.0, 10.0, 1.0);
        assert_eq!(Anticipation::None.anticipate(t, Duration(2.0), Length(20.0), true), t);
        assert_eq!(
            Anticipation::None.ego_anticipation(Speed(10.0), Acceleration(1.0), Duration(2.0)),
            Length::ZERO
        );
    }

    #[test]
    fn constant_speed_direction_signs() {
        let t = triplet(30.0, 10.0, 0.0);
        // leader moves 10 m away, ego closes 15 m
        let down = Anticipation::ConstantSpeed.anticipate(t, Duration(1.0), Length(15.0), true);
        assert_eq!(down.headway, Length(25.0));
        // follower closes 10 m, ego pulls away 15 m
        let up = Anticipation::ConstantSpeed.anticipate(t, Duration(1.0), Length(15.0), false);
        assert_eq!(up.headway, Length(35.0));
        assert_eq!(up.speed, Speed(10.0));
    }

    #[test]
    fn constant_acceleration_stops_within_horizon() {
        let t = triplet(100.0, 10.0, -2.0);
        let out = Anticipation::ConstantAcceleration.anticipate(t, Duration(10.0), Length::ZERO, true);
        assert_eq!(out.speed, Speed::ZERO);
        assert_eq!(out.acceleration, Acceleration::ZERO);
        // 10 * 5 - 0.5 * 2 * 25
        assert_eq!(out.headway, Length(125.0));
    }

    #[test]
    fn constant_acceleration_without_stop_integrates_fully() {
        let t = triplet(0.0, 10.0, 1.0);
        let out = Anticipation::ConstantAcceleration.anticipate(t, Duration(2.0), Length::ZERO, true);
        assert_eq!(out.headway, Length(22.0));
        assert_eq!(out.speed, Speed(12.0));
        assert_eq!(out.acceleration, Acceleration(1.0));
    }

    #[test]
    fn ego_anticipation_ignores_acceleration() {
        for a in [Anticipation::ConstantSpeed, Anticipation::ConstantAcceleration] {
            assert_eq!(a.ego_anticipation(Speed(10.0), Acceleration(3.0), Duration(2.0)), Length(20.0));
        }
    }

    proptest! {
        #[test]
        fn zero_acceleration_matches_constant_speed(
            headway in -50.0f64..200.0,
            speed in 0.0f64..40.0,
            duration in 0.0f64..5.0,
            traveled in 0.0f64..100.0,
            downstream in any::<bool>(),
        ) {
            let t = triplet(headway, speed, 0.0);
            let (d, x) = (Duration(duration), Length(traveled));
            prop_assert_eq!(
                Anticipation::ConstantAcceleration.anticipate(t, d, x, downstream),
                Anticipation::ConstantSpeed.anticipate(t, d, x, downstream)
            );
        }

        #[test]
        fn stop_clamp_never_reverses(
            speed in 0.0f64..40.0,
            decel in 0.1f64..8.0,
            duration in 0.0f64..30.0,
        ) {
            let t = triplet(0.0, speed, -decel);
            let out = Anticipation::ConstantAcceleration.anticipate(t, Duration(duration), Length::ZERO, true);
            prop_assert!(out.speed.0 >= 0.0);
            prop_assert!(out.headway.0 >= -1e-9);
            prop_assert!(out.headway.0 <= speed * speed / (2.0 * decel) + 1e-9);
        }
    }
}

// ── Overlap geometry & dispatch ───────────────────────────────────────────────

#[cfg(test)]
mod gtu_type {
    use lp_core::{Acceleration, Length, PerceptionError, Speed, Time};

    use super::helpers::gtu;
    use crate::{HeadwayGtuType, HeadwayKind};

    #[test]
    fn wrap_parallel_overlap() {
        let ego = gtu(5.0, 10.0);
        let other = gtu(4.0, 12.0);
        let h = HeadwayGtuType::Wrap
            .create_headway(&ego, &other, Length(-3.0), true, Time(0.0))
            .unwrap();
        assert_eq!(
            h.kind(),
            HeadwayKind::Parallel {
                overlap_front: Length(1.0),
                overlap:       Length(3.0),
                overlap_rear:  Length(2.0),
            }
        );
        assert!(h.is_parallel());
        assert_eq!(h.distance(), None);
        assert_eq!(h.signed_distance(), Length(-3.0));
    }

    #[test]
    fn upstream_parallel_mirrors_downstream() {
        // neighbor front 3 m ahead of the ego rear
        let ego = gtu(5.0, 10.0);
        let other = gtu(4.0, 12.0);
        let h = HeadwayGtuType::Wrap
            .create_headway(&ego, &other, Length(-3.0), false, Time(0.0))
            .unwrap();
        assert_eq!(
            h.kind(),
            HeadwayKind::Parallel {
                overlap_front: Length(-2.0),
                overlap:       Length(3.0),
                overlap_rear:  Length(-1.0),
            }
        );
    }

    #[test]
    fn overlap_beyond_both_lengths_is_inconsistent() {
        let ego = gtu(5.0, 10.0);
        let other = gtu(4.0, 12.0);
        let err = HeadwayGtuType::Wrap
            .create_headway(&ego, &other, Length(-12.0), true, Time(0.0))
            .unwrap_err();
        assert_eq!(
            err,
            PerceptionError::InconsistentGeometry {
                distance:     Length(-12.0),
                ego_length:   Length(5.0),
                other_length: Length(4.0),
            }
        );
    }

    #[test]
    fn full_containment_overlap_is_shorter_length() {
        let ego = gtu(10.0, 0.0);
        let other = gtu(4.0, 0.0);
        let h = HeadwayGtuType::Copy
            .create_headway(&ego, &other, Length(-7.0), true, Time(0.0))
            .unwrap();
        match h.kind() {
            HeadwayKind::Parallel { overlap, .. } => assert_eq!(overlap, Length(4.0)),
            k => panic!("expected parallel, got {k:?}"),
        }
    }

    #[test]
    fn wrap_reads_live_copy_snapshots() {
        let ego = gtu(5.0, 10.0);
        let other = gtu(4.0, 12.0).with_acceleration(Acceleration(0.5));

        let wrapped = HeadwayGtuType::Wrap
            .create_headway(&ego, &other, Length(20.0), true, Time(0.0))
            .unwrap();
        assert!(wrapped.is_live());
        assert_eq!(wrapped.kind(), HeadwayKind::Ahead(Length(20.0)));
        assert_eq!(wrapped.speed(), Speed(12.0));

        let copied = HeadwayGtuType::Copy
            .create_headway(&ego, &other, Length(20.0), false, Time(0.0))
            .unwrap();
        assert!(!copied.is_live());
        assert_eq!(copied.kind(), HeadwayKind::Behind(Length(20.0)));
        assert_eq!(copied.acceleration(), Acceleration(0.5));
    }
}

// ── Perceived headways ────────────────────────────────────────────────────────

#[cfg(test)]
mod perceived {
    use lp_core::{
        Acceleration, Duration, GtuId, GtuRng, LaneId, Length, ParameterType, PerceptionError, Speed, Time,
    };

    use super::helpers::gtu;
    use crate::{
        Anticipation, ErroneousEstimation, Estimation, FactorEstimation, HeadwayGtuType, HeadwayKind,
        NoEstimation,
    };

    /// GTU driving at constant `speed` with history samples every 0.5 s up
    /// to `now`.
    fn driving(length: f64, speed: f64, now: f64) -> lp_network::GtuState {
        let mut g = gtu(length, speed);
        let mut t = 0.0;
        while t <= now {
            g.set_state(Time(t), LaneId(0), Length(0.0), Speed(speed), Acceleration(0.0), Length(speed * t));
            t += 0.5;
        }
        g
    }

    #[test]
    fn no_estimation_recovers_truth_under_constant_speed() {
        let ego = driving(5.0, 10.0, 10.0);
        let leader = driving(4.0, 15.0, 10.0);
        let ty = HeadwayGtuType::perceived(NoEstimation, Anticipation::ConstantSpeed);
        let h = ty.create_headway(&ego, &leader, Length(30.0), true, Time(10.0)).unwrap();
        assert_eq!(h.kind(), HeadwayKind::Ahead(Length(30.0)));
        assert_eq!(h.speed(), Speed(15.0));
    }

    #[test]
    fn without_anticipation_sees_delayed_gap() {
        let ego = driving(5.0, 10.0, 10.0);
        let leader = driving(4.0, 15.0, 10.0);
        let ty = HeadwayGtuType::perceived(NoEstimation, Anticipation::None);
        let h = ty.create_headway(&ego, &leader, Length(30.0), true, Time(10.0)).unwrap();
        // 0.5 s ago the leader was 2.5 m closer
        assert_eq!(h.distance(), Some(Length(27.5)));
    }

    #[test]
    fn cache_reused_within_a_tick() {
        let ego = driving(5.0, 10.0, 10.0);
        let leader = driving(4.0, 10.0, 10.0);
        let ty = HeadwayGtuType::perceived(NoEstimation, Anticipation::ConstantSpeed);
        ty.create_headway(&ego, &leader, Length(30.0), true, Time(10.0)).unwrap();

        // A different odometer in the same tick does not trigger a recompute.
        let mut moved = ego.clone();
        moved.odometer = Length(1_000.0);
        ty.create_headway(&moved, &leader, Length(30.0), true, Time(10.0)).unwrap();
        let HeadwayGtuType::Perceived(p) = &ty else { unreachable!() };
        assert_eq!(p.traveled_distance(), Some(Length(5.0)));
        assert_eq!(p.anticipation_origin(), Some(Time(9.5)));
    }

    #[test]
    fn origin_never_moves_backwards() {
        let mut ego = driving(5.0, 10.0, 10.0);
        let leader = driving(4.0, 10.0, 10.0);
        let ty = HeadwayGtuType::perceived(NoEstimation, Anticipation::ConstantSpeed);
        ty.create_headway(&ego, &leader, Length(30.0), true, Time(10.0)).unwrap();

        ego.parameters.set(ParameterType::ReactionTime, 2.0).unwrap();
        ty.create_headway(&ego, &leader, Length(30.0), true, Time(10.0)).unwrap();
        let HeadwayGtuType::Perceived(p) = &ty else { unreachable!() };
        assert_eq!(p.anticipation_origin(), Some(Time(9.5)));

        ty.create_headway(&ego, &leader, Length(30.0), true, Time(12.0)).unwrap();
        assert_eq!(p.anticipation_origin(), Some(Time(10.0)));
    }

    #[test]
    fn missing_reaction_time_is_reported() {
        let mut ego = driving(5.0, 10.0, 1.0);
        ego.parameters.remove(ParameterType::ReactionTime);
        let leader = driving(4.0, 10.0, 1.0);
        let ty = HeadwayGtuType::perceived(NoEstimation, Anticipation::None);
        assert_eq!(
            ty.create_headway(&ego, &leader, Length(30.0), true, Time(1.0)).unwrap_err(),
            PerceptionError::MissingParameter(ParameterType::ReactionTime)
        );
    }

    #[test]
    fn anticipated_overlap_becomes_parallel() {
        let ego = driving(5.0, 10.0, 10.0);
        // leader pulled away from standstill during the reaction time
        let mut leader = gtu(4.0, 0.0);
        leader.set_state(Time(9.5), LaneId(0), Length(0.0), Speed(0.0), Acceleration(4.0), Length(0.0));
        leader.set_state(Time(10.0), LaneId(0), Length(0.5), Speed(2.0), Acceleration(4.0), Length(0.5));

        // 0.25 m true gap; perceived 0.5 s ago as 0.25 - 0.5 + 5 = 4.75 m,
        // then the ego covers 5 m against a leader assumed at standstill
        let ty = HeadwayGtuType::perceived(NoEstimation, Anticipation::ConstantSpeed);
        let h = ty.create_headway(&ego, &leader, Length(0.25), true, Time(10.0)).unwrap();
        assert_eq!(h.signed_distance(), Length(-0.25));
        assert_eq!(
            h.kind(),
            HeadwayKind::Parallel {
                overlap_front: Length(3.75),
                overlap:       Length(0.25),
                overlap_rear:  Length(4.75),
            }
        );
        assert_eq!(h.speed(), Speed(0.0));
    }

    #[test]
    fn anticipated_pass_through_clamps_to_zero_overlap() {
        let mut ego = driving(5.0, 10.0, 10.0);
        ego.parameters.set(ParameterType::ReactionTime, 3.0).unwrap();
        let mut leader = gtu(4.0, 0.0);
        leader.set_state(Time(7.0), LaneId(0), Length(0.0), Speed(0.0), Acceleration(4.0), Length(0.0));
        leader.set_state(Time(10.0), LaneId(0), Length(18.0), Speed(12.0), Acceleration(4.0), Length(18.0));

        // estimated 1 - 18 + 30 = 13 m, anticipated 13 - 30 = -17 m
        let ty = HeadwayGtuType::perceived(NoEstimation, Anticipation::ConstantSpeed);
        let h = ty.create_headway(&ego, &leader, Length(1.0), true, Time(10.0)).unwrap();
        assert_eq!(h.signed_distance(), Length(-9.0));
        assert_eq!(
            h.kind(),
            HeadwayKind::Parallel {
                overlap_front: Length(-5.0),
                overlap:       Length(0.0),
                overlap_rear:  Length(-4.0),
            }
        );
    }

    #[test]
    fn factor_scales_headway_and_relative_speed() {
        let mut ego = driving(5.0, 10.0, 10.0);
        ego.parameters.set(ParameterType::EstimationFactor, 2.0).unwrap();
        let leader = driving(4.0, 14.0, 10.0);

        let over = FactorEstimation::OVER
            .estimate(&ego, &leader, Length(30.0), true, Time(10.0), Time(9.5))
            .unwrap();
        // truth at origin: 30 - 7 + 5 = 28 m, relative speed 4 m/s
        assert_eq!(over.headway, Length(56.0));
        assert_eq!(over.speed, Speed(18.0));

        let under = FactorEstimation::UNDER
            .estimate(&ego, &leader, Length(30.0), true, Time(10.0), Time(9.5))
            .unwrap();
        assert_eq!(under.headway, Length(14.0));
        assert_eq!(under.speed, Speed(12.0));
    }

    #[test]
    fn zero_factor_is_invalid() {
        let mut ego = driving(5.0, 10.0, 1.0);
        ego.parameters.set(ParameterType::EstimationFactor, 0.0).unwrap();
        let leader = driving(4.0, 10.0, 1.0);
        assert!(matches!(
            FactorEstimation::UNDER.estimate(&ego, &leader, Length(30.0), true, Time(1.0), Time(0.5)),
            Err(PerceptionError::InvalidArgument(_))
        ));
    }

    #[test]
    fn erroneous_with_zero_scales_is_truth() {
        let ego = driving(5.0, 10.0, 10.0);
        let leader = driving(4.0, 14.0, 10.0);
        let est = ErroneousEstimation::new(1, ego.id);
        let truth = NoEstimation.estimate(&ego, &leader, Length(30.0), true, Time(10.0), Time(9.5)).unwrap();
        let noisy = est.estimate(&ego, &leader, Length(30.0), true, Time(10.0), Time(9.5)).unwrap();
        assert_eq!(noisy, truth);
    }

    #[test]
    fn erroneous_error_is_stable_within_a_tick_and_reproducible() {
        let mut ego = driving(5.0, 10.0, 10.0);
        ego.parameters.set(ParameterType::DistanceError, 0.1).unwrap();
        ego.parameters.set(ParameterType::SpeedError, 0.01).unwrap();
        let leader = driving(4.0, 14.0, 10.0);

        let a = ErroneousEstimation::new(9, ego.id);
        let first = a.estimate(&ego, &leader, Length(30.0), true, Time(10.0), Time(9.5)).unwrap();
        let again = a.estimate(&ego, &leader, Length(30.0), true, Time(10.0), Time(9.5)).unwrap();
        assert_eq!(first, again);

        let b = ErroneousEstimation::new(9, ego.id);
        let replay = b.estimate(&ego, &leader, Length(30.0), true, Time(10.0), Time(9.5)).unwrap();
        assert_eq!(first, replay);
        assert!(first.speed.0 >= 0.0);
        assert_ne!(first.headway, Length(28.0));
    }

    #[test]
    fn erroneous_drops_neighbors_unseen_for_a_step() {
        let ego = driving(5.0, 10.0, 10.0);
        let mut a = driving(4.0, 14.0, 10.0);
        a.id = GtuId(1);
        let mut b = driving(4.0, 14.0, 10.0);
        b.id = GtuId(2);
        let est = ErroneousEstimation::new(3, ego.id);

        for other in [&a, &b] {
            est.estimate(&ego, other, Length(30.0), true, Time(10.0), Time(9.5)).unwrap();
        }
        assert_eq!(est.tracked(), 2);

        // b last seen one time step ago: kept
        est.estimate(&ego, &a, Length(30.0), true, Time(10.5), Time(10.0)).unwrap();
        assert_eq!(est.tracked(), 2);

        est.estimate(&ego, &a, Length(30.0), true, Time(11.0), Time(10.5)).unwrap();
        assert_eq!(est.tracked(), 1);
    }

    #[test]
    fn erroneous_parallel_speed_scales_with_overlap() {
        let mut ego = driving(4.0, 20.0, 10.0);
        ego.parameters.set(ParameterType::SpeedError, 1.0).unwrap();
        let other = driving(4.0, 20.0, 10.0);
        let ty = HeadwayGtuType::perceived(ErroneousEstimation::new(5, ego.id), Anticipation::None);
        let h = ty.create_headway(&ego, &other, Length(-2.0), false, Time(10.0)).unwrap();

        let e = GtuRng::new(5, ego.id).standard_normal();
        assert_eq!(h.signed_distance(), Length(-2.0));
        assert!(matches!(h.kind(), HeadwayKind::Parallel { .. }));
        assert_eq!(h.speed(), Speed(20.0 + e * 1.0 * -2.0).max(Speed::ZERO));
    }

    #[test]
    fn reaction_time_parameter_drives_duration() {
        let mut ego = driving(5.0, 10.0, 10.0);
        ego.parameters.set(ParameterType::ReactionTime, 1.0).unwrap();
        assert_eq!(ego.parameters.reaction_time().unwrap(), Duration(1.0));
        let leader = driving(4.0, 10.0, 10.0);
        let ty = HeadwayGtuType::perceived(NoEstimation, Anticipation::None);
        let h = ty.create_headway(&ego, &leader, Length(30.0), true, Time(10.0)).unwrap();
        // equal speeds: the gap 1 s ago was the same
        assert_eq!(h.distance(), Some(Length(30.0)));
    }
}

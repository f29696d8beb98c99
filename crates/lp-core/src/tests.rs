//! Unit tests for lp-core primitives.

#[cfg(test)]
mod ids {
    use crate::{GtuId, LaneId, RecordId};

    #[test]
    fn index_roundtrip() {
        let id = GtuId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(GtuId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(GtuId::INVALID.0, u32::MAX);
        assert_eq!(LaneId::INVALID.0, u32::MAX);
        assert_eq!(RecordId::default(), RecordId::INVALID);
        assert!(!LaneId::default().is_valid());
        assert!(LaneId(0).is_valid());
    }

    #[test]
    fn display() {
        assert_eq!(LaneId(7).to_string(), "lane 7");
        assert_eq!(GtuId::INVALID.to_string(), "gtu <invalid>");
    }
}

#[cfg(test)]
mod units {
    use crate::{Acceleration, Duration, Length, Speed, Time};

    #[test]
    fn kinematic_products() {
        assert_eq!(Speed(10.0) * Duration(2.0), Length(20.0));
        assert_eq!(Acceleration(-2.0) * Duration(3.0), Speed(-6.0));
        assert_eq!(Length(20.0) / Duration(4.0), Speed(5.0));
        assert_eq!(Length(9.0) / Length(3.0), 3.0);
    }

    #[test]
    fn time_arithmetic() {
        let t = Time(10.0);
        assert_eq!(t - Time(4.0), Duration(6.0));
        assert_eq!(t - Duration(0.5), Time(9.5));
        assert_eq!(t + Duration(0.5), Time(10.5));
        assert_eq!(Time(3.0).max(Time(2.0)), Time(3.0));
    }

    #[test]
    fn sign_helpers() {
        assert!(Length(-0.1).lt0());
        assert!(Length::ZERO.le0());
        assert!(!Length(0.1).le0());
        assert_eq!(Length(-3.0).abs(), Length(3.0));
    }
}

#[cfg(test)]
mod relative_lane {
    use proptest::prelude::*;

    use crate::{LateralDirection, PerceptionError, RelativeLane};

    #[test]
    fn new_validates_direction_and_count() {
        assert_eq!(RelativeLane::new(LateralDirection::Left, 1).unwrap(), RelativeLane::LEFT);
        assert_eq!(RelativeLane::new(LateralDirection::None, 0).unwrap(), RelativeLane::CURRENT);
        assert!(matches!(
            RelativeLane::new(LateralDirection::None, 1),
            Err(PerceptionError::InvalidArgument(_))
        ));
        assert!(matches!(
            RelativeLane::new(LateralDirection::Right, -1),
            Err(PerceptionError::InvalidArgument(_))
        ));
        assert!(matches!(
            RelativeLane::new(LateralDirection::Left, 0),
            Err(PerceptionError::InvalidArgument(_))
        ));
    }

    #[test]
    fn rank_sign_follows_direction() {
        assert_eq!(RelativeLane::SECOND_LEFT.rank(), -2);
        assert_eq!(RelativeLane::CURRENT.rank(), 0);
        assert_eq!(RelativeLane::RIGHT.rank(), 1);
    }

    #[test]
    fn left_of_second_right_is_right() {
        assert_eq!(RelativeLane::SECOND_RIGHT.left(), RelativeLane::RIGHT);
        assert_eq!(RelativeLane::LEFT + RelativeLane::SECOND_RIGHT, RelativeLane::RIGHT);
    }

    #[test]
    fn zero_sum_is_canonical_current() {
        let sum = RelativeLane::LEFT.add(RelativeLane::RIGHT);
        assert!(sum.is_current());
        assert_eq!(sum.lateral_direction(), LateralDirection::None);
        assert_eq!(sum.num_lanes(), 0);
    }

    #[test]
    fn sorted_far_left_to_far_right() {
        let mut lanes = vec![
            RelativeLane::RIGHT,
            RelativeLane::CURRENT,
            RelativeLane::SECOND_LEFT,
            RelativeLane::SECOND_RIGHT,
            RelativeLane::LEFT,
        ];
        lanes.sort();
        let ranks: Vec<i32> = lanes.iter().map(|l| l.rank()).collect();
        assert_eq!(ranks, vec![-2, -1, 0, 1, 2]);
    }

    #[test]
    fn display() {
        assert_eq!(RelativeLane::CURRENT.to_string(), "CURRENT");
        assert_eq!(RelativeLane::LEFT.to_string(), "LEFT");
        assert_eq!(RelativeLane::SECOND_RIGHT.to_string(), "RIGHT[2]");
    }

    proptest! {
        #[test]
        fn from_rank_roundtrips(r in -50i32..50) {
            prop_assert_eq!(RelativeLane::from_rank(r).rank(), r);
        }

        #[test]
        fn new_roundtrips_through_rank(n in 1i32..50, left in any::<bool>()) {
            let lat = if left { LateralDirection::Left } else { LateralDirection::Right };
            let lane = RelativeLane::new(lat, n).unwrap();
            prop_assert_eq!(RelativeLane::from_rank(lane.rank()), lane);
            prop_assert_eq!(lane.num_lanes() as i32, n);
        }

        #[test]
        fn add_is_associative(a in -20i32..20, b in -20i32..20, c in -20i32..20) {
            let (a, b, c) = (RelativeLane::from_rank(a), RelativeLane::from_rank(b), RelativeLane::from_rank(c));
            prop_assert_eq!(a.add(b).add(c), a.add(b.add(c)));
        }

        #[test]
        fn current_is_identity(a in -20i32..20) {
            let a = RelativeLane::from_rank(a);
            prop_assert_eq!(a.add(RelativeLane::CURRENT), a);
            prop_assert_eq!(RelativeLane::CURRENT.add(a), a);
        }
    }
}

#[cfg(test)]
mod params {
    use crate::{Duration, Length, ParameterType, Parameters, PerceptionError};

    #[test]
    fn defaults_cover_perception_parameters() {
        let p = Parameters::with_defaults();
        assert_eq!(p.look_ahead().unwrap(), Length(295.0));
        assert_eq!(p.look_back().unwrap(), Length(200.0));
        assert_eq!(p.reaction_time().unwrap(), Duration(0.5));
        assert_eq!(p.estimation_factor().unwrap(), 1.0);
    }

    #[test]
    fn missing_parameter_is_reported_by_type() {
        let p = Parameters::new();
        assert_eq!(
            p.look_ahead(),
            Err(PerceptionError::MissingParameter(ParameterType::LookAhead))
        );
    }

    #[test]
    fn set_rejects_negative_range() {
        let mut p = Parameters::new();
        assert!(p.set(ParameterType::LookBack, -1.0).is_err());
        assert!(p.set(ParameterType::LookBack, f64::NAN).is_err());
        // error scales may be signed
        assert!(p.set(ParameterType::SpeedError, -0.1).is_ok());
    }

    #[test]
    fn remove_then_get_fails() {
        let mut p = Parameters::with_defaults();
        assert_eq!(p.remove(ParameterType::ReactionTime), Some(0.5));
        assert!(!p.contains(ParameterType::ReactionTime));
        assert!(p.reaction_time().is_err());
    }
}

#[cfg(test)]
mod rng {
    use crate::{GtuId, GtuRng};

    #[test]
    fn same_seed_same_sequence() {
        let mut a = GtuRng::new(42, GtuId(3));
        let mut b = GtuRng::new(42, GtuId(3));
        for _ in 0..10 {
            assert_eq!(a.standard_normal(), b.standard_normal());
        }
    }

    #[test]
    fn different_gtus_diverge() {
        let mut a = GtuRng::new(42, GtuId(0));
        let mut b = GtuRng::new(42, GtuId(1));
        assert_ne!(a.uniform(), b.uniform());
    }

    #[test]
    fn normal_draws_are_finite_and_centered() {
        let mut rng = GtuRng::new(7, GtuId(0));
        let n = 20_000;
        let mean: f64 = (0..n).map(|_| rng.standard_normal()).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.05, "mean {mean}");
    }
}

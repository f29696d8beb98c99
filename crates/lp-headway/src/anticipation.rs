//! Forward projection of a neighbor across a reaction delay.
//!
//! A perceiving driver sees the world as it was `reaction_time` ago.
//! Anticipation moves that old picture forward to the present: the neighbor
//! by its own kinematics, the ego by the distance it has actually traveled.
//!
//! ```text
//! downstream neighbor:  headway' = headway + dx - traveled
//! upstream neighbor:    headway' = headway - dx + traveled
//! ```
//!
//! where `dx` is the neighbor's projected displacement.

use lp_core::{Acceleration, Duration, Length, NeighborTriplet, Speed};

/// Projection strategy.  Stateless, so one value can serve any number of
/// GTUs.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Anticipation {
    /// Use the perceived state as is.
    #[default]
    None,
    /// Neighbor keeps its speed.
    ConstantSpeed,
    /// Neighbor keeps its acceleration until it stands still.
    ConstantAcceleration,
}

impl Anticipation {
    /// Project `neighbor` forward by `duration`, during which the ego drove
    /// `traveled`.
    pub fn anticipate(
        self,
        neighbor: NeighborTriplet,
        duration: Duration,
        traveled: Length,
        downstream: bool,
    ) -> NeighborTriplet {
        let (dx, speed, acceleration) = match self {
            Anticipation::None => return neighbor,
            Anticipation::ConstantSpeed => {
                (neighbor.speed * duration, neighbor.speed, neighbor.acceleration)
            }
            Anticipation::ConstantAcceleration => {
                constant_acceleration(neighbor.speed, neighbor.acceleration, duration)
            }
        };
        let headway = if downstream {
            neighbor.headway + dx - traveled
        } else {
            neighbor.headway - dx + traveled
        };
        NeighborTriplet::new(headway, speed, acceleration)
    }

    /// Distance the ego is assumed to cover in `duration`.
    ///
    /// Both projecting variants use `speed * duration`; acceleration only
    /// enters the neighbor projection.
    pub fn ego_anticipation(self, speed: Speed, _acceleration: Acceleration, duration: Duration) -> Length {
        match self {
            Anticipation::None => Length::ZERO,
            Anticipation::ConstantSpeed | Anticipation::ConstantAcceleration => speed * duration,
        }
    }
}

/// Displacement, speed and acceleration after `duration` under constant
/// acceleration, halting at zero speed.
fn constant_acceleration(
    speed: Speed,
    acceleration: Acceleration,
    duration: Duration,
) -> (Length, Speed, Acceleration) {
    let (v, a, d) = (speed.0, acceleration.0, duration.0);
    if v < -a * d {
        let t = v / -a;
        return (Length(v * t + 0.5 * a * t * t), Speed::ZERO, Acceleration::ZERO);
    }
    (Length(v * d + 0.5 * a * d * d), Speed(v + a * d), acceleration)
}

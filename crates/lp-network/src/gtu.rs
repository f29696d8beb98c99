//! Kinematic state of one GTU.
//!
//! Positions are measured along the lane's design line to the GTU's
//! *reference point*.  The front and rear are fixed offsets from that point in
//! the direction of travel, so `front ≥ 0 ≥ rear` and `length = front − rear`.
//!
//! Every state update appends a sample to a bounded [`KinematicsHistory`],
//! which perception queries for the state at `now − reaction_time`.

use std::collections::VecDeque;

use lp_core::{Acceleration, GtuId, LaneId, Length, Parameters, Speed, Time};

/// Samples kept per GTU unless configured otherwise.
pub const DEFAULT_HISTORY_CAPACITY: usize = 128;

// ── RelativePosition ──────────────────────────────────────────────────────────

/// A named point on a GTU.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RelativePosition {
    Front,
    Reference,
    Rear,
}

// ── KinematicsHistory ─────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Debug)]
struct Sample {
    time:         Time,
    odometer:     Length,
    speed:        Speed,
    acceleration: Acceleration,
}

impl Sample {
    /// Constant-acceleration extrapolation by `dt`, holding at standstill
    /// once a decelerating GTU reaches zero speed.
    fn extrapolate(&self, time: Time) -> (Length, Speed, Acceleration) {
        let dt = (time - self.time).0.max(0.0);
        let (v, a) = (self.speed.0, self.acceleration.0);
        if a < 0.0 && v + a * dt < 0.0 {
            let t_stop = v / -a;
            let dx = v * t_stop + 0.5 * a * t_stop * t_stop;
            return (self.odometer + Length(dx), Speed::ZERO, Acceleration::ZERO);
        }
        (
            self.odometer + Length(v * dt + 0.5 * a * dt * dt),
            Speed(v + a * dt),
            self.acceleration,
        )
    }
}

/// Ring of past `(time, odometer, speed, acceleration)` samples in time
/// order.  Queries between samples extrapolate from the latest sample at or
/// before the query time; queries before the first sample clamp to it.
#[derive(Clone, Debug)]
pub struct KinematicsHistory {
    samples:  VecDeque<Sample>,
    capacity: usize,
}

impl KinematicsHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { samples: VecDeque::with_capacity(capacity), capacity: capacity.max(1) }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append a sample.  A sample at the same time as the latest one
    /// replaces it; the oldest sample is dropped when full.
    pub fn push(&mut self, time: Time, odometer: Length, speed: Speed, acceleration: Acceleration) {
        let sample = Sample { time, odometer, speed, acceleration };
        if let Some(last) = self.samples.back_mut() {
            if last.time == time {
                *last = sample;
                return;
            }
            debug_assert!(last.time < time, "history samples must be added in time order");
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    fn state_at(&self, time: Time) -> Option<(Length, Speed, Acceleration)> {
        let first = self.samples.front()?;
        if time <= first.time {
            return Some((first.odometer, first.speed, first.acceleration));
        }
        // Latest sample with sample.time <= time.
        let idx = self.samples.partition_point(|s| s.time <= time) - 1;
        Some(self.samples[idx].extrapolate(time))
    }
}

impl Default for KinematicsHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

// ── GtuState ──────────────────────────────────────────────────────────────────

/// Current and historic kinematic state of one GTU.
#[derive(Clone, Debug)]
pub struct GtuState {
    /// Assigned by [`GtuStore::add`](crate::GtuStore::add).
    pub id: GtuId,
    /// Offset of the front from the reference point (≥ 0).
    pub front: Length,
    /// Offset of the rear from the reference point (≤ 0).
    pub rear: Length,
    /// Lane holding the reference point.
    pub lane: LaneId,
    /// Reference point along the lane's design line.
    pub position: Length,
    pub speed: Speed,
    pub acceleration: Acceleration,
    /// Total distance driven.
    pub odometer: Length,
    pub parameters: Parameters,
    history: KinematicsHistory,
}

impl GtuState {
    /// A stationary GTU of `length` with its reference point at the middle
    /// and default parameters.
    pub fn new(length: Length, lane: LaneId, position: Length) -> Self {
        Self {
            id: GtuId::INVALID,
            front: length * 0.5,
            rear: -(length * 0.5),
            lane,
            position,
            speed: Speed::ZERO,
            acceleration: Acceleration::ZERO,
            odometer: Length::ZERO,
            parameters: Parameters::with_defaults(),
            history: KinematicsHistory::default(),
        }
    }

    /// Place the reference point `front` behind the front and `-rear` ahead
    /// of the rear.
    pub fn with_offsets(mut self, front: Length, rear: Length) -> Self {
        debug_assert!(front.0 >= 0.0 && rear.0 <= 0.0);
        self.front = front;
        self.rear = rear;
        self
    }

    pub fn with_speed(mut self, speed: Speed) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_acceleration(mut self, acceleration: Acceleration) -> Self {
        self.acceleration = acceleration;
        self
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history = KinematicsHistory::with_capacity(capacity);
        self
    }

    #[inline]
    pub fn length(&self) -> Length {
        self.front - self.rear
    }

    /// Offset of `pos` from the reference point.
    #[inline]
    pub fn offset(&self, pos: RelativePosition) -> Length {
        match pos {
            RelativePosition::Front     => self.front,
            RelativePosition::Reference => Length::ZERO,
            RelativePosition::Rear      => self.rear,
        }
    }

    /// Record the state at `time` and make it current.
    pub fn set_state(
        &mut self,
        time: Time,
        lane: LaneId,
        position: Length,
        speed: Speed,
        acceleration: Acceleration,
        odometer: Length,
    ) {
        self.lane = lane;
        self.position = position;
        self.speed = speed;
        self.acceleration = acceleration;
        self.odometer = odometer;
        self.history.push(time, odometer, speed, acceleration);
    }

    /// Record the current state as a history sample at `time`.
    pub fn snapshot(&mut self, time: Time) {
        self.history.push(time, self.odometer, self.speed, self.acceleration);
    }

    pub fn history(&self) -> &KinematicsHistory {
        &self.history
    }

    /// Odometer at `time`; the current value when no history is recorded.
    pub fn odometer_at(&self, time: Time) -> Length {
        self.history.state_at(time).map_or(self.odometer, |(x, _, _)| x)
    }

    pub fn speed_at(&self, time: Time) -> Speed {
        self.history.state_at(time).map_or(self.speed, |(_, v, _)| v)
    }

    pub fn acceleration_at(&self, time: Time) -> Acceleration {
        self.history.state_at(time).map_or(self.acceleration, |(_, _, a)| a)
    }
}

//! Estimation: what the perceiving driver believes a neighbor's state was
//! at the anticipation origin (`now - reaction_time`).
//!
//! Estimations are owned by one perceiving GTU's headway type.  Stateful
//! implementations keep their state behind interior mutability so that
//! [`Estimation::estimate`] can take `&self` while a tick's headways are
//! being created.

use std::cell::{Cell, RefCell};

use tracing::trace;

use lp_core::{
    CacheMap, GtuId, GtuRng, Length, NeighborTriplet, ParameterType, PerceptionError,
    PerceptionResult, Speed, Time,
};
use lp_network::GtuState;

/// Maps the true state of a neighbor to a perceived state at `origin`.
pub trait Estimation {
    /// Perceived `(headway, speed, acceleration)` of `perceived` at `origin`.
    ///
    /// `distance` is the true headway at `now`, measured downstream from the
    /// ego (`downstream == true`) or upstream of it.
    fn estimate(
        &self,
        perceiving: &GtuState,
        perceived: &GtuState,
        distance: Length,
        downstream: bool,
        now: Time,
        origin: Time,
    ) -> PerceptionResult<NeighborTriplet>;
}

// ── NoEstimation ──────────────────────────────────────────────────────────────

/// The true historic state at `origin`.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoEstimation;

impl Estimation for NoEstimation {
    fn estimate(
        &self,
        perceiving: &GtuState,
        perceived: &GtuState,
        distance: Length,
        downstream: bool,
        _now: Time,
        origin: Time,
    ) -> PerceptionResult<NeighborTriplet> {
        // Both GTUs moved since origin; undo their displacement.
        let ego_delta = perceiving.odometer - perceiving.odometer_at(origin);
        let other_delta = perceived.odometer - perceived.odometer_at(origin);
        let headway = if downstream {
            distance - other_delta + ego_delta
        } else {
            distance - ego_delta + other_delta
        };
        Ok(NeighborTriplet::new(
            headway,
            perceived.speed_at(origin),
            perceived.acceleration_at(origin),
        ))
    }
}

// ── FactorEstimation ──────────────────────────────────────────────────────────

/// Systematic over- or underestimation of headway and relative speed by the
/// perceiving GTU's [`ParameterType::EstimationFactor`].
#[derive(Copy, Clone, Debug)]
pub struct FactorEstimation {
    pub over: bool,
}

impl FactorEstimation {
    pub const OVER: FactorEstimation = FactorEstimation { over: true };
    pub const UNDER: FactorEstimation = FactorEstimation { over: false };
}

impl Estimation for FactorEstimation {
    fn estimate(
        &self,
        perceiving: &GtuState,
        perceived: &GtuState,
        distance: Length,
        downstream: bool,
        now: Time,
        origin: Time,
    ) -> PerceptionResult<NeighborTriplet> {
        let factor = perceiving.parameters.estimation_factor()?;
        if factor <= 0.0 {
            return Err(PerceptionError::InvalidArgument(format!(
                "{} must be positive, got {factor}",
                ParameterType::EstimationFactor
            )));
        }
        let factor = if self.over { factor } else { 1.0 / factor };

        let truth = NoEstimation.estimate(perceiving, perceived, distance, downstream, now, origin)?;
        let ego_speed = perceiving.speed_at(origin);
        let speed = ego_speed + (truth.speed - ego_speed) * factor;
        Ok(NeighborTriplet::new(truth.headway * factor, speed, truth.acceleration))
    }
}

// ── ErroneousEstimation ───────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug)]
struct ErrorState {
    value: f64,
    time:  Time,
}

/// Random perception errors that drift over time.
///
/// Each neighbor carries a standard-normal error `e` that evolves as an
/// Ornstein–Uhlenbeck process with correlation time `τ`
/// ([`ParameterType::ErrorCorrelationTime`]):
///
/// ```text
/// e(t + Δt) = exp(-Δt/τ)·e(t) + sqrt(1 - exp(-2Δt/τ))·N(0, 1)
/// ```
///
/// A neighbor not seen for longer than [`ParameterType::TimeStep`] gets a
/// fresh draw, and its error is dropped the first time a later `now` is
/// estimated.  The error then distorts the true historic state:
///
/// ```text
/// headway      = s·(1 + e·distance_error)
/// speed        = max(0, v + e·speed_error·s)
/// acceleration = a·(1 + e·acceleration_error)
/// ```
pub struct ErroneousEstimation {
    rng:    RefCell<GtuRng>,
    errors: RefCell<CacheMap<GtuId, ErrorState>>,
    swept:  Cell<Option<Time>>,
}

impl ErroneousEstimation {
    /// Errors for the perceiving GTU `ego`, reproducible from `global_seed`.
    pub fn new(global_seed: u64, ego: GtuId) -> Self {
        Self {
            rng:    RefCell::new(GtuRng::new(global_seed, ego)),
            errors: RefCell::new(CacheMap::default()),
            swept:  Cell::new(None),
        }
    }

    /// Number of neighbors with a live error state.
    pub fn tracked(&self) -> usize {
        self.errors.borrow().len()
    }

    /// Current error of `neighbor`, advanced to `now`.
    fn error(&self, neighbor: GtuId, now: Time, tau: f64, step: f64) -> f64 {
        let mut rng = self.rng.borrow_mut();
        let mut errors = self.errors.borrow_mut();
        if self.swept.get() != Some(now) {
            let before = errors.len();
            errors.retain(|_, e| (now - e.time).0 <= step);
            self.swept.set(Some(now));
            if errors.len() < before {
                trace!(%now, dropped = before - errors.len(), "stale perception errors dropped");
            }
        }
        let value = match errors.get(&neighbor) {
            Some(prev) if (now - prev.time).0 <= step => {
                let dt = (now - prev.time).0;
                if dt <= 0.0 || tau <= 0.0 {
                    prev.value
                } else {
                    let decay = (-dt / tau).exp();
                    decay * prev.value + (1.0 - decay * decay).sqrt() * rng.standard_normal()
                }
            }
            _ => rng.standard_normal(),
        };
        errors.insert(neighbor, ErrorState { value, time: now });
        value
    }
}

impl Estimation for ErroneousEstimation {
    fn estimate(
        &self,
        perceiving: &GtuState,
        perceived: &GtuState,
        distance: Length,
        downstream: bool,
        now: Time,
        origin: Time,
    ) -> PerceptionResult<NeighborTriplet> {
        let p = &perceiving.parameters;
        let tau = p.get(ParameterType::ErrorCorrelationTime)?;
        let step = p.time_step()?.0;
        let distance_error = p.get(ParameterType::DistanceError)?;
        let speed_error = p.get(ParameterType::SpeedError)?;
        let acceleration_error = p.get(ParameterType::AccelerationError)?;

        let truth = NoEstimation.estimate(perceiving, perceived, distance, downstream, now, origin)?;
        let e = self.error(perceived.id, now, tau, step);
        trace!(ego = %perceiving.id, neighbor = %perceived.id, error = e, "perception error");

        let headway = truth.headway * (1.0 + e * distance_error);
        let speed = Speed(truth.speed.0 + e * speed_error * truth.headway.0).max(Speed::ZERO);
        let acceleration = truth.acceleration * (1.0 + e * acceleration_error);
        Ok(NeighborTriplet::new(headway, speed, acceleration))
    }
}

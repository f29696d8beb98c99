//! Per-GTU behavioral parameters.
//!
//! Each GTU carries a [`Parameters`] map.  Perception reads look-ahead,
//! look-back and reaction time from it; estimation reads the estimation factor
//! and perception-error settings.  Absent values surface as
//! [`PerceptionError::MissingParameter`] at the call boundary, before any
//! traversal begins.
//!
//! Applications typically deserialize a `Parameters` per vehicle class from a
//! config file (enable the `serde` feature) and clone it onto each GTU.

use std::collections::BTreeMap;
use std::fmt;

use crate::{Duration, Length, PerceptionError, PerceptionResult};

// ── ParameterType ─────────────────────────────────────────────────────────────

/// Key into a [`Parameters`] map.  All values are stored in SI units.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ParameterType {
    /// Downstream search range for leaders [m].
    LookAhead,
    /// Upstream search range for followers [m].
    LookBack,
    /// Delay between the true state and the perceived state [s].
    ReactionTime,
    /// Multiplier applied by factor estimation [-].
    EstimationFactor,
    /// Correlation time of the perception-error Wiener process [s].
    ErrorCorrelationTime,
    /// Relative distance error scale [-].
    DistanceError,
    /// Speed error scale per metre of distance [1/s].
    SpeedError,
    /// Relative acceleration error scale [-].
    AccelerationError,
    /// Model time step [s].
    TimeStep,
}

impl ParameterType {
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterType::LookAhead            => "look_ahead",
            ParameterType::LookBack             => "look_back",
            ParameterType::ReactionTime         => "reaction_time",
            ParameterType::EstimationFactor     => "estimation_factor",
            ParameterType::ErrorCorrelationTime => "error_correlation_time",
            ParameterType::DistanceError        => "distance_error",
            ParameterType::SpeedError           => "speed_error",
            ParameterType::AccelerationError    => "acceleration_error",
            ParameterType::TimeStep             => "time_step",
        }
    }

    /// Default value used by [`Parameters::with_defaults`].
    pub fn default_value(self) -> f64 {
        match self {
            ParameterType::LookAhead            => 295.0,
            ParameterType::LookBack             => 200.0,
            ParameterType::ReactionTime         => 0.5,
            ParameterType::EstimationFactor     => 1.0,
            ParameterType::ErrorCorrelationTime => 20.0,
            ParameterType::DistanceError        => 0.0,
            ParameterType::SpeedError           => 0.0,
            ParameterType::AccelerationError    => 0.0,
            ParameterType::TimeStep             => 0.5,
        }
    }

    /// All parameter types, in declaration order.
    pub const ALL: [ParameterType; 9] = [
        ParameterType::LookAhead,
        ParameterType::LookBack,
        ParameterType::ReactionTime,
        ParameterType::EstimationFactor,
        ParameterType::ErrorCorrelationTime,
        ParameterType::DistanceError,
        ParameterType::SpeedError,
        ParameterType::AccelerationError,
        ParameterType::TimeStep,
    ];

    /// Whether negative values are meaningless for this parameter.
    fn non_negative(self) -> bool {
        !matches!(
            self,
            ParameterType::DistanceError | ParameterType::SpeedError | ParameterType::AccelerationError
        )
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Parameters ────────────────────────────────────────────────────────────────

/// A typed parameter map.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Parameters {
    values: BTreeMap<ParameterType, f64>,
}

impl Parameters {
    /// An empty map; every typed getter fails until values are set.
    pub fn new() -> Self {
        Self::default()
    }

    /// A map holding the default value of every [`ParameterType`].
    pub fn with_defaults() -> Self {
        let values = ParameterType::ALL
            .iter()
            .map(|&ty| (ty, ty.default_value()))
            .collect();
        Self { values }
    }

    /// Set `ty` to `value`.
    ///
    /// Fails with [`PerceptionError::InvalidArgument`] for non-finite values
    /// and for negative ranges, times and factors.
    pub fn set(&mut self, ty: ParameterType, value: f64) -> PerceptionResult<()> {
        if !value.is_finite() || (ty.non_negative() && value < 0.0) {
            return Err(PerceptionError::InvalidArgument(format!(
                "parameter `{ty}` may not be {value}"
            )));
        }
        self.values.insert(ty, value);
        Ok(())
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, ty: ParameterType, value: f64) -> PerceptionResult<Self> {
        self.set(ty, value)?;
        Ok(self)
    }

    /// Remove `ty`, returning its previous value.
    pub fn remove(&mut self, ty: ParameterType) -> Option<f64> {
        self.values.remove(&ty)
    }

    pub fn contains(&self, ty: ParameterType) -> bool {
        self.values.contains_key(&ty)
    }

    /// Raw SI value of `ty`.
    pub fn get(&self, ty: ParameterType) -> PerceptionResult<f64> {
        self.values
            .get(&ty)
            .copied()
            .ok_or(PerceptionError::MissingParameter(ty))
    }

    // ── Typed getters ─────────────────────────────────────────────────────

    pub fn look_ahead(&self) -> PerceptionResult<Length> {
        self.get(ParameterType::LookAhead).map(Length)
    }

    pub fn look_back(&self) -> PerceptionResult<Length> {
        self.get(ParameterType::LookBack).map(Length)
    }

    pub fn reaction_time(&self) -> PerceptionResult<Duration> {
        self.get(ParameterType::ReactionTime).map(Duration)
    }

    pub fn estimation_factor(&self) -> PerceptionResult<f64> {
        self.get(ParameterType::EstimationFactor)
    }

    pub fn time_step(&self) -> PerceptionResult<Duration> {
        self.get(ParameterType::TimeStep).map(Duration)
    }
}

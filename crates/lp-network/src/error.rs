//! Lane-network error type.

use thiserror::Error;

use lp_core::{GtuId, LaneId, Length, PerceptionError, RecordId, RelativeLane};

/// Errors produced by `lp-network`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    #[error("lane {0} not found in network")]
    LaneNotFound(LaneId),

    #[error("GTU {0} not found in store")]
    GtuNotFound(GtuId),

    #[error("lane {lane} has invalid length {length}")]
    InvalidLaneLength { lane: LaneId, length: Length },

    #[error("no record for relative lane {0} in the lane structure")]
    NoRecord(RelativeLane),

    #[error("record {0} not found in the lane structure")]
    RecordNotFound(RecordId),

    #[error("GTU {gtu} at {position} lies outside lane {lane} of length {length}")]
    PositionOutOfRange {
        gtu:      GtuId,
        lane:     LaneId,
        position: Length,
        length:   Length,
    },
}

pub type NetworkResult<T> = Result<T, NetworkError>;

/// Topology failures surface to perception callers as
/// [`PerceptionError::NetworkInconsistency`].
impl From<NetworkError> for PerceptionError {
    fn from(e: NetworkError) -> Self {
        PerceptionError::NetworkInconsistency(e.to_string())
    }
}

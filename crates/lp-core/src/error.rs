//! Perception error taxonomy.
//!
//! Sub-crates may define their own error enums and convert them into
//! `PerceptionError` via `From` impls (see `lp_network::NetworkError`).

use thiserror::Error;

use crate::{Length, ParameterType};

/// The error type shared by every `lp-*` crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PerceptionError {
    /// Malformed relative lane, lateral direction `None`, or a direction
    /// without an adjacent lane.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A required parameter is absent from the GTU's parameter set.
    #[error("missing parameter `{0}`")]
    MissingParameter(ParameterType),

    /// A negative headway whose magnitude exceeds the combined GTU lengths.
    /// Points at a bug in the topology walk that produced the distance.
    #[error(
        "distance {distance} implies more overlap than lengths {ego_length} and {other_length} allow"
    )]
    InconsistentGeometry {
        distance:     Length,
        ego_length:   Length,
        other_length: Length,
    },

    /// The lane structure could not resolve a record or GTU.
    #[error("network inconsistency: {0}")]
    NetworkInconsistency(String),

    /// `next()` called on an exhausted iterator.
    #[error("no such element")]
    NoSuchElement,
}

/// Shorthand result type for all `lp-*` crates.
pub type PerceptionResult<T> = Result<T, PerceptionError>;

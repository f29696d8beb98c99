//! `lp-core` — foundational types for the lane perception framework.
//!
//! This crate is a dependency of every other `lp-*` crate.  It has no `lp-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde` and `rustc-hash`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`ids`]     | `GtuId`, `LaneId`, `RecordId`                              |
//! | [`units`]   | `Length`, `Speed`, `Acceleration`, `Duration`              |
//! | [`time`]    | `Time`, `TimeStamped<T>`                                   |
//! | [`lane`]    | `LateralDirection`, `RelativeLane`, `Direction`            |
//! | [`triplet`] | `NeighborTriplet`                                          |
//! | [`params`]  | `ParameterType`, `Parameters`                              |
//! | [`rng`]     | `GtuRng` (per-GTU deterministic RNG)                       |
//! | [`error`]   | `PerceptionError`, `PerceptionResult`                      |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                   |
//! |-----------|----------------------------------------------------------|
//! | `serde`   | Adds `Serialize`/`Deserialize` to all public value types. |
//! | `fx-hash` | `CacheMap` becomes `FxHashMap` instead of std `HashMap`.  |

pub mod error;
pub mod ids;
pub mod lane;
pub mod params;
pub mod rng;
pub mod time;
pub mod triplet;
pub mod units;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{PerceptionError, PerceptionResult};
pub use ids::{GtuId, LaneId, RecordId};
pub use lane::{Direction, LateralDirection, RelativeLane};
pub use params::{ParameterType, Parameters};
pub use rng::GtuRng;
pub use time::{Time, TimeStamped};
pub use triplet::NeighborTriplet;
pub use units::{Acceleration, Duration, Length, Speed};

/// Hash map used by per-tick and per-neighbor caches.
#[cfg(feature = "fx-hash")]
pub type CacheMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// Hash map used by per-tick and per-neighbor caches.
#[cfg(not(feature = "fx-hash"))]
pub type CacheMap<K, V> = std::collections::HashMap<K, V>;

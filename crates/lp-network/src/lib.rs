//! `lp-network` — the in-memory world that perception walks over.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`network`]   | `LaneNetwork` (CSR successors/predecessors), builder        |
//! | [`gtu`]       | `GtuState`, `RelativePosition`, `KinematicsHistory`         |
//! | [`store`]     | `GtuStore`                                                  |
//! | [`occupancy`] | `LaneOccupancy`: GTUs per lane in driving order             |
//! | [`structure`] | `LaneStructure`, `LaneRecord`: ego-relative lane graph      |
//! | [`world`]     | `PerceptionWorld`: read-only snapshot for one tick          |
//! | [`error`]     | `NetworkError`, `NetworkResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types.     |

pub mod error;
pub mod gtu;
pub mod network;
pub mod occupancy;
pub mod store;
pub mod structure;
pub mod world;

#[cfg(test)]
mod tests;

pub use error::{NetworkError, NetworkResult};
pub use gtu::{GtuState, KinematicsHistory, RelativePosition};
pub use network::{LaneNetwork, LaneNetworkBuilder};
pub use occupancy::LaneOccupancy;
pub use store::GtuStore;
pub use structure::{LaneRecord, LaneStructure};
pub use world::PerceptionWorld;

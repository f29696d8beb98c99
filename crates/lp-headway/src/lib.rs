//! `lp-headway` — turns a neighbor GTU and a distance into a perceived headway.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                  |
//! |------------------|-----------------------------------------------------------|
//! | [`anticipation`] | `Anticipation`: forward projection over a reaction delay  |
//! | [`estimation`]   | `Estimation` trait; no / factor / erroneous estimation    |
//! | [`headway`]      | `HeadwayGtu`, `HeadwayKind`, `Kinematics`                 |
//! | [`gtu_type`]     | `HeadwayGtuType` (Wrap / Copy / Perceived)                |
//!
//! # Pipeline
//!
//! ```text
//! distance ──► HeadwayGtuType::create_headway
//!                 │ d >= 0: downstream / upstream
//!                 │ d <  0: parallel (overlap geometry)
//!                 ▼
//!          Perceived only: Estimation (state at now - reaction time)
//!                          ──► Anticipation (project forward to now)
//! ```
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                     |
//! |-----------|------------------------------------------------------------|
//! | `serde`   | Derives `Serialize`/`Deserialize` on `Anticipation` and `HeadwayKind`. |
//! | `fx-hash` | FxHash for the per-neighbor error state of erroneous estimation. |

pub mod anticipation;
pub mod estimation;
pub mod gtu_type;
pub mod headway;

#[cfg(test)]
mod tests;

pub use anticipation::Anticipation;
pub use estimation::{ErroneousEstimation, Estimation, FactorEstimation, NoEstimation};
pub use gtu_type::{HeadwayGtuType, PerceivedHeadwayGtuType};
pub use headway::{HeadwayGtu, HeadwayKind, Kinematics};

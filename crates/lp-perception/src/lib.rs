//! `lp-perception` — who is around the ego GTU, lane by lane.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                    |
//! |-----------------|-------------------------------------------------------------|
//! | [`iterable`]    | `FilteredIterable`: lazy predicate filter with lookahead    |
//! | [`collectable`] | `PerceptionCollectable` reduce protocol and collectors      |
//! | [`neighbors`]   | Leader/follower walks and first-GTU-per-branch searches     |
//! | [`direct`]      | `DirectNeighborsPerception`: per-tick caches and updates    |
//! | [`batch`]       | `update_all_agents`: many perceiving GTUs, one world        |
//!
//! # Per tick
//!
//! ```text
//! PerceptionWorld::new(time, &network, &gtus)          (once)
//!   for each perceiving GTU:
//!     DirectNeighborsPerception::new(&world, id, &headway_type)
//!       └─ LaneStructure::build (look-ahead / look-back)
//!     update_all()
//!     leaders(lane).collect(..) / first_leaders(lat) / is_gtu_alongside(lat)
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | `update_all_agents` runs on Rayon's thread pool.        |
//! | `fx-hash`  | FxHash for the perception caches.                       |

pub mod batch;
pub mod collectable;
pub mod direct;
pub mod iterable;
pub mod neighbors;


pub use batch::{PerceivingAgent, update_all_agents};
pub use collectable::{
    Intermediate, PerceptionCollectable, PerceptionCollector, UnderlyingDistance, collectors,
};
pub use direct::DirectNeighborsPerception;
pub use iterable::FilteredIterable;
pub use neighbors::{Candidate, MARGIN, Neighbors};

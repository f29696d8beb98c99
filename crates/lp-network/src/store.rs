//! GTU storage.
//!
//! `GtuStore` owns every GTU's [`GtuState`], indexed by `GtuId`.  Ids are
//! assigned sequentially by [`add`](GtuStore::add) and never reused, so a
//! `GtuId` is a direct `Vec` index.  Perception borrows the store immutably
//! for a whole tick; the simulation mutates it between ticks.

use lp_core::GtuId;

use crate::{GtuState, NetworkError, NetworkResult};

#[derive(Clone, Debug, Default)]
pub struct GtuStore {
    gtus: Vec<GtuState>,
}

impl GtuStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { gtus: Vec::with_capacity(capacity) }
    }

    /// Take ownership of `gtu`, assign its id, and return the id.
    pub fn add(&mut self, mut gtu: GtuState) -> GtuId {
        let id = GtuId(self.gtus.len() as u32);
        gtu.id = id;
        self.gtus.push(gtu);
        id
    }

    pub fn get(&self, id: GtuId) -> NetworkResult<&GtuState> {
        self.gtus.get(id.index()).ok_or(NetworkError::GtuNotFound(id))
    }

    pub fn get_mut(&mut self, id: GtuId) -> NetworkResult<&mut GtuState> {
        self.gtus.get_mut(id.index()).ok_or(NetworkError::GtuNotFound(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &GtuState> + '_ {
        self.gtus.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = GtuId> + '_ {
        self.gtus.iter().map(|g| g.id)
    }

    pub fn len(&self) -> usize {
        self.gtus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gtus.is_empty()
    }
}

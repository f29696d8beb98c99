//! Deterministic per-GTU RNG.
//!
//! # Determinism strategy
//!
//! Each perceiving GTU that needs randomness (erroneous estimation) gets its
//! own `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (gtu_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive ids uniformly across the seed space.  GTUs never
//! share RNG state, so results do not depend on the order in which agents are
//! updated or on which thread updates them.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::GtuId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Per-GTU deterministic RNG.
pub struct GtuRng(SmallRng);

impl GtuRng {
    /// Seed deterministically from the run's global seed and a GTU id.
    pub fn new(global_seed: u64, gtu: GtuId) -> Self {
        let seed = global_seed ^ (gtu.0 as u64).wrapping_mul(MIXING_CONSTANT);
        GtuRng(SmallRng::seed_from_u64(seed))
    }

    /// Uniform draw in `[0, 1)`.
    #[inline]
    pub fn uniform(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }

    /// Standard normal draw (Box–Muller, one value per call).
    pub fn standard_normal(&mut self) -> f64 {
        // 1 - U maps [0, 1) onto (0, 1], keeping ln() finite.
        let u1 = 1.0 - self.uniform();
        let u2 = self.uniform();
        (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }
}

//! Deterministic simulation RNG.
//!
//! # Determinism strategy
//!
//! A run owns exactly one `SimRng`, seeded once from the configuration and
//! passed explicitly to every component that draws a random value.  There is
//! no hidden global generator, so two runs built from the same seed and the
//! same configuration draw the same sequence in the same order.
//!
//! Independent runs (e.g. replications executed side by side) each build
//! their own `SimRng`; use [`SimRng::child`] to derive per-replication seeds
//! deterministically from a root seed.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::Interval;

const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// The single seeded random source of a simulation run, owned by the hub.
pub struct SimRng {
    rng:  SmallRng,
    seed: u64,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng { rng: SmallRng::seed_from_u64(seed), seed }
    }

    /// Seed from the operating system.  The drawn seed is kept so the run can
    /// be replayed later with [`SimRng::new`].
    pub fn from_entropy() -> Self {
        Self::new(rand::random::<u64>())
    }

    /// The seed this generator was created from.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Derive a child `SimRng` whose seed mixes `offset` into the next draw.
    /// Replication seeds derived this way depend only on the root seed.
    pub fn child(&mut self, offset: u64) -> SimRng {
        let child_seed: u64 = self.rng.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        SimRng::new(child_seed)
    }

    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Draw a duration uniformly from `interval`, both ends inclusive.
    #[inline]
    pub fn draw(&mut self, interval: Interval) -> u64 {
        if interval.min >= interval.max {
            return interval.min;
        }
        self.rng.gen_range(interval.min..=interval.max)
    }
}

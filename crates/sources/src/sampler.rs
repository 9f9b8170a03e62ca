//! Uniform random sampling with an injectable seed.
//!
//! Sources pick a random subset of the candidates they fetch. The shuffle is
//! Fisher–Yates (`SliceRandom::shuffle`), so every permutation is equally
//! likely; seeding makes a run reproducible.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::sync::Mutex;

/// A shareable random source for sampling.
pub struct Sampler {
    rng: Mutex<StdRng>,
}

impl Sampler {
    /// A sampler seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// A deterministic sampler.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Shuffle `items` and keep the first `min(count, len)`.
    pub fn sample<T>(&self, mut items: Vec<T>, count: usize) -> Vec<T> {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        items.shuffle(&mut *rng);
        items.truncate(count);
        items
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler").finish_non_exhaustive()
    }
}

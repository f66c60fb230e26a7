//! Seeded noise source for scatter expansion and demo ray casts.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

/// Gaussian/uniform noise backed by a ChaCha8 stream.
///
/// A seed of 0 draws from OS entropy (non-deterministic demo flavor);
/// any other seed gives a reproducible stream.
#[derive(Debug, Clone)]
pub struct NoiseSource {
    rng: ChaCha8Rng,
}

impl NoiseSource {
    /// Creates a noise source from a seed.
    pub fn new(seed: u64) -> Self {
        let rng = if seed == 0 {
            ChaCha8Rng::from_entropy()
        } else {
            ChaCha8Rng::seed_from_u64(seed)
        };
        Self { rng }
    }

    /// Zero-mean Gaussian sample with the given standard deviation.
    #[inline]
    pub fn gaussian(&mut self, stddev: f64) -> f64 {
        if stddev <= 0.0 {
            return 0.0;
        }
        let n: f64 = self.rng.sample(StandardNormal);
        n * stddev
    }

    /// Uniform sample in [lo, hi). Returns `lo` when the range is empty.
    #[inline]
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }

    /// Returns true with the given probability.
    #[inline]
    pub fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen::<f64>() < probability
    }
}

/// Derives an independent sub-seed for a subsystem.
///
/// Seed 0 stays 0 so entropy seeding propagates.
pub fn derive_seed(seed: u64, salt: u64) -> u64 {
    if seed == 0 {
        return 0;
    }
    let derived = seed.wrapping_mul(0x9e3779b97f4a7c15) ^ salt;
    if derived == 0 {
        salt.max(1)
    } else {
        derived
    }
}

//! Random number generator abstraction for the tile generator.
//!
//! The generator only ever needs two things from its random source: a uniform
//! index into a list (candidate cells, domain entries) and a way to derive
//! fresh seeds.
//!
//! # Example
//!
//! ```ignore
//! use mapgen_core::rng::{GenRng, StdRandom};
//!
//! let mut rng = StdRandom::from_u64_seed(42);
//! let index = rng.next_usize_max(10); // 0..10
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Trait for random number generators used by the generator.
///
/// Must be `Send + Sync` so a running generator can live in a Bevy resource.
pub trait GenRng: Send + Sync {
    /// Returns a random usize in [0, max). Returns 0 when `max` is 0.
    fn next_usize_max(&mut self, max: usize) -> usize;

    /// Returns a random u64.
    /// Used for deriving run seeds.
    fn next_u64(&mut self) -> u64;
}

/// Standard Rust RNG wrapper using `rand::rngs::StdRng`.
///
/// Deterministic for a given seed.
#[derive(Clone)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    /// Create from a u64 seed.
    pub fn from_u64_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a non-deterministic generator seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl GenRng for StdRandom {
    fn next_usize_max(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        self.rng.gen_range(0..max)
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.gen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_random_bounds() {
        let mut rng = StdRandom::from_u64_seed(42);

        for _ in 0..100 {
            let v = rng.next_usize_max(7);
            assert!(v < 7);
        }
    }

    #[test]
    fn test_zero_max_is_zero() {
        let mut rng = StdRandom::from_u64_seed(1);
        assert_eq!(rng.next_usize_max(0), 0);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut rng1 = StdRandom::from_u64_seed(123);
        let mut rng2 = StdRandom::from_u64_seed(123);
        for _ in 0..100 {
            assert_eq!(rng1.next_usize_max(1000), rng2.next_usize_max(1000));
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_entropy_seeds_differ() {
        let a = StdRandom::from_entropy().next_u64();
        let b = StdRandom::from_entropy().next_u64();
        assert_ne!(a, b);
    }
}

//! Injectable randomness for Cuckoo filter eviction.
//!
//! The Cuckoo filter needs a source of random slot choices during eviction.
//! Tests need that source to be deterministic; production code just needs
//! it to be reasonably well distributed. [`RandomSource`] separates the two
//! concerns so a caller can swap in a seeded generator without the filter
//! caring which one it got.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A source of randomness sufficient to drive Cuckoo eviction.
pub trait RandomSource {
    /// Return a value in `0..bound`. `bound` is always greater than zero.
    fn next_below(&mut self, bound: usize) -> usize;

    /// Return a random boolean, used to pick between two candidate
    /// buckets with equal probability.
    fn next_bool(&mut self) -> bool;
}

/// The default [`RandomSource`], backed by `rand`'s `SmallRng`.
pub struct DefaultRandomSource(SmallRng);

impl DefaultRandomSource {
    /// Seed the generator from the process-wide entropy source.
    pub fn from_entropy() -> Self {
        DefaultRandomSource(SmallRng::from_os_rng())
    }

    /// Seed the generator deterministically, for reproducible tests.
    pub fn from_seed(seed: u64) -> Self {
        DefaultRandomSource(SmallRng::seed_from_u64(seed))
    }
}

impl RandomSource for DefaultRandomSource {
    fn next_below(&mut self, bound: usize) -> usize {
        self.0.random_range(0..bound)
    }

    fn next_bool(&mut self) -> bool {
        self.0.random::<bool>()
    }
}

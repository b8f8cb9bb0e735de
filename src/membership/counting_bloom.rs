//! Counting Bloom filter: a Bloom filter with deletion support.
//!
//! Each double-hashed position stores a counter instead of a single bit,
//! parameterized by counter width (`W`: u4/u8/u16/u32, see
//! [`CounterWidth`]). Deleting an item decrements its k counters instead of
//! clearing bits that other items may share.
//!
//! # Example
//! ```
//! use sketch_forge::common::CounterWidth;
//! use sketch_forge::membership::CountingBloomFilter;
//!
//! let mut filter = CountingBloomFilter::new(1000, 0.01, CounterWidth::W4).unwrap();
//! filter.set(b"key1");
//! filter.set(b"key2");
//! assert!(filter.contains(b"key1"));
//!
//! filter.remove(b"key1");
//! assert!(!filter.contains(b"key1"));
//! assert!(filter.contains(b"key2"));
//! ```

use crate::common::hash::{calc_k, calc_m, double_hash_index, hash_pair};
use crate::common::validation::validate_bloom_parameters;
use crate::common::{CounterWidth, CountingBitArray, Result, SketchError};

/// A Counting Bloom filter supporting insertion, deletion, and membership
/// queries, parameterized by counter width.
#[derive(Clone)]
pub struct CountingBloomFilter {
    counters: CountingBitArray,
    k: u32,
    m: u64,
    n: u64,
}

impl CountingBloomFilter {
    /// Size a new filter for `n` expected items at target false-positive
    /// probability `p`, with counters of the given `width`.
    pub fn new(n: u64, p: f64, width: CounterWidth) -> Result<Self> {
        let m = calc_m(n, p);
        let k = calc_k(m, n);
        Self::with_params(n, m, k, width)
    }

    /// Construct a filter with explicit `(m, k)`, bypassing `(n, p)`
    /// derivation.
    pub fn with_params(n: u64, m: u64, k: u32, width: CounterWidth) -> Result<Self> {
        validate_bloom_parameters(n, m, k)?;
        Ok(CountingBloomFilter {
            counters: CountingBitArray::new(m as usize, width),
            k,
            m,
            n,
        })
    }

    fn positions(&self, item: &[u8]) -> impl Iterator<Item = u64> + '_ {
        let (h1, h2) = hash_pair(item);
        (0..u64::from(self.k)).map(move |i| double_hash_index(h1, h2, i, self.m))
    }

    /// Increment the `k` double-hashed counters for `item`.
    ///
    /// # Errors
    /// Returns [`SketchError::CounterOverflow`] if any counter was already
    /// at its maximum. Counters incremented before the overflow are left
    /// incremented: callers must size counters wide enough for their
    /// expected item multiplicity.
    pub fn set(&mut self, item: &[u8]) -> Result<()> {
        for pos in self.positions(item).collect::<Vec<_>>() {
            self.counters.increment(pos as usize)?;
        }
        Ok(())
    }

    /// Whether `item` might be in the filter: all `k` counters are
    /// non-zero.
    pub fn contains(&self, item: &[u8]) -> bool {
        self.positions(item)
            .all(|pos| self.counters.is_set(pos as usize).unwrap_or(false))
    }

    /// Remove `item`. First checks [`contains`](Self::contains); if absent,
    /// returns `false` without modifying any counter. Otherwise decrements
    /// the `k` counters unconditionally and returns `true`.
    pub fn remove(&mut self, item: &[u8]) -> bool {
        if !self.contains(item) {
            return false;
        }
        for pos in self.positions(item).collect::<Vec<_>>() {
            self.counters
                .decrement_unchecked(pos as usize)
                .expect("position within bounds");
        }
        true
    }

    /// Remove `item`, verifying all `k` counters are positive before
    /// decrementing any of them.
    ///
    /// # Errors
    /// Returns [`SketchError::CounterUnderflow`] if any counter is already
    /// zero; in that case no counter is touched.
    pub fn remove_safe(&mut self, item: &[u8]) -> Result<bool> {
        let positions: Vec<u64> = self.positions(item).collect();
        for &pos in &positions {
            if !self.counters.is_set(pos as usize)? {
                return Err(SketchError::CounterUnderflow { index: pos as usize });
            }
        }
        for &pos in &positions {
            self.counters.decrement(pos as usize)?;
        }
        Ok(true)
    }

    /// Minimum counter value across `item`'s `k` positions: an upper bound
    /// on how many times it was inserted.
    pub fn count_estimate(&self, item: &[u8]) -> u64 {
        self.positions(item)
            .map(|pos| self.counters.get(pos as usize).unwrap_or(0))
            .min()
            .unwrap_or(0)
    }

    /// Estimate of distinct items currently represented, from the count of
    /// non-zero counters.
    pub fn estimated_size(&self) -> u64 {
        let x = self.counters.count_nonzero() as f64;
        let m = self.m as f64;
        let fill_ratio = x / m;
        if fill_ratio <= 0.0 {
            return 0;
        }
        if fill_ratio >= 1.0 {
            return self.n;
        }
        let estimate = -(m) * (1.0 - fill_ratio).ln() / f64::from(self.k);
        estimate.max(0.0).round() as u64
    }

    /// Whether no counter has ever been incremented.
    pub fn is_empty(&self) -> bool {
        self.counters.count_nonzero() == 0
    }

    /// `(n, m, k)` configuration this filter was constructed with.
    pub fn params(&self) -> (u64, u64, u32) {
        (self.n, self.m, self.k)
    }

    /// Reset every counter to zero.
    pub fn clear(&mut self) {
        self.counters.clear();
    }

    /// Merge `other`'s counters into `self`'s, cell-wise, saturating at
    /// each counter's maximum value.
    ///
    /// # Errors
    /// Returns [`SketchError::IncompatibleDimensions`] if `(m, k)` or
    /// counter width differ.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if self.m != other.m || self.k != other.k || self.counters.width() != other.counters.width()
        {
            return Err(SketchError::IncompatibleDimensions {
                reason: "counting Bloom filters have different (m, k, width)".to_string(),
            });
        }
        for i in 0..self.m as usize {
            let combined = self.counters.get(i)? + other.counters.get(i)?;
            self.counters.set_value(i, combined)?;
        }
        Ok(())
    }

    /// Size of the backing storage in bytes.
    pub fn memory_usage(&self) -> usize {
        self.counters.memory_usage()
    }
}

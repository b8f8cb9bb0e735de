//! Standard Bloom filter.
//!
//! A space-efficient probabilistic data structure for set membership
//! queries, backed by a packed [`BitArray`] and Kirsch-Mitzenmacher double
//! hashing: k hash positions are derived from just two base hashes instead
//! of running the hash function k times.
//!
//! # Example
//! ```
//! use sketch_forge::membership::BloomFilter;
//!
//! let mut filter = BloomFilter::new(1000, 0.01).unwrap();
//! filter.set(b"key1");
//! filter.set(b"key2");
//!
//! assert!(filter.contains(b"key1"));
//! assert!(!filter.contains(b"key3")); // probably false
//! ```

use crate::common::hash::{calc_k, calc_m, double_hash_index, hash_pair};
use crate::common::validation::validate_bloom_parameters;
use crate::common::{BitArray, Result, SketchError};

/// A Bloom filter for approximate set membership.
#[derive(Clone)]
pub struct BloomFilter {
    bits: BitArray,
    k: u32,
    m: u64,
    n: u64,
}

impl BloomFilter {
    /// Size a new filter for `n` expected items at target false-positive
    /// probability `p`, deriving `m` and `k` via [`calc_m`]/[`calc_k`].
    pub fn new(n: u64, p: f64) -> Result<Self> {
        let m = calc_m(n, p);
        let k = calc_k(m, n);
        Self::with_params(n, m, k)
    }

    /// Construct a filter with an explicit bit-array length `m` and hash
    /// count `k`, bypassing the `(n, p)` derivation.
    pub fn with_params(n: u64, m: u64, k: u32) -> Result<Self> {
        validate_bloom_parameters(n, m, k)?;
        Ok(BloomFilter {
            bits: BitArray::new(m as usize),
            k,
            m,
            n,
        })
    }

    fn positions(&self, item: &[u8]) -> impl Iterator<Item = u64> + '_ {
        let (h1, h2) = hash_pair(item);
        (0..u64::from(self.k)).map(move |i| double_hash_index(h1, h2, i, self.m))
    }

    /// Set the `k` double-hashed bit positions for `item`. Bits are never
    /// cleared, so the filter is monotonic.
    pub fn set(&mut self, item: &[u8]) {
        for pos in self.positions(item).collect::<Vec<_>>() {
            self.bits.set(pos as usize).expect("position within bounds");
        }
    }

    /// Whether `item` might be in the set. `false` means it definitely is
    /// not; `true` may be a false positive.
    pub fn contains(&self, item: &[u8]) -> bool {
        self.positions(item)
            .all(|pos| self.bits.is_set(pos as usize).unwrap_or(false))
    }

    /// Reset every bit to zero.
    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// Count of set bits.
    pub fn count_bits(&self) -> u64 {
        self.bits.popcount_all()
    }

    /// Estimate of the number of items inserted so far, via
    /// `-(m/k) * ln(1 - X/m)` where `X` is the popcount, clamped to `[0, n]`.
    pub fn estimated_size(&self) -> u64 {
        let x = self.count_bits() as f64;
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

    /// Whether no item has ever been set.
    pub fn is_empty(&self) -> bool {
        self.count_bits() == 0
    }

    /// `(n, m, k)` configuration this filter was constructed with.
    pub fn params(&self) -> (u64, u64, u32) {
        (self.n, self.m, self.k)
    }

    /// Size of the backing bit array in bytes.
    pub fn memory_usage(&self) -> usize {
        self.bits.memory_usage()
    }

    /// Union this filter's bits with `other`'s, in place. Both filters
    /// must share the same bit-array length `m`.
    ///
    /// # Errors
    /// Returns [`SketchError::IncompatibleDimensions`] if `m` differs.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if self.m != other.m {
            return Err(SketchError::IncompatibleDimensions {
                reason: format!("bit array length differs: {} vs {}", self.m, other.m),
            });
        }
        self.bits.union_with(&other.bits)
    }
}

impl std::fmt::Debug for BloomFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BloomFilter")
            .field("n", &self.n)
            .field("m", &self.m)
            .field("k", &self.k)
            .field("bits_set", &self.count_bits())
            .field("memory_bytes", &self.memory_usage())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let filter = BloomFilter::new(1000, 0.01).unwrap();
        let (n, m, k) = filter.params();
        assert_eq!(n, 1000);
        assert!(m > 0);
        assert!(k > 0);
    }

    #[test]
    fn test_set_and_contains() {
        let mut filter = BloomFilter::new(100, 0.01).unwrap();
        filter.set(b"key1");
        filter.set(b"key2");
        filter.set(b"key3");

        assert!(filter.contains(b"key1"));
        assert!(filter.contains(b"key2"));
        assert!(filter.contains(b"key3"));
    }

    #[test]
    fn test_no_false_negatives() {
        let mut filter = BloomFilter::new(1000, 0.01).unwrap();
        let keys: Vec<Vec<u8>> = (0..1000).map(|i| format!("key{i}").into_bytes()).collect();
        for key in &keys {
            filter.set(key);
        }
        for key in &keys {
            assert!(filter.contains(key));
        }
    }

    #[test]
    fn test_false_positive_rate_bounded() {
        let mut filter = BloomFilter::new(1000, 0.01).unwrap();
        let keys: Vec<Vec<u8>> = (0..1000).map(|i| format!("key{i}").into_bytes()).collect();
        for key in &keys {
            filter.set(key);
        }
        let test_keys: Vec<Vec<u8>> =
            (10000..20000).map(|i| format!("test{i}").into_bytes()).collect();
        let false_positives = test_keys.iter().filter(|key| filter.contains(key)).count();
        let actual_fpr = false_positives as f64 / test_keys.len() as f64;
        assert!(actual_fpr < 0.03, "FPR too high: {actual_fpr:.4}");
    }

    #[test]
    fn test_empty_filter() {
        let filter = BloomFilter::new(100, 0.01).unwrap();
        assert!(!filter.contains(b"key1"));
        assert!(filter.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut filter = BloomFilter::new(100, 0.01).unwrap();
        filter.set(b"key1");
        assert!(filter.contains(b"key1"));
        filter.clear();
        assert!(!filter.contains(b"key1"));
        assert_eq!(filter.count_bits(), 0);
    }

    #[test]
    fn test_with_params() {
        let filter = BloomFilter::with_params(1000, 10000, 7).unwrap();
        assert_eq!(filter.params(), (1000, 10000, 7));
    }

    #[test]
    fn test_binary_keys() {
        let mut filter = BloomFilter::new(100, 0.01).unwrap();
        let binary_keys = vec![vec![0u8, 1, 2, 3], vec![255, 254, 253], vec![0, 0, 0, 0]];
        for key in &binary_keys {
            filter.set(key);
        }
        for key in &binary_keys {
            assert!(filter.contains(key));
        }
    }

    #[test]
    fn test_new_rejects_zero_n() {
        assert!(BloomFilter::new(0, 0.01).is_err());
    }

    #[test]
    fn test_new_rejects_invalid_fpr() {
        assert!(BloomFilter::new(100, 1.5).is_err());
    }

    #[test]
    fn test_merge_requires_matching_m() {
        let mut a = BloomFilter::with_params(100, 1000, 5).unwrap();
        let b = BloomFilter::with_params(100, 2000, 5).unwrap();
        assert!(a.merge(&b).is_err());
    }

    #[test]
    fn test_merge_is_union() {
        let mut a = BloomFilter::with_params(100, 1000, 5).unwrap();
        let mut b = BloomFilter::with_params(100, 1000, 5).unwrap();
        a.set(b"from-a");
        b.set(b"from-b");
        a.merge(&b).unwrap();
        assert!(a.contains(b"from-a"));
        assert!(a.contains(b"from-b"));
    }

    #[test]
    fn test_debug_format() {
        let mut filter = BloomFilter::new(1000, 0.01).unwrap();
        filter.set(b"test");
        let debug_str = format!("{filter:?}");
        assert!(debug_str.contains("BloomFilter"));
    }

    // Scenario 1 from the literal test suite: apple/banana present, grape
    // absent at n=100, p=0.01.
    #[test]
    fn scenario_apple_banana_grape() {
        let mut filter = BloomFilter::new(100, 0.01).unwrap();
        filter.set(b"apple");
        filter.set(b"banana");
        assert!(filter.contains(b"apple"));
        assert!(filter.contains(b"banana"));
        assert!(!filter.contains(b"grape"));
    }
}

//! Cuckoo filter: space-efficient membership with deletions (Fan et al. 2014).
//!
//! Each item hashes to a short fingerprint stored in one of two candidate
//! buckets. Both candidates can be derived from each other via
//! `b1 = b2 XOR H(fp)`, so an item's alternate bucket never needs the
//! original key recomputed. Bucket collisions are resolved by cuckoo
//! eviction: displace a random occupant into its own alternate bucket,
//! repeating up to `MAX_KICKS` times before declaring the filter full.
//!
//! # Example
//! ```
//! use sketch_forge::membership::CuckooFilter;
//!
//! let mut filter = CuckooFilter::new(1000).unwrap();
//! filter.insert(b"key1").unwrap();
//! filter.insert(b"key2").unwrap();
//!
//! assert!(filter.contains(b"key1"));
//! filter.remove(b"key1");
//! assert!(!filter.contains(b"key1"));
//! ```

use crate::common::hash::xxhash;
use crate::common::rng::{DefaultRandomSource, RandomSource};
use crate::common::validation::validate_capacity;
use crate::common::{Result, SketchError};

/// Maximum number of relocations attempted before an insert gives up.
const MAX_KICKS: usize = 500;

/// An unsigned fingerprint type a [`CuckooFilter`] can store: derived from a
/// hash, with `0` reserved as the "slot empty" sentinel.
pub trait Fingerprint: Copy + Eq + std::fmt::Debug {
    /// The reserved empty-slot value.
    const EMPTY: Self;

    /// Derive a fingerprint from a 64-bit hash, remapping a result that
    /// collides with [`Self::EMPTY`] to a fixed non-empty value.
    fn from_hash(hash: u64) -> Self;

    /// Hash the fingerprint itself, used to derive the alternate bucket.
    fn self_hash(self) -> u64;
}

macro_rules! impl_fingerprint {
    ($t:ty, $shift:expr) => {
        impl Fingerprint for $t {
            const EMPTY: $t = 0;

            fn from_hash(hash: u64) -> Self {
                let fp = (hash >> $shift) as $t;
                if fp == 0 {
                    1
                } else {
                    fp
                }
            }

            fn self_hash(self) -> u64 {
                xxhash(&self.to_le_bytes(), 0)
            }
        }
    };
}

impl_fingerprint!(u8, 56);
impl_fingerprint!(u16, 48);
impl_fingerprint!(u32, 32);

/// A Cuckoo filter for approximate set membership with deletion, generic
/// over fingerprint type `F` and bucket size `B`.
pub struct CuckooFilter<F: Fingerprint = u16, const B: usize = 4> {
    buckets: Vec<[F; B]>,
    bucket_count: usize,
    count: usize,
    rng: Box<dyn RandomSource>,
}

impl<F: Fingerprint, const B: usize> CuckooFilter<F, B> {
    /// Size a filter for `capacity` expected items, bucket count rounded up
    /// to the next power of two. Uses process entropy for eviction choices.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_rng(capacity, Box::new(DefaultRandomSource::from_entropy()))
    }

    /// Size a filter for `capacity` expected items with a fixed eviction
    /// seed, for reproducible tests.
    pub fn with_seed(capacity: usize, seed: u64) -> Result<Self> {
        Self::with_rng(capacity, Box::new(DefaultRandomSource::from_seed(seed)))
    }

    /// Size a filter using a caller-supplied [`RandomSource`] for eviction
    /// choices.
    pub fn with_rng(capacity: usize, rng: Box<dyn RandomSource>) -> Result<Self> {
        validate_capacity(capacity as u64)?;
        let bucket_count = capacity.div_ceil(B).max(1).next_power_of_two();
        Ok(CuckooFilter {
            buckets: vec![[F::EMPTY; B]; bucket_count],
            bucket_count,
            count: 0,
            rng,
        })
    }

    /// Number of items stored.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the filter holds no items.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Maximum number of items the filter can hold (`bucket_count * B`).
    pub fn capacity(&self) -> usize {
        self.bucket_count * B
    }

    /// Fraction of slots occupied.
    pub fn load_factor(&self) -> f64 {
        self.count as f64 / self.capacity() as f64
    }

    fn fingerprint(&self, key: &[u8]) -> F {
        F::from_hash(xxhash(key, 0xDEAD_BEEF))
    }

    fn primary_bucket(&self, key: &[u8]) -> usize {
        (xxhash(key, 0) as usize) % self.bucket_count
    }

    fn alt_bucket(&self, bucket: usize, fp: F) -> usize {
        (bucket ^ (fp.self_hash() as usize)) % self.bucket_count
    }

    fn candidate_buckets(&self, key: &[u8], fp: F) -> (usize, usize) {
        let b1 = self.primary_bucket(key);
        let b2 = self.alt_bucket(b1, fp);
        (b1, b2)
    }

    fn insert_into(bucket: &mut [F; B], fp: F) -> bool {
        for slot in bucket.iter_mut() {
            if *slot == F::EMPTY {
                *slot = fp;
                return true;
            }
        }
        false
    }

    fn remove_from(bucket: &mut [F; B], fp: F) -> bool {
        for slot in bucket.iter_mut() {
            if *slot == fp {
                *slot = F::EMPTY;
                return true;
            }
        }
        false
    }

    /// Insert `key`, evicting existing fingerprints via cuckoo kicks if both
    /// candidate buckets are full.
    ///
    /// # Errors
    /// Returns [`SketchError::FilterFull`] after `MAX_KICKS` relocations
    /// fail to find a home for the displaced fingerprint.
    pub fn insert(&mut self, key: &[u8]) -> Result<()> {
        let fp = self.fingerprint(key);
        let (b1, b2) = self.candidate_buckets(key, fp);

        if Self::insert_into(&mut self.buckets[b1], fp) {
            self.count += 1;
            return Ok(());
        }
        if Self::insert_into(&mut self.buckets[b2], fp) {
            self.count += 1;
            return Ok(());
        }

        let mut current_fp = fp;
        let mut current_bucket = if self.rng.next_bool() { b1 } else { b2 };

        for _ in 0..MAX_KICKS {
            let slot = self.rng.next_below(B);
            let evicted = self.buckets[current_bucket][slot];
            self.buckets[current_bucket][slot] = current_fp;
            current_fp = evicted;
            current_bucket = self.alt_bucket(current_bucket, current_fp);

            if Self::insert_into(&mut self.buckets[current_bucket], current_fp) {
                self.count += 1;
                return Ok(());
            }
        }

        Err(SketchError::FilterFull)
    }

    /// Whether `key` might be present.
    pub fn contains(&self, key: &[u8]) -> bool {
        let fp = self.fingerprint(key);
        let (b1, b2) = self.candidate_buckets(key, fp);
        self.buckets[b1].contains(&fp) || self.buckets[b2].contains(&fp)
    }

    /// Remove `key`, clearing the first matching fingerprint across its two
    /// candidate buckets. Returns whether a removal occurred.
    ///
    /// Removing a key more times than it was inserted can produce a false
    /// negative for another key sharing the same fingerprint; callers must
    /// not do that.
    pub fn remove(&mut self, key: &[u8]) -> bool {
        let fp = self.fingerprint(key);
        let (b1, b2) = self.candidate_buckets(key, fp);
        if Self::remove_from(&mut self.buckets[b1], fp) {
            self.count -= 1;
            return true;
        }
        if Self::remove_from(&mut self.buckets[b2], fp) {
            self.count -= 1;
            return true;
        }
        false
    }

    /// Exact count of non-empty slots.
    pub fn estimated_size(&self) -> usize {
        self.count
    }

    /// Clear every slot.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            *bucket = [F::EMPTY; B];
        }
        self.count = 0;
    }

    /// Size of the backing storage in bytes.
    pub fn memory_usage(&self) -> usize {
        self.bucket_count * B * std::mem::size_of::<F>()
    }
}

impl<F: Fingerprint, const B: usize> std::fmt::Debug for CuckooFilter<F, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CuckooFilter")
            .field("bucket_count", &self.bucket_count)
            .field("bucket_size", &B)
            .field("count", &self.count)
            .field("memory_bytes", &self.memory_usage())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(capacity: usize) -> CuckooFilter<u16, 4> {
        CuckooFilter::with_seed(capacity, 0x1234_5678).unwrap()
    }

    #[test]
    fn test_new_is_empty() {
        let f = filter(1000);
        assert!(f.is_empty());
    }

    #[test]
    fn test_insert_contains() {
        let mut f = filter(100);
        f.insert(b"hello").unwrap();
        assert!(f.contains(b"hello"));
        assert!(!f.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut f = filter(100);
        f.insert(b"hello").unwrap();
        assert!(f.remove(b"hello"));
        assert!(!f.contains(b"hello"));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut f = filter(100);
        f.insert(b"hello").unwrap();
        assert!(!f.remove(b"never-inserted"));
        assert!(f.contains(b"hello"));
    }

    #[test]
    fn test_remove_maintains_others() {
        let mut f = filter(100);
        f.insert(b"key1").unwrap();
        f.insert(b"key2").unwrap();
        f.remove(b"key1");
        assert!(!f.contains(b"key1"));
        assert!(f.contains(b"key2"));
    }

    #[test]
    fn test_many_inserts_and_queries() {
        let mut f = filter(500);
        let keys: Vec<Vec<u8>> = (0..300).map(|i| format!("key{i}").into_bytes()).collect();
        for key in &keys {
            f.insert(key).unwrap();
        }
        for key in &keys {
            assert!(f.contains(key));
        }
    }

    #[test]
    fn test_clear() {
        let mut f = filter(100);
        f.insert(b"hello").unwrap();
        f.clear();
        assert!(f.is_empty());
        assert!(!f.contains(b"hello"));
    }

    #[test]
    fn test_load_factor() {
        let mut f = filter(100);
        assert_eq!(f.load_factor(), 0.0);
        for i in 0u32..50 {
            f.insert(&i.to_le_bytes()).unwrap();
        }
        assert!(f.load_factor() > 0.0);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        assert!(CuckooFilter::<u16, 4>::new(0).is_err());
    }

    #[test]
    fn test_fingerprint_never_empty() {
        assert_ne!(u16::from_hash(0), u16::EMPTY);
        assert_ne!(u16::from_hash(1u64 << 48), u16::EMPTY);
    }

    #[test]
    fn test_debug_format() {
        let f = filter(100);
        let s = format!("{f:?}");
        assert!(s.contains("CuckooFilter"));
    }
}

//! Scalable Bloom filter: a Bloom filter that grows without a pre-declared
//! capacity, by appending progressively tighter Bloom filters.
//!
//! # Example
//! ```
//! use sketch_forge::membership::ScalableBloomFilter;
//!
//! let mut filter = ScalableBloomFilter::new_default(100, 0.01).unwrap();
//! for i in 0..1000 {
//!     filter.set(format!("key{i}").as_bytes());
//! }
//! assert!(filter.contains(b"key0"));
//! assert!(filter.filter_count() > 1);
//! ```

use super::bloom::BloomFilter;
use crate::common::validation::{validate_capacity, validate_probability};
use crate::common::Result;

/// A Bloom filter composed of an ordered list of component Bloom filters,
/// each with progressively larger capacity and tighter false-positive
/// target than the last. The active (last) filter absorbs new items;
/// membership is the logical OR across every component.
pub struct ScalableBloomFilter {
    filters: Vec<BloomFilter>,
    capacities: Vec<u64>,
    initial_capacity: u64,
    initial_p: f64,
    growth: f64,
    tightening: f64,
    total_set_calls: u64,
}

impl ScalableBloomFilter {
    /// Construct with explicit growth rate `g` and tightening ratio `r`.
    /// Component `i` has capacity `c * g^i` and target false-positive rate
    /// `p * r^i`.
    pub fn new(c: u64, p: f64, g: f64, r: f64) -> Result<Self> {
        validate_capacity(c)?;
        validate_probability(p, "p")?;
        let first = BloomFilter::new(c, p)?;
        Ok(ScalableBloomFilter {
            filters: vec![first],
            capacities: vec![c],
            initial_capacity: c,
            initial_p: p,
            growth: g,
            tightening: r,
            total_set_calls: 0,
        })
    }

    /// Construct with the conventional defaults: growth `g = 2`,
    /// tightening `r = 0.5`.
    pub fn new_default(c: u64, p: f64) -> Result<Self> {
        Self::new(c, p, 2.0, 0.5)
    }

    /// Set `item` in the active (last) component filter, growing the
    /// filter first if the active component has reached its configured
    /// capacity.
    pub fn set(&mut self, item: &[u8]) {
        let last_index = self.filters.len() - 1;
        if self.filters[last_index].estimated_size() >= self.capacities[last_index] {
            let next_index = self.filters.len();
            let capacity = (self.initial_capacity as f64 * self.growth.powi(next_index as i32))
                .round() as u64;
            let p = self.initial_p * self.tightening.powi(next_index as i32);
            // Growth and tightening parameters were validated at
            // construction, so the derived capacity/p stay in range.
            let filter = BloomFilter::new(capacity.max(1), p.clamp(f64::MIN_POSITIVE, 0.999_999))
                .expect("derived scalable-bloom component parameters are valid");
            self.filters.push(filter);
            self.capacities.push(capacity.max(1));
        }
        self.filters.last_mut().expect("at least one component").set(item);
        self.total_set_calls += 1;
    }

    /// Whether `item` might be present in any component.
    pub fn contains(&self, item: &[u8]) -> bool {
        self.filters.iter().any(|f| f.contains(item))
    }

    /// Count of `set` calls made so far (not unique items).
    pub fn estimated_size(&self) -> u64 {
        self.total_set_calls
    }

    /// Number of component Bloom filters currently allocated.
    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// Whether no item has ever been set.
    pub fn is_empty(&self) -> bool {
        self.total_set_calls == 0
    }
}

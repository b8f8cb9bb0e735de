//! q-digest: a sparse dyadic-tree summary for approximate quantiles and
//! ranks over a bounded integer universe (Shrivastava et al. 2004).
//!
//! The universe `[0, U)` is the leaf level of a complete binary tree; a
//! node at level `l` and index `i` covers the range
//! `[i * 2^l, (i+1) * 2^l)`. Only nodes with a non-zero count are kept.
//! After each insert, adjacent sibling-and-parent triples whose combined
//! count falls below `total / compression_factor` are merged upward,
//! bounding the node count to roughly `compression_factor`.
//!
//! # Example
//! ```
//! use sketch_forge::quantiles::QDigest;
//!
//! let mut qd = QDigest::new(32, 1024).unwrap();
//! for v in 0..200u64 {
//!     qd.insert(v % 100).unwrap();
//! }
//! let median = qd.quantile(0.5).unwrap();
//! assert!((40.0..=60.0).contains(&median));
//! ```

use crate::common::validation::{validate_percentile, validate_qdigest_compression, validate_universe_size};
use crate::common::{Result, SketchError};
use std::collections::{HashMap, HashSet};

/// Inclusive-exclusive range covered by a dyadic node at `(level, index)`.
fn node_range(level: u8, index: u64) -> (u64, u64) {
    let size = 1u64 << level;
    let low = index * size;
    (low, low + size - 1)
}

/// A q-digest for approximate quantile and rank queries over a bounded
/// integer universe.
#[derive(Clone, Debug)]
pub struct QDigest {
    compression_factor: u32,
    universe: u64,
    depth: u8,
    counts: HashMap<(u8, u64), u64>,
    total: u64,
}

impl QDigest {
    /// Construct an empty digest over `[0, universe)` with the given
    /// `compression_factor`.
    ///
    /// # Errors
    /// Returns [`SketchError::InvalidParameter`] if `compression_factor` is
    /// outside `[1, 1000]` or `universe` is not a positive power of two.
    pub fn new(compression_factor: u32, universe: u64) -> Result<Self> {
        validate_qdigest_compression(compression_factor)?;
        validate_universe_size(universe)?;
        Ok(QDigest {
            compression_factor,
            universe,
            depth: universe.trailing_zeros() as u8,
            counts: HashMap::new(),
            total: 0,
        })
    }

    /// The compression factor this digest was constructed with.
    pub fn compression_factor(&self) -> u32 {
        self.compression_factor
    }

    /// Size of the universe `[0, universe)`.
    pub fn universe(&self) -> u64 {
        self.universe
    }

    /// Total weight of all values inserted.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of dyadic nodes currently retained.
    pub fn node_count(&self) -> usize {
        self.counts.len()
    }

    /// Whether no value has been inserted.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Insert a single observation of `value`.
    ///
    /// # Errors
    /// Returns [`SketchError::InvalidParameter`] if `value >= universe`.
    pub fn insert(&mut self, value: u64) -> Result<()> {
        self.add_weighted(value, 1)
    }

    fn add_weighted(&mut self, value: u64, weight: u64) -> Result<()> {
        if value >= self.universe {
            return Err(SketchError::InvalidParameter {
                param: "value".to_string(),
                value: value.to_string(),
                constraint: format!("must be less than universe size {}", self.universe),
            });
        }
        *self.counts.entry((0, value)).or_insert(0) += weight;
        self.total += weight;
        self.compress();
        Ok(())
    }

    /// Merge adjacent sibling-and-parent triples whose combined count is
    /// at or below `total / compression_factor`, bottom-up.
    fn compress(&mut self) {
        if self.total == 0 {
            return;
        }
        let threshold = self.total / u64::from(self.compression_factor);
        for level in 0..self.depth {
            let parents: HashSet<u64> = self
                .counts
                .keys()
                .filter(|&&(l, _)| l == level)
                .map(|&(_, idx)| idx >> 1)
                .collect();

            for parent in parents {
                let left = *self.counts.get(&(level, parent * 2)).unwrap_or(&0);
                let right = *self.counts.get(&(level, parent * 2 + 1)).unwrap_or(&0);
                let existing_parent = *self.counts.get(&(level + 1, parent)).unwrap_or(&0);
                let combined = left + right + existing_parent;
                if combined > 0 && combined <= threshold {
                    self.counts.remove(&(level, parent * 2));
                    self.counts.remove(&(level, parent * 2 + 1));
                    self.counts.insert((level + 1, parent), combined);
                }
            }
            self.counts.retain(|_, count| *count > 0);
        }
    }

    /// Estimated value at quantile `p`.
    ///
    /// # Errors
    /// Returns [`SketchError::InvalidParameter`] if `p` is outside
    /// `[0.0, 1.0]`, or [`SketchError::EmptyDigest`] if no value has been
    /// inserted.
    pub fn quantile(&self, p: f64) -> Result<f64> {
        validate_percentile(p)?;
        if self.total == 0 {
            return Err(SketchError::EmptyDigest);
        }

        let mut nodes: Vec<(u64, u64, u64)> = self
            .counts
            .iter()
            .map(|(&(level, idx), &count)| {
                let (lo, hi) = node_range(level, idx);
                (lo, hi, count)
            })
            .collect();
        nodes.sort_by_key(|&(lo, _, _)| lo);

        let target = (p * self.total as f64).floor() as u64;
        let mut cumulative = 0u64;
        for (lo, hi, count) in &nodes {
            cumulative += count;
            if cumulative >= target.max(1) {
                let range_size = (hi - lo + 1) as f64;
                let overshoot = (cumulative as f64 - target as f64) / *count as f64;
                let fraction = (1.0 - overshoot).clamp(0.0, 1.0);
                return Ok(*lo as f64 + fraction * (range_size - 1.0));
            }
        }
        Ok(nodes.last().map(|&(_, hi, _)| hi as f64).unwrap_or(0.0))
    }

    /// Estimated fraction of inserted values that are `<= value`.
    ///
    /// # Errors
    /// Returns [`SketchError::InvalidParameter`] if `value >= universe`, or
    /// [`SketchError::EmptyDigest`] if no value has been inserted.
    pub fn rank(&self, value: u64) -> Result<f64> {
        if value >= self.universe {
            return Err(SketchError::InvalidParameter {
                param: "value".to_string(),
                value: value.to_string(),
                constraint: format!("must be less than universe size {}", self.universe),
            });
        }
        if self.total == 0 {
            return Err(SketchError::EmptyDigest);
        }

        let mut below = 0.0f64;
        for (&(level, idx), &count) in &self.counts {
            let (lo, hi) = node_range(level, idx);
            if hi < value {
                below += count as f64;
            } else if lo <= value {
                let range_size = (hi - lo + 1) as f64;
                let fraction = (value - lo + 1) as f64 / range_size;
                below += count as f64 * fraction;
            }
        }
        Ok((below / self.total as f64).clamp(0.0, 1.0))
    }

    /// Merge `other`'s nodes into `self`, re-inserting each by its range's
    /// representative midpoint with its stored multiplicity.
    ///
    /// # Errors
    /// Returns [`SketchError::IncompatibleDimensions`] if compression
    /// factor or universe size differ.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if self.compression_factor != other.compression_factor || self.universe != other.universe {
            return Err(SketchError::IncompatibleDimensions {
                reason: format!(
                    "q-digest dimensions differ: (factor={}, universe={}) vs (factor={}, universe={})",
                    self.compression_factor, self.universe, other.compression_factor, other.universe
                ),
            });
        }
        for (&(level, idx), &count) in &other.counts {
            let (lo, hi) = node_range(level, idx);
            let representative = lo + (hi - lo) / 2;
            self.add_weighted(representative, count)?;
        }
        Ok(())
    }

    /// Reset to the empty digest.
    pub fn clear(&mut self) {
        self.counts.clear();
        self.total = 0;
    }
}

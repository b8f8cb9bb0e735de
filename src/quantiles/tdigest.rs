//! t-digest: streaming quantile estimation with high accuracy at
//! distribution tails (Dunning & Ertl 2019).
//!
//! Values are kept as a set of (mean, weight) centroids. When the
//! uncompressed centroid count exceeds `max_discrete`, adjacent centroids
//! whose mean gap and combined weight are both small enough get merged,
//! keeping centroids tight near the tails and coarser in the middle.
//!
//! # Example
//! ```
//! use sketch_forge::quantiles::TDigest;
//!
//! let mut td = TDigest::new_default();
//! for i in 0..1000 {
//!     td.add(i as f64).unwrap();
//! }
//! let median = td.quantile(0.5).unwrap();
//! assert!((median - 500.0).abs() < 50.0);
//! ```

use crate::common::validation::{validate_percentile, validate_tdigest_compression};
use crate::common::{Result, SketchError};
use std::cmp::Ordering;

#[derive(Clone, Debug)]
struct Centroid {
    mean: f64,
    weight: u64,
}

impl Centroid {
    fn merge(&mut self, other: &Centroid) {
        let new_weight = self.weight + other.weight;
        self.mean += (other.mean - self.mean) * (other.weight as f64) / (new_weight as f64);
        self.weight = new_weight;
    }
}

/// A t-digest for approximate quantile and CDF queries over a stream of
/// weighted real values.
#[derive(Clone, Debug)]
pub struct TDigest {
    delta: f64,
    centroids: Vec<Centroid>,
    total_weight: u64,
    max_discrete: usize,
}

impl TDigest {
    /// Centroid count above which an `add` triggers a compression pass.
    pub const DEFAULT_MAX_DISCRETE: usize = 25;

    /// The compression parameter [`TDigest::new_default`] uses.
    pub const DEFAULT_COMPRESSION: f64 = 100.0;

    /// Construct an empty digest with compression parameter `delta`.
    ///
    /// # Errors
    /// Returns [`SketchError::InvalidParameter`] if `delta` is outside
    /// `[10.0, 1000.0]`.
    pub fn new(delta: f64) -> Result<Self> {
        validate_tdigest_compression(delta)?;
        Ok(TDigest {
            delta,
            centroids: Vec::new(),
            total_weight: 0,
            max_discrete: Self::DEFAULT_MAX_DISCRETE,
        })
    }

    /// Construct an empty digest with [`Self::DEFAULT_COMPRESSION`].
    pub fn new_default() -> Self {
        Self::new(Self::DEFAULT_COMPRESSION).expect("default compression is in range")
    }

    /// The compression parameter this digest was constructed with.
    pub fn compression(&self) -> f64 {
        self.delta
    }

    /// Number of centroids currently held.
    pub fn centroid_count(&self) -> usize {
        self.centroids.len()
    }

    /// Total weight of all values added.
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Total weight of all values added, same as [`Self::total_weight`].
    pub fn size(&self) -> u64 {
        self.total_weight
    }

    /// Whether no value has been added.
    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    /// Add `value` with weight 1. See [`Self::add_weighted`] for weighted
    /// samples.
    ///
    /// # Errors
    /// Returns [`SketchError::InvalidParameter`] if `value` is not finite.
    pub fn add(&mut self, value: f64) -> Result<()> {
        self.add_weighted(value, 1)
    }

    /// Add `value` with the given `weight`, compressing if the centroid
    /// count exceeds `max_discrete`.
    ///
    /// # Errors
    /// Returns [`SketchError::InvalidParameter`] if `value` is not finite
    /// or `weight` is zero.
    pub fn add_weighted(&mut self, value: f64, weight: u64) -> Result<()> {
        if !value.is_finite() {
            return Err(SketchError::InvalidParameter {
                param: "value".to_string(),
                value: value.to_string(),
                constraint: "must be finite".to_string(),
            });
        }
        if weight == 0 {
            return Err(SketchError::InvalidParameter {
                param: "weight".to_string(),
                value: "0".to_string(),
                constraint: "must be greater than 0".to_string(),
            });
        }
        self.centroids.push(Centroid { mean: value, weight });
        self.total_weight += weight;
        if self.centroids.len() > self.max_discrete {
            self.compress();
        }
        Ok(())
    }

    /// Sort centroids by mean, then merge adjacent pairs whose mean gap is
    /// below `100/delta` and whose combined weight is below
    /// `total_weight * 2/delta`. Idempotent: compressing an already-
    /// compressed digest is a no-op beyond the sort.
    pub fn compress(&mut self) {
        if self.centroids.len() <= 1 {
            return;
        }
        self.centroids
            .sort_by(|a, b| a.mean.partial_cmp(&b.mean).unwrap_or(Ordering::Equal));

        let mut merged = Vec::with_capacity(self.centroids.len());
        let mut current = self.centroids[0].clone();
        let gap_limit = 100.0 / self.delta;
        let weight_limit = self.total_weight as f64 * 2.0 / self.delta;

        for next in self.centroids.iter().skip(1) {
            let gap = next.mean - current.mean;
            let combined_weight = (current.weight + next.weight) as f64;
            if gap < gap_limit && combined_weight < weight_limit {
                current.merge(next);
            } else {
                merged.push(current);
                current = next.clone();
            }
        }
        merged.push(current);
        self.centroids = merged;
    }

    /// Each centroid's cumulative weight at its own midpoint, used to
    /// interpolate both `quantile` and `cdf`.
    fn midpoints(&self) -> Vec<f64> {
        let mut cumulative = 0.0;
        self.centroids
            .iter()
            .map(|c| {
                let mid = cumulative + c.weight as f64 / 2.0;
                cumulative += c.weight as f64;
                mid
            })
            .collect()
    }

    /// Estimated value at quantile `p`.
    ///
    /// # Errors
    /// Returns [`SketchError::InvalidParameter`] if `p` is outside
    /// `[0.0, 1.0]`, or [`SketchError::EmptyDigest`] if no value has been
    /// added.
    pub fn quantile(&mut self, p: f64) -> Result<f64> {
        validate_percentile(p)?;
        self.compress();
        if self.centroids.is_empty() {
            return Err(SketchError::EmptyDigest);
        }
        if p <= 0.0 {
            return Ok(self.centroids.first().expect("checked non-empty").mean);
        }
        if p >= 1.0 {
            return Ok(self.centroids.last().expect("checked non-empty").mean);
        }

        let target = p * self.total_weight as f64;
        let midpoints = self.midpoints();

        if target <= midpoints[0] {
            return Ok(self.centroids[0].mean);
        }
        if target >= *midpoints.last().expect("checked non-empty") {
            return Ok(self.centroids.last().expect("checked non-empty").mean);
        }

        for i in 0..midpoints.len() - 1 {
            if target >= midpoints[i] && target <= midpoints[i + 1] {
                let fraction = (target - midpoints[i]) / (midpoints[i + 1] - midpoints[i]);
                let (a, b) = (self.centroids[i].mean, self.centroids[i + 1].mean);
                return Ok(a + (b - a) * fraction);
            }
        }
        Ok(self.centroids.last().expect("checked non-empty").mean)
    }

    /// Estimated fraction of added values that are `<= value`.
    ///
    /// # Errors
    /// Returns [`SketchError::EmptyDigest`] if no value has been added.
    pub fn cdf(&mut self, value: f64) -> Result<f64> {
        self.compress();
        if self.centroids.is_empty() {
            return Err(SketchError::EmptyDigest);
        }
        let first = self.centroids.first().expect("checked non-empty").mean;
        let last = self.centroids.last().expect("checked non-empty").mean;
        if value < first {
            return Ok(0.0);
        }
        if value > last {
            return Ok(1.0);
        }

        let midpoints = self.midpoints();
        for i in 0..self.centroids.len() - 1 {
            let (mean_lo, mean_hi) = (self.centroids[i].mean, self.centroids[i + 1].mean);
            if value >= mean_lo && value <= mean_hi {
                let fraction = if mean_hi > mean_lo {
                    (value - mean_lo) / (mean_hi - mean_lo)
                } else {
                    0.0
                };
                let position = midpoints[i] + fraction * (midpoints[i + 1] - midpoints[i]);
                return Ok((position / self.total_weight as f64).clamp(0.0, 1.0));
            }
        }
        Ok(1.0)
    }

    /// Merge `other` into `self` by re-adding each of its centroids as a
    /// weighted sample.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        let mut incoming = other.clone();
        incoming.compress();
        for c in incoming.centroids {
            self.add_weighted(c.mean, c.weight)?;
        }
        Ok(())
    }

    /// Reset to the empty digest.
    pub fn clear(&mut self) {
        self.centroids.clear();
        self.total_weight = 0;
    }
}

//! Count-Min sketch: frequency estimation over a stream of byte-string
//! keys (Cormode & Muthukrishnan, 2003).
//!
//! A `depth × width` counter matrix. Each update hashes an item to one
//! column per row and increments it; `estimate` takes the minimum across
//! rows, which never underestimates the true count but may overestimate
//! due to collisions.
//!
//! # Example
//! ```
//! use sketch_forge::frequency::CountMinSketch;
//!
//! let mut cms = CountMinSketch::new_with_error(0.01, 0.01).unwrap();
//! cms.update(b"apple");
//! cms.update(b"apple");
//! cms.update(b"banana");
//!
//! assert!(cms.estimate(b"apple") >= 2);
//! assert!(cms.estimate(b"banana") >= 1);
//! assert_eq!(cms.estimate(b"cherry"), 0);
//! ```

use crate::common::hash::{double_hash_index, hash_pair_cm};
use crate::common::validation::{validate_probability, validate_width_depth};
use crate::common::{Result, SketchError};

/// An unsigned counter type a [`CountMinSketch`] can use for its cells.
pub trait Counter: Copy + Eq + Ord + std::fmt::Debug {
    /// The zero value every cell starts at.
    const ZERO: Self;

    /// The largest representable value, the saturation ceiling.
    const MAX: Self;

    /// Add one, saturating at [`Self::MAX`].
    fn saturating_increment(self) -> Self;

    /// Add `count`, saturating at [`Self::MAX`].
    fn saturating_add_u64(self, count: u64) -> Self;

    /// Add `other`, saturating at [`Self::MAX`].
    fn saturating_add_counter(self, other: Self) -> Self;

    /// Widen to `u64` for reporting.
    fn to_u64(self) -> u64;
}

macro_rules! impl_counter {
    ($t:ty) => {
        impl Counter for $t {
            const ZERO: $t = 0;
            const MAX: $t = <$t>::MAX;

            fn saturating_increment(self) -> Self {
                self.saturating_add(1)
            }

            fn saturating_add_u64(self, count: u64) -> Self {
                let count = count.min(<$t>::MAX as u64) as $t;
                self.saturating_add(count)
            }

            fn saturating_add_counter(self, other: Self) -> Self {
                self.saturating_add(other)
            }

            fn to_u64(self) -> u64 {
                self as u64
            }
        }
    };
}

impl_counter!(u8);
impl_counter!(u16);
impl_counter!(u32);
impl_counter!(u64);

/// A Count-Min sketch for approximate frequency counting, generic over the
/// unsigned cell type `C`.
#[derive(Clone, Debug)]
pub struct CountMinSketch<C: Counter = u64> {
    width: u32,
    depth: u32,
    table: Vec<C>,
}

impl<C: Counter> CountMinSketch<C> {
    /// Construct with an explicit `width` (columns per row) and `depth`
    /// (number of rows).
    pub fn new(width: u32, depth: u32) -> Result<Self> {
        validate_width_depth(width, depth)?;
        Ok(CountMinSketch {
            width,
            depth,
            table: vec![C::ZERO; (width as usize) * (depth as usize)],
        })
    }

    /// Construct from error bounds: `width = ⌈e/ε⌉`, `depth = ⌈ln(1/δ)⌉`.
    /// With probability `1 - δ`, `estimate` overshoots the true count by at
    /// most `ε` times the total number of updates.
    pub fn new_with_error(epsilon: f64, delta: f64) -> Result<Self> {
        validate_probability(epsilon, "epsilon")?;
        validate_probability(delta, "delta")?;
        let width = (std::f64::consts::E / epsilon).ceil() as u32;
        let depth = ((1.0 / delta).ln().ceil() as u32).max(1);
        Self::new(width, depth)
    }

    /// Width (columns per row).
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Depth (number of rows).
    pub fn depth(&self) -> u32 {
        self.depth
    }

    fn columns(&self, item: &[u8]) -> impl Iterator<Item = (u32, u64)> + '_ {
        let (h1, h2) = hash_pair_cm(item);
        (0..self.depth).map(move |row| {
            let col = double_hash_index(h1, h2, u64::from(row), u64::from(self.width));
            (row, col)
        })
    }

    /// Increment `item`'s counters by one in every row, saturating at
    /// `C::MAX`.
    pub fn update(&mut self, item: &[u8]) {
        for (row, col) in self.columns(item).collect::<Vec<_>>() {
            let idx = row as usize * self.width as usize + col as usize;
            self.table[idx] = self.table[idx].saturating_increment();
        }
    }

    /// Increment `item`'s counters by `count` in every row, saturating at
    /// `C::MAX`.
    pub fn update_by(&mut self, item: &[u8], count: u64) {
        for (row, col) in self.columns(item).collect::<Vec<_>>() {
            let idx = row as usize * self.width as usize + col as usize;
            self.table[idx] = self.table[idx].saturating_add_u64(count);
        }
    }

    /// Estimated frequency of `item`: the minimum counter across its `d`
    /// hashed columns. Never underestimates the true count.
    pub fn estimate(&self, item: &[u8]) -> u64 {
        self.columns(item)
            .map(|(row, col)| self.table[row as usize * self.width as usize + col as usize])
            .min()
            .map(Counter::to_u64)
            .unwrap_or(0)
    }

    /// Whether every counter is still zero.
    pub fn is_empty(&self) -> bool {
        self.table.iter().all(|&c| c == C::ZERO)
    }

    /// Reset every counter to zero.
    pub fn clear(&mut self) {
        for cell in &mut self.table {
            *cell = C::ZERO;
        }
    }

    /// Sum every counter in `other` into the matching cell of `self`.
    ///
    /// # Errors
    /// Returns [`SketchError::IncompatibleDimensions`] if `(width, depth)`
    /// differ.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if self.width != other.width || self.depth != other.depth {
            return Err(SketchError::IncompatibleDimensions {
                reason: format!(
                    "Count-Min dimensions differ: ({}, {}) vs ({}, {})",
                    self.width, self.depth, other.width, other.depth
                ),
            });
        }
        for (a, &b) in self.table.iter_mut().zip(other.table.iter()) {
            *a = a.saturating_add_counter(b);
        }
        Ok(())
    }

    /// Size of the backing storage in bytes.
    pub fn memory_usage(&self) -> usize {
        self.table.len() * std::mem::size_of::<C>()
    }
}

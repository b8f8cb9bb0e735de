//! HyperLogLog: cardinality estimation via the rank of a hashed suffix
//! (Flajolet et al. 2007).
//!
//! Each item hashes to a 32-bit value; the top `p` bits select one of
//! `2^p` registers, and the remaining bits' leading-zero count (plus one)
//! is stored as that register's rank if it exceeds the current value. The
//! harmonic mean of `2^-rank` across registers, with bias correction,
//! estimates the number of distinct items seen.
//!
//! # Example
//! ```
//! use sketch_forge::cardinality::HyperLogLog;
//!
//! let mut hll = HyperLogLog::new(12).unwrap();
//! hll.add(b"user_123");
//! hll.add(b"user_456");
//! hll.add(b"user_123"); // duplicate
//!
//! assert!((hll.estimate() - 2.0).abs() < 1.0);
//! ```

use crate::common::hash::murmur3_hash;
use crate::common::validation::validate_precision;
use crate::common::{Result, SketchError};

/// A HyperLogLog sketch for approximate cardinality estimation.
#[derive(Clone, Debug)]
pub struct HyperLogLog {
    precision: u8,
    registers: Vec<u8>,
}

impl HyperLogLog {
    /// Minimum supported precision.
    pub const MIN_PRECISION: u8 = 4;
    /// Maximum supported precision.
    pub const MAX_PRECISION: u8 = 16;

    /// Allocate `2^precision` registers.
    ///
    /// # Errors
    /// Returns [`SketchError::InvalidParameter`] if `precision` is outside
    /// `[4, 16]`.
    pub fn new(precision: u8) -> Result<Self> {
        validate_precision(precision)?;
        Ok(HyperLogLog {
            precision,
            registers: vec![0u8; 1usize << precision],
        })
    }

    /// Precision this sketch was constructed with.
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Number of registers (`2^precision`).
    pub fn num_registers(&self) -> usize {
        1usize << self.precision
    }

    /// Approximate relative standard error, `1.04 / sqrt(m)`.
    pub fn standard_error(&self) -> f64 {
        1.04 / (self.num_registers() as f64).sqrt()
    }

    /// Record an observation of `item`.
    pub fn add(&mut self, item: &[u8]) {
        let hash = murmur3_hash(item, 0);
        let idx = (hash >> (32 - u32::from(self.precision))) as usize;
        let w = hash << self.precision;
        let rank = (1 + w.leading_zeros()).min(31) as u8;
        if rank > self.registers[idx] {
            self.registers[idx] = rank;
        }
    }

    fn alpha(&self) -> f64 {
        let m = self.num_registers() as f64;
        match self.num_registers() {
            16 => 0.673,
            32 => 0.697,
            64 => 0.709,
            _ => 0.7213 / (1.0 + 1.079 / m),
        }
    }

    fn raw_estimate(&self) -> f64 {
        let m = self.num_registers() as f64;
        let sum: f64 = self.registers.iter().map(|&r| 2.0_f64.powi(-(i32::from(r)))).sum();
        self.alpha() * m * m / sum
    }

    fn count_zeros(&self) -> usize {
        self.registers.iter().filter(|&&r| r == 0).count()
    }

    /// Estimated count of distinct items added, with small- and
    /// large-range bias correction per the original paper.
    pub fn estimate(&self) -> f64 {
        let m = self.num_registers() as f64;
        let raw = self.raw_estimate();

        if raw <= 2.5 * m {
            let zeros = self.count_zeros();
            if zeros > 0 {
                return (m * (m / zeros as f64).ln()).max(0.0);
            }
        }

        let two_pow_32 = (1u64 << 32) as f64;
        let estimate = if raw > two_pow_32 / 30.0 {
            -two_pow_32 * (1.0 - raw / two_pow_32).ln()
        } else {
            raw
        };
        estimate.max(0.0)
    }

    /// Whether every register is still zero.
    pub fn is_empty(&self) -> bool {
        self.registers.iter().all(|&r| r == 0)
    }

    /// Reset every register to zero.
    pub fn clear(&mut self) {
        for reg in &mut self.registers {
            *reg = 0;
        }
    }

    /// Merge `other`'s registers into `self`'s, register-wise maximum.
    ///
    /// # Errors
    /// Returns [`SketchError::IncompatiblePrecision`] if precisions differ.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if self.precision != other.precision {
            return Err(SketchError::IncompatiblePrecision {
                expected: self.precision,
                found: other.precision,
            });
        }
        for (a, &b) in self.registers.iter_mut().zip(other.registers.iter()) {
            if b > *a {
                *a = b;
            }
        }
        Ok(())
    }

    /// Size of the backing storage in bytes.
    pub fn memory_usage(&self) -> usize {
        self.registers.len()
    }

    /// Direct read access to the register array.
    pub fn registers(&self) -> &[u8] {
        &self.registers
    }
}

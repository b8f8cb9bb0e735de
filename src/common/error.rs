//! Error types for sketch operations

use std::fmt;

/// Errors that can occur during sketch construction, mutation, or querying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SketchError {
    /// A parameter to a constructor or mutator fell outside its allowed
    /// domain (capacity, probability, width/depth, precision, compression,
    /// universe size, and similar).
    InvalidParameter {
        /// Parameter name.
        param: String,
        /// Invalid value provided, rendered for display.
        value: String,
        /// Constraint that was violated.
        constraint: String,
    },

    /// An index into a bit array or counting array fell outside
    /// `0..length`.
    InvalidIndex {
        /// Index that was requested.
        index: usize,
        /// Length of the backing array.
        length: usize,
    },

    /// A counter would have exceeded its maximum representable value.
    CounterOverflow {
        /// Index of the counter that overflowed.
        index: usize,
    },

    /// A counter would have gone below zero.
    CounterUnderflow {
        /// Index of the counter that underflowed.
        index: usize,
    },

    /// A Cuckoo filter exhausted its eviction budget without finding a
    /// free slot.
    FilterFull,

    /// Two sketches cannot be merged because their dimensions
    /// (width/depth, bucket count, quotient/remainder split, and so on)
    /// differ.
    IncompatibleDimensions {
        /// Human-readable explanation of the mismatch.
        reason: String,
    },

    /// Two HyperLogLog sketches cannot be merged because their
    /// precisions differ.
    IncompatiblePrecision {
        /// Precision of `self`.
        expected: u8,
        /// Precision of the sketch passed to `merge`.
        found: u8,
    },

    /// A quantile or rank was requested from a digest that has never
    /// observed a value.
    EmptyDigest,
}

impl fmt::Display for SketchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SketchError::InvalidParameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "invalid parameter '{param}': value '{value}' {constraint}"
                )
            }
            SketchError::InvalidIndex { index, length } => {
                write!(f, "index {index} out of bounds for length {length}")
            }
            SketchError::CounterOverflow { index } => {
                write!(f, "counter at index {index} overflowed")
            }
            SketchError::CounterUnderflow { index } => {
                write!(f, "counter at index {index} underflowed")
            }
            SketchError::FilterFull => {
                write!(f, "filter is full: eviction budget exhausted")
            }
            SketchError::IncompatibleDimensions { reason } => {
                write!(f, "incompatible dimensions: {reason}")
            }
            SketchError::IncompatiblePrecision { expected, found } => {
                write!(
                    f,
                    "incompatible precision: expected {expected}, found {found}"
                )
            }
            SketchError::EmptyDigest => {
                write!(f, "digest is empty")
            }
        }
    }
}

impl std::error::Error for SketchError {}

/// Result type alias for sketch operations.
pub type Result<T> = std::result::Result<T, SketchError>;

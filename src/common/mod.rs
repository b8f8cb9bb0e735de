//! Shared primitives: errors, hashing, validation, and the L0 packed
//! containers every higher-level structure is built from.

pub mod bitarray;
pub mod counting_bitarray;
mod error;
pub mod hash;
pub mod rng;
pub mod validation;

pub use bitarray::BitArray;
pub use counting_bitarray::{CounterWidth, CountingBitArray};
pub use error::{Result, SketchError};
pub use rng::{DefaultRandomSource, RandomSource};

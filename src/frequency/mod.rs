//! Frequency estimation algorithms.

mod count_min;

pub use count_min::{Counter, CountMinSketch};

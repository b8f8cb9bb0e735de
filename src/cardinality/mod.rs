//! Cardinality estimation.
//!
//! [`HyperLogLog`] estimates the number of distinct items observed using
//! `2^p` leading-zero-rank registers and a bias-corrected harmonic-mean
//! estimator.

mod hyperloglog;

pub use hyperloglog::HyperLogLog;

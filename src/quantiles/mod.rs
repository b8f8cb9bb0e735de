//! Quantile (percentile) estimation over a stream of values.
//!
//! # Choosing an Algorithm
//!
//! ## t-digest
//!
//! **Use when:**
//! - You need accurate tail quantiles (p99, p99.9) over real-valued data
//! - You need mergeable sketches from distributed producers
//!
//! **Characteristics:**
//! - Centroid compression parameterized by `δ`, tighter centroids near the
//!   tails than the middle of the distribution
//! - Merge by re-inserting the other digest's centroids as weighted samples
//!
//! ```
//! use sketch_forge::quantiles::TDigest;
//!
//! let mut digest = TDigest::new(100.0).unwrap();
//! for v in 1..=100 {
//!     digest.add(v as f64).unwrap();
//! }
//! let median = digest.quantile(0.5).unwrap();
//! assert!((45.0..=55.0).contains(&median));
//! ```
//!
//! ## q-digest
//!
//! **Use when:**
//! - Input values are bounded integers over a known universe (latencies in
//!   microseconds, small counters) and you want a compact rank/quantile
//!   summary with a tunable compression factor.

mod qdigest;
mod tdigest;

pub use qdigest::QDigest;
pub use tdigest::TDigest;

//! Approximate set-membership filters.
//!
//! Every filter here keys on opaque byte strings, never produces a false
//! negative for an item it has accepted, and may produce false positives
//! at a rate controlled by its parameters.

mod bloom;
mod counting_bloom;
mod cuckoo;
mod quotient;
mod scalable_bloom;

pub use bloom::BloomFilter;
pub use counting_bloom::CountingBloomFilter;
pub use cuckoo::{CuckooFilter, Fingerprint};
pub use quotient::QuotientFilter;
pub use scalable_bloom::ScalableBloomFilter;

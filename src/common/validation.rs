//! Parameter bounds checking shared across constructors.

use crate::common::{Result, SketchError};

/// Maximum capacity for any sketch (2^31 - 1, ~2.1 billion items).
pub const MAX_CAPACITY: u64 = (1u64 << 31) - 1;

/// Validate that a HyperLogLog precision is within its required range [4, 16].
pub fn validate_precision(precision: u8) -> Result<()> {
    if !(4..=16).contains(&precision) {
        return Err(SketchError::InvalidParameter {
            param: "precision".to_string(),
            value: precision.to_string(),
            constraint: "must be in range [4, 16]".to_string(),
        });
    }
    Ok(())
}

/// Validate that capacity is positive and within safety limits.
pub fn validate_capacity(capacity: u64) -> Result<()> {
    if capacity == 0 {
        return Err(SketchError::InvalidParameter {
            param: "capacity".to_string(),
            value: capacity.to_string(),
            constraint: "must be greater than 0".to_string(),
        });
    }
    if capacity > MAX_CAPACITY {
        return Err(SketchError::InvalidParameter {
            param: "capacity".to_string(),
            value: capacity.to_string(),
            constraint: format!("must not exceed {MAX_CAPACITY}"),
        });
    }
    Ok(())
}

/// Validate that a value is a valid probability (0.0 < p < 1.0).
/// Used for epsilon (error rate) and delta (confidence) parameters.
pub fn validate_probability(value: f64, param_name: &str) -> Result<()> {
    if !(value > 0.0 && value < 1.0) {
        return Err(SketchError::InvalidParameter {
            param: param_name.to_string(),
            value: value.to_string(),
            constraint: "must be in range (0.0, 1.0) exclusive".to_string(),
        });
    }
    Ok(())
}

/// Validate a percentile/quantile argument is within [0.0, 1.0].
pub fn validate_percentile(value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SketchError::InvalidParameter {
            param: "percentile".to_string(),
            value: value.to_string(),
            constraint: "must be in range [0.0, 1.0]".to_string(),
        });
    }
    Ok(())
}

/// Validate width and depth for a Count-Min sketch; both must be non-zero
/// and within a generous safety bound.
pub fn validate_width_depth(width: u32, depth: u32) -> Result<()> {
    const MAX_DIM: u32 = 1 << 20;

    if width == 0 {
        return Err(SketchError::InvalidParameter {
            param: "width".to_string(),
            value: width.to_string(),
            constraint: "must be greater than 0".to_string(),
        });
    }
    if width > MAX_DIM {
        return Err(SketchError::InvalidParameter {
            param: "width".to_string(),
            value: width.to_string(),
            constraint: format!("must not exceed {MAX_DIM}"),
        });
    }

    if depth == 0 {
        return Err(SketchError::InvalidParameter {
            param: "depth".to_string(),
            value: depth.to_string(),
            constraint: "must be greater than 0".to_string(),
        });
    }
    if depth > MAX_DIM {
        return Err(SketchError::InvalidParameter {
            param: "depth".to_string(),
            value: depth.to_string(),
            constraint: format!("must not exceed {MAX_DIM}"),
        });
    }

    Ok(())
}

/// Validate Bloom-family parameters (capacity, bit array size, hash count).
pub fn validate_bloom_parameters(n: u64, m: u64, k: u32) -> Result<()> {
    validate_capacity(n)?;

    if m == 0 {
        return Err(SketchError::InvalidParameter {
            param: "m (bit array size)".to_string(),
            value: m.to_string(),
            constraint: "must be greater than 0".to_string(),
        });
    }
    if m > (1u64 << 32) {
        return Err(SketchError::InvalidParameter {
            param: "m (bit array size)".to_string(),
            value: m.to_string(),
            constraint: "must not exceed 2^32".to_string(),
        });
    }

    if k == 0 || k > 255 {
        return Err(SketchError::InvalidParameter {
            param: "k (hash functions)".to_string(),
            value: k.to_string(),
            constraint: "must be in range [1, 255]".to_string(),
        });
    }

    Ok(())
}

/// Validate a t-digest compression parameter, required to be in [10, 1000].
pub fn validate_tdigest_compression(delta: f64) -> Result<()> {
    if !(10.0..=1000.0).contains(&delta) {
        return Err(SketchError::InvalidParameter {
            param: "compression".to_string(),
            value: delta.to_string(),
            constraint: "must be in range [10.0, 1000.0]".to_string(),
        });
    }
    Ok(())
}

/// Validate a q-digest compression factor, required to be in [1, 1000].
pub fn validate_qdigest_compression(factor: u32) -> Result<()> {
    if !(1..=1000).contains(&factor) {
        return Err(SketchError::InvalidParameter {
            param: "compression_factor".to_string(),
            value: factor.to_string(),
            constraint: "must be in range [1, 1000]".to_string(),
        });
    }
    Ok(())
}

/// Validate a q-digest universe size: must be a positive power of two.
pub fn validate_universe_size(universe: u64) -> Result<()> {
    if universe == 0 || !universe.is_power_of_two() {
        return Err(SketchError::InvalidParameter {
            param: "universe".to_string(),
            value: universe.to_string(),
            constraint: "must be a positive power of two".to_string(),
        });
    }
    Ok(())
}

/// Validate the combined bit width of a quotient filter's quotient and
/// remainder fields.
pub fn validate_quotient_parameters(quotient_bits: u8, remainder_bits: u8) -> Result<()> {
    if quotient_bits == 0 {
        return Err(SketchError::InvalidParameter {
            param: "quotient_bits".to_string(),
            value: quotient_bits.to_string(),
            constraint: "must be greater than 0".to_string(),
        });
    }
    if remainder_bits == 0 {
        return Err(SketchError::InvalidParameter {
            param: "remainder_bits".to_string(),
            value: remainder_bits.to_string(),
            constraint: "must be greater than 0".to_string(),
        });
    }
    if u16::from(quotient_bits) + u16::from(remainder_bits) > 63 {
        return Err(SketchError::InvalidParameter {
            param: "quotient_bits + remainder_bits".to_string(),
            value: (quotient_bits as u16 + remainder_bits as u16).to_string(),
            constraint: "must not exceed 63".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_precision_valid() {
        assert!(validate_precision(4).is_ok());
        assert!(validate_precision(10).is_ok());
        assert!(validate_precision(16).is_ok());
    }

    #[test]
    fn test_validate_precision_invalid() {
        assert!(validate_precision(3).is_err());
        assert!(validate_precision(17).is_err());
    }

    #[test]
    fn test_validate_capacity_valid() {
        assert!(validate_capacity(1).is_ok());
        assert!(validate_capacity(1_000_000).is_ok());
        assert!(validate_capacity(MAX_CAPACITY).is_ok());
    }

    #[test]
    fn test_validate_capacity_invalid() {
        assert!(validate_capacity(0).is_err());
        assert!(validate_capacity(MAX_CAPACITY + 1).is_err());
    }

    #[test]
    fn test_validate_probability_valid() {
        assert!(validate_probability(0.1, "epsilon").is_ok());
        assert!(validate_probability(0.99, "delta").is_ok());
    }

    #[test]
    fn test_validate_probability_invalid() {
        assert!(validate_probability(0.0, "epsilon").is_err());
        assert!(validate_probability(1.0, "delta").is_err());
    }

    #[test]
    fn test_validate_percentile() {
        assert!(validate_percentile(0.0).is_ok());
        assert!(validate_percentile(1.0).is_ok());
        assert!(validate_percentile(-0.1).is_err());
        assert!(validate_percentile(1.1).is_err());
    }

    #[test]
    fn test_validate_bloom_parameters_valid() {
        assert!(validate_bloom_parameters(1000, 10000, 7).is_ok());
    }

    #[test]
    fn test_validate_bloom_parameters_invalid() {
        assert!(validate_bloom_parameters(0, 10000, 7).is_err());
        assert!(validate_bloom_parameters(1000, 0, 7).is_err());
        assert!(validate_bloom_parameters(1000, 10000, 0).is_err());
    }

    #[test]
    fn test_validate_tdigest_compression() {
        assert!(validate_tdigest_compression(100.0).is_ok());
        assert!(validate_tdigest_compression(9.9).is_err());
        assert!(validate_tdigest_compression(1000.1).is_err());
    }

    #[test]
    fn test_validate_universe_size() {
        assert!(validate_universe_size(1024).is_ok());
        assert!(validate_universe_size(100).is_err());
        assert!(validate_universe_size(0).is_err());
    }
}

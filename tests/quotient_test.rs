//! Integration tests for `QuotientFilter`'s public API.

use sketch_forge::membership::QuotientFilter;
use sketch_forge::SketchError;

#[test]
fn many_keys_round_trip_without_false_negatives() {
    let mut filter = QuotientFilter::new(12, 16).unwrap();
    let keys: Vec<Vec<u8>> = (0..1000).map(|i| format!("quotient-key-{i}").into_bytes()).collect();
    for key in &keys {
        filter.insert(key).unwrap();
    }
    for key in &keys {
        assert!(filter.contains(key), "false negative for {key:?}");
    }
}

#[test]
fn absent_key_is_usually_rejected() {
    let mut filter = QuotientFilter::new(12, 16).unwrap();
    for i in 0..200 {
        filter.insert(format!("present-{i}").as_bytes()).unwrap();
    }
    let absent: Vec<Vec<u8>> = (0..1000).map(|i| format!("absent-{i}").into_bytes()).collect();
    let false_positives = absent.iter().filter(|k| filter.contains(k)).count();
    let rate = false_positives as f64 / absent.len() as f64;
    assert!(rate < 0.05, "observed false-positive rate {rate} far exceeds expectation");
}

#[test]
fn clear_resets_membership() {
    let mut filter = QuotientFilter::new(8, 8).unwrap();
    filter.insert(b"foo").unwrap();
    filter.insert(b"bar").unwrap();
    filter.clear();
    assert!(filter.is_empty());
    assert!(!filter.contains(b"foo"));
    assert!(!filter.contains(b"bar"));
}

#[test]
fn invalid_construction_is_rejected() {
    assert!(matches!(
        QuotientFilter::new(0, 8),
        Err(SketchError::InvalidParameter { .. })
    ));
    assert!(matches!(
        QuotientFilter::new(40, 40),
        Err(SketchError::InvalidParameter { .. })
    ));
}

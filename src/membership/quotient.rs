//! Quotient filter: a compact hash table that supports approximate
//! membership without storing keys.
//!
//! A key hashes to `quotient_bits + remainder_bits` bits. The quotient
//! selects a slot's canonical position; the remainder is stored there (or,
//! if occupied, in the nearest empty slot reached by linear probing). Three
//! metadata bits per slot — `occupied`, `continuation`, `shifted` — let
//! `contains` distinguish "nothing here", "the start of a run", and "this
//! slot's data was pushed out of its own canonical position".
//!
//! The textbook quotient filter (Bender/Fan) keeps runs contiguous and
//! sorted via run-aware shifting on every insert, which makes deletion
//! tractable. This implementation instead uses plain linear probing: a
//! foreign run occupying a canonical slot is never disturbed, so deletion
//! cannot be supported without risking a false negative elsewhere. `insert`
//! followed by `contains` on the same key always returns true; the tradeoff
//! is a higher false-positive rate at high load than the textbook
//! algorithm gives.
//!
//! # Example
//! ```
//! use sketch_forge::membership::QuotientFilter;
//!
//! let mut filter = QuotientFilter::new(10, 6).unwrap();
//! filter.insert(b"foo").unwrap();
//! assert!(filter.contains(b"foo"));
//! assert!(!filter.contains(b"bar"));
//! ```

use crate::common::hash::xxhash;
use crate::common::validation::validate_quotient_parameters;
use crate::common::{Result, SketchError};

const SHIFTED_MASK: u64 = 0b001;
const CONTINUATION_MASK: u64 = 0b010;
const OCCUPIED_MASK: u64 = 0b100;
const METADATA_MASK: u64 = 0b111;
const METADATA_BITS: u32 = 3;

/// A Quotient filter for approximate set membership without deletion.
#[derive(Clone)]
pub struct QuotientFilter {
    quotient_bits: u8,
    remainder_bits: u8,
    remainder_mask: u64,
    // Each cell is laid out as `remainder << 3 | metadata`, where metadata
    // is `occupied | continuation << 1 | shifted << 2` — renamed here to
    // match METADATA_MASK's bit order: shifted is bit 0, continuation bit
    // 1, occupied bit 2.
    slots: Vec<u64>,
    len: usize,
}

impl QuotientFilter {
    /// Construct a filter with `2^quotient_bits` slots, each storing a
    /// `remainder_bits`-wide remainder.
    ///
    /// # Errors
    /// Returns [`SketchError::InvalidParameter`] if either argument is zero
    /// or their sum exceeds 63.
    pub fn new(quotient_bits: u8, remainder_bits: u8) -> Result<Self> {
        validate_quotient_parameters(quotient_bits, remainder_bits)?;
        let size = 1usize << quotient_bits;
        Ok(QuotientFilter {
            quotient_bits,
            remainder_bits,
            remainder_mask: (1u64 << remainder_bits) - 1,
            slots: vec![0u64; size],
            len: 0,
        })
    }

    /// Number of slots (`2^quotient_bits`).
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of items inserted.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the filter holds no items.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `(quotient_bits, remainder_bits)` this filter was constructed with.
    pub fn params(&self) -> (u8, u8) {
        (self.quotient_bits, self.remainder_bits)
    }

    fn split_hash(&self, item: &[u8]) -> (usize, u64) {
        let hash = xxhash(item, 0);
        let quotient = (hash >> (64 - u32::from(self.quotient_bits))) as usize;
        let remainder = hash & self.remainder_mask;
        (quotient, remainder)
    }

    fn is_empty_slot(&self, idx: usize) -> bool {
        self.slots[idx] & METADATA_MASK == 0
    }

    fn is_occupied(&self, idx: usize) -> bool {
        self.slots[idx] & OCCUPIED_MASK != 0
    }

    fn is_continuation(&self, idx: usize) -> bool {
        self.slots[idx] & CONTINUATION_MASK != 0
    }

    fn remainder_at(&self, idx: usize) -> u64 {
        self.slots[idx] >> METADATA_BITS
    }

    fn set_occupied(&mut self, idx: usize) {
        self.slots[idx] |= OCCUPIED_MASK;
    }

    fn write_remainder(&mut self, idx: usize, remainder: u64, continuation: bool, shifted: bool) {
        let occupied = self.slots[idx] & OCCUPIED_MASK;
        let mut metadata = occupied;
        if continuation {
            metadata |= CONTINUATION_MASK;
        }
        if shifted {
            metadata |= SHIFTED_MASK;
        }
        self.slots[idx] = (remainder << METADATA_BITS) | metadata;
    }

    /// Insert `item`. Writes to the canonical slot if empty; otherwise
    /// linearly probes forward for the nearest empty slot.
    ///
    /// # Errors
    /// Returns [`SketchError::FilterFull`] if every slot is occupied.
    pub fn insert(&mut self, item: &[u8]) -> Result<()> {
        let (canonical, remainder) = self.split_hash(item);
        let canonical_was_empty = self.is_empty_slot(canonical);
        self.set_occupied(canonical);

        if canonical_was_empty {
            self.write_remainder(canonical, remainder, false, false);
            self.len += 1;
            return Ok(());
        }

        let size = self.slots.len();
        let mut idx = (canonical + 1) % size;
        while !self.is_empty_slot(idx) {
            idx = (idx + 1) % size;
            if idx == canonical {
                return Err(SketchError::FilterFull);
            }
        }
        self.write_remainder(idx, remainder, true, true);
        self.len += 1;
        Ok(())
    }

    /// Whether `item` might have been inserted.
    pub fn contains(&self, item: &[u8]) -> bool {
        let (canonical, remainder) = self.split_hash(item);
        if !self.is_occupied(canonical) {
            return false;
        }
        let size = self.slots.len();
        let mut idx = canonical;
        loop {
            if self.is_empty_slot(idx) {
                return false;
            }
            if self.remainder_at(idx) == remainder {
                return true;
            }
            idx = (idx + 1) % size;
            if idx == canonical {
                return false;
            }
            if !self.is_continuation(idx) {
                return false;
            }
        }
    }

    /// Reset every slot.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = 0;
        }
        self.len = 0;
    }

    /// Size of the backing storage in bytes.
    pub fn memory_usage(&self) -> usize {
        self.slots.len() * std::mem::size_of::<u64>()
    }
}

impl std::fmt::Debug for QuotientFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotientFilter")
            .field("quotient_bits", &self.quotient_bits)
            .field("remainder_bits", &self.remainder_bits)
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}

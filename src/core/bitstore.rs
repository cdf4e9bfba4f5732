//! Packed bit vector backing standard and scalable filters.
//!
//! # Memory Layout
//!
//! Bits are packed into 64-bit words in little-endian bit order:
//!
//! ```text
//! Word 0: [bit 0][bit 1]...[bit 63]
//! Word 1: [bit 64][bit 65]...[bit 127]
//! ```
//!
//! The byte form used on the wire is the same layout cut at `⌈size/8⌉`
//! bytes: bit `i` lives in byte `i/8` at position `i%8`.
//!
//! # Performance Characteristics
//!
//! - Space: `⌈n/64⌉ * 8` bytes for `n` bits
//! - `set_indices` / `all_set`: O(k), no allocation
//! - `count_ones`: O(n/64), uses the CPU popcount instruction
//!
//! # Examples
//!
//! ```
//! use bloomy::core::BitStore;
//!
//! let mut a = BitStore::new(64).unwrap();
//! let mut b = BitStore::new(64).unwrap();
//! a.set_indices([10, 11]);
//! b.set_indices([11, 20]);
//!
//! let union = a.union(&b).unwrap();
//! assert!(union.all_set([10, 11, 20]));
//!
//! let both = a.intersect(&b).unwrap();
//! assert!(both.get(11));
//! assert_eq!(both.count_ones(), 1);
//! ```

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use crate::core::params::MAX_SIZE;
use crate::error::{BloomyError, Result};

const WORD_BITS: u64 = 64;

/// Fixed-size bit vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitStore {
    words: Vec<u64>,
    size: u64,
}

impl BitStore {
    /// Create a zeroed store of `size` bits.
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::InvalidSize`] if `size` is 0 or above the
    /// `1e9` ceiling.
    pub fn new(size: u64) -> Result<Self> {
        if size == 0 || size > MAX_SIZE {
            return Err(BloomyError::InvalidSize { size });
        }
        Ok(Self {
            words: vec![0; size.div_ceil(WORD_BITS) as usize],
            size,
        })
    }

    /// Number of bits.
    #[inline]
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[inline]
    fn locate(&self, index: u64) -> (usize, u64) {
        debug_assert!(index < self.size, "bit {} out of range {}", index, self.size);
        ((index / WORD_BITS) as usize, 1u64 << (index % WORD_BITS))
    }

    /// Set one bit.
    #[inline]
    pub fn set(&mut self, index: u64) {
        let (word, mask) = self.locate(index);
        self.words[word] |= mask;
    }

    /// Read one bit.
    #[inline]
    #[must_use]
    pub fn get(&self, index: u64) -> bool {
        let (word, mask) = self.locate(index);
        self.words[word] & mask != 0
    }

    /// Set every referenced bit. Idempotent.
    #[inline]
    pub fn set_indices<I: IntoIterator<Item = u64>>(&mut self, indices: I) {
        for index in indices {
            self.set(index);
        }
    }

    /// True iff every referenced bit is set. The membership primitive.
    #[inline]
    #[must_use]
    pub fn all_set<I: IntoIterator<Item = u64>>(&self, indices: I) -> bool {
        indices.into_iter().all(|index| self.get(index))
    }

    /// Zero all bits.
    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
    }

    /// Number of set bits.
    #[must_use]
    pub fn count_ones(&self) -> u64 {
        self.words.iter().map(|w| u64::from(w.count_ones())).sum()
    }

    /// Fraction of bits set.
    #[must_use]
    pub fn fill_ratio(&self) -> f64 {
        self.count_ones() as f64 / self.size as f64
    }

    /// Heap bytes held by the store.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.words.len() * std::mem::size_of::<u64>()
    }

    fn check_same_size(&self, other: &Self) -> Result<()> {
        if self.size != other.size {
            return Err(BloomyError::SizeMismatch {
                left: self.size,
                right: other.size,
            });
        }
        Ok(())
    }

    fn zip_with(&self, other: &Self, op: impl Fn(u64, u64) -> u64) -> Result<Self> {
        self.check_same_size(other)?;
        let words = self
            .words
            .iter()
            .zip(&other.words)
            .map(|(&a, &b)| op(a, b))
            .collect();
        Ok(Self {
            words,
            size: self.size,
        })
    }

    /// Bitwise OR into a new store.
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::SizeMismatch`] if sizes differ.
    pub fn union(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a | b)
    }

    /// Bitwise AND into a new store.
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::SizeMismatch`] if sizes differ.
    pub fn intersect(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a & b)
    }

    /// Popcount of `self & other` without allocating.
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::SizeMismatch`] if sizes differ.
    pub fn intersect_count(&self, other: &Self) -> Result<u64> {
        self.check_same_size(other)?;
        Ok(self
            .words
            .iter()
            .zip(&other.words)
            .map(|(&a, &b)| u64::from((a & b).count_ones()))
            .sum())
    }

    /// Serialize to `⌈size/8⌉` bytes, bit `i` at byte `i/8`, LSB first.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out: Vec<u8> = self.words.iter().flat_map(|w| w.to_le_bytes()).collect();
        out.truncate(self.size.div_ceil(8) as usize);
        out
    }

    /// Rebuild a store of `size` bits from [`to_bytes`](Self::to_bytes) output.
    ///
    /// Padding bits past `size` in the last byte are ignored.
    ///
    /// # Errors
    ///
    /// - [`BloomyError::InvalidSize`] if `size` is out of range
    /// - [`BloomyError::MalformedBinary`] if `bytes.len() != ⌈size/8⌉`
    pub fn from_bytes(size: u64, bytes: &[u8]) -> Result<Self> {
        if size == 0 || size > MAX_SIZE {
            return Err(BloomyError::InvalidSize { size });
        }
        let expected = size.div_ceil(8) as usize;
        if bytes.len() != expected {
            return Err(BloomyError::malformed(format!(
                "bit buffer is {} bytes, expected {} for {} bits",
                bytes.len(),
                expected,
                size
            )));
        }
        let mut store = Self::new(size)?;

        for (word, chunk) in store.words.iter_mut().zip(bytes.chunks(8)) {
            let mut buf = [0u8; 8];
            buf[..chunk.len()].copy_from_slice(chunk);
            *word = u64::from_le_bytes(buf);
        }

        let tail = size % WORD_BITS;
        if tail != 0 {
            if let Some(last) = store.words.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }
        Ok(store)
    }
}

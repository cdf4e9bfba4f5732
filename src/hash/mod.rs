//! Hashing for Bloom filters.
//!
//! # Module Structure
//!
//! ```text
//! hash/
//! ├── murmur3.rs     - MurmurHash3_x86_32 (primary hash, seed 0x9747B28C)
//! ├── fnv.rs         - FNV-1a 32-bit (secondary hash)
//! ├── strategies.rs  - Double hashing index generation
//! ├── item.rs        - BloomItem: canonical item bytes
//! └── mod.rs         - This file (HashEngine)
//! ```
//!
//! # Quick Start
//!
//! ```
//! use bloomy::hash::HashEngine;
//!
//! let indices = HashEngine::hash(b"apple", 7, 9586);
//! assert_eq!(indices, vec![6412, 9225, 2452, 5265, 8078, 1305, 4118]);
//! ```
//!
//! The two base hashes are fixed algorithms, so indices are stable across
//! platforms and releases. Encoded filters rely on this.

pub mod fnv;
pub mod item;
pub mod murmur3;
pub mod strategies;

pub use fnv::fnv1a_32;
pub use item::BloomItem;
pub use murmur3::{murmur3_32, BLOOM_SEED};
pub use strategies::{DoubleHashing, IndexIter};

/// Converts item bytes into k filter indices.
///
/// `h1 = murmur3_32(bytes, 0x9747B28C)`, `h2 = fnv1a_32(bytes)`, then
/// [`DoubleHashing`] expands the pair into `k` indices in `[0, m)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HashEngine;

impl HashEngine {
    /// The two 32-bit base hashes of `bytes`.
    #[inline]
    #[must_use]
    pub fn base_hashes(bytes: &[u8]) -> (u32, u32) {
        (murmur3_32(bytes, BLOOM_SEED), fnv1a_32(bytes))
    }

    /// Lazily yield the `k` indices of `bytes` in `[0, m)`.
    ///
    /// # Panics
    ///
    /// Panics if `m == 0`.
    #[inline]
    #[must_use]
    pub fn indices(bytes: &[u8], k: u32, m: u64) -> IndexIter {
        let (h1, h2) = Self::base_hashes(bytes);
        DoubleHashing::indices(h1, h2, k, m)
    }

    /// Indices for any [`BloomItem`].
    #[inline]
    #[must_use]
    pub fn item_indices<I: BloomItem + ?Sized>(item: &I, k: u32, m: u64) -> IndexIter {
        Self::indices(&item.item_bytes(), k, m)
    }

    /// Collected form of [`indices`](Self::indices).
    #[must_use]
    pub fn hash(bytes: &[u8], k: u32, m: u64) -> Vec<u64> {
        Self::indices(bytes, k, m).collect()
    }
}

/// Optimal hash count for `m` bits and `n` items: `max(1, round((m/n) × ln 2))`.
///
/// ```
/// use bloomy::hash::optimal_k;
///
/// assert_eq!(optimal_k(9586, 1000), 7);
/// assert_eq!(optimal_k(100, 0), 1);
/// ```
#[must_use]
pub fn optimal_k(m: u64, n: u64) -> u32 {
    crate::core::params::optimal_hash_count(m, n)
}

//! Double hashing index generation.
//!
//! # Mathematical Background
//!
//! For k indices derived from two independent 32-bit hashes h₁ and h₂
//! (Kirsch & Mitzenmacher 2006):
//!
//! ```text
//! gᵢ(x) = (h₁(x) + i·h₂'(x)) mod m,   h₂' = h₂ if h₂ ≠ 0 else 1
//! ```
//!
//! Replacing a zero step with 1 keeps the k indices from collapsing onto
//! one slot.
//!
//! The iterator advances by modular addition, so it never overflows and
//! yields exactly the values of the closed form above.
//!
//! # References
//!
//! - Kirsch, A., & Mitzenmacher, M. (2006). "Less Hashing, Same Performance: Building a Better Bloom Filter"

#![allow(clippy::module_name_repetitions)]

/// Standard double hashing strategy.
///
/// # Examples
///
/// ```
/// use bloomy::hash::DoubleHashing;
///
/// let indices: Vec<u64> = DoubleHashing::indices(10, 3, 4, 100).collect();
/// assert_eq!(indices, vec![10, 13, 16, 19]);
///
/// // A zero step is replaced by 1.
/// let indices: Vec<u64> = DoubleHashing::indices(98, 0, 4, 100).collect();
/// assert_eq!(indices, vec![98, 99, 0, 1]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleHashing;

impl DoubleHashing {
    /// Lazily generate `k` indices in `[0, m)` from base hashes `h1`, `h2`.
    ///
    /// # Panics
    ///
    /// Panics if `m == 0`.
    #[inline]
    #[must_use]
    pub fn indices(h1: u32, h2: u32, k: u32, m: u64) -> IndexIter {
        assert!(m > 0, "index range must be non-empty");
        let step = if h2 == 0 { 1 } else { u64::from(h2) };
        IndexIter {
            current: u64::from(h1) % m,
            step: step % m,
            remaining: k,
            m,
        }
    }

    /// Name for diagnostics.
    #[must_use]
    pub const fn name() -> &'static str {
        "DoubleHashing"
    }
}

/// Iterator over the k indices of one item. Allocation-free.
#[derive(Debug, Clone, Copy)]
pub struct IndexIter {
    current: u64,
    step: u64,
    remaining: u32,
    m: u64,
}

impl Iterator for IndexIter {
    type Item = u64;

    #[inline]
    fn next(&mut self) -> Option<u64> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let idx = self.current;
        // (current + step) mod m, both operands already < m.
        let gap = self.m - self.step;
        self.current = if idx >= gap {
            idx - gap
        } else {
            idx + self.step
        };
        Some(idx)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for IndexIter {}

//! Core Bloom filter trait definitions.
//!
//! These traits fix the contract every variant honours, and the shape of the
//! diagnostic record ([`FilterInfo`]) they report.
//!
//! # Design Principles
//!
//! 1. **No False Negatives**: if an item was added, `query()` MUST return `true`
//! 2. **Bounded False Positives**: the observed rate tracks the configured one
//!    up to capacity
//! 3. **Exclusive Mutation**: mutators take `&mut self`; wrap a filter in a
//!    `Mutex` or `RwLock` to share it between threads
//!
//! # Trait Hierarchy
//!
//! ```text
//! BloomFilter (add, query, clear, info)
//!     └── DeletableBloomFilter (remove; counting only)
//!
//! MergeableBloomFilter (union, intersect, similarity counts)
//! ```
//!
//! Capabilities a variant lacks are absent at compile time. The [`Filter`]
//! enum is the run-time tagged union; there a missing capability surfaces as
//! [`BloomyError::Unsupported`].
//!
//! [`Filter`]: crate::filters::Filter
//! [`BloomyError::Unsupported`]: crate::error::BloomyError::Unsupported

use crate::core::counters::CounterWidth;
use crate::error::{BloomyError, Result};
use crate::hash::BloomItem;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Capability set shared by every filter variant.
pub trait BloomFilter {
    /// Add an item. Afterwards `query(item)` is guaranteed to return `true`.
    ///
    /// # Performance
    ///
    /// * Time: O(k) where k is the number of hash functions
    /// * Space: O(1), no allocation for string and byte items
    fn add<I: BloomItem + ?Sized>(&mut self, item: &I);

    /// Add every item of `items`.
    fn add_all<I, It>(&mut self, items: It)
    where
        I: BloomItem,
        It: IntoIterator<Item = I>,
    {
        for item in items {
            self.add(&item);
        }
    }

    /// Check whether an item might be present.
    ///
    /// * `true`: the item **might** be present (could be a false positive)
    /// * `false`: the item was **definitely never** added
    #[must_use]
    fn query<I: BloomItem + ?Sized>(&self, item: &I) -> bool;

    /// Query each item, preserving order.
    #[must_use]
    fn query_batch<I: BloomItem>(&self, items: &[I]) -> Vec<bool> {
        items.iter().map(|item| self.query(item)).collect()
    }

    /// Reset to the freshly constructed state.
    fn clear(&mut self);

    /// Number of `add` calls since construction or the last `clear`.
    ///
    /// Not a distinct count: adding the same item twice counts twice.
    #[must_use]
    fn items_added(&self) -> u64;

    /// Whether nothing has been added.
    #[must_use]
    fn is_empty(&self) -> bool {
        self.items_added() == 0
    }

    /// Fraction of storage slots in use.
    #[must_use]
    fn fill_ratio(&self) -> f64;

    /// Which variant this is.
    #[must_use]
    fn kind(&self) -> FilterKind;

    /// Diagnostic snapshot.
    #[must_use]
    fn info(&self) -> FilterInfo;
}

/// Filters that support removal.
///
/// Removing an item that was never added can introduce false negatives for
/// other items that share its slots. Implementations refuse to remove items
/// that do not currently test as present.
pub trait DeletableBloomFilter: BloomFilter {
    /// Remove one occurrence of `item`.
    ///
    /// Returns `false`, leaving the filter untouched, if the item is not present.
    fn remove<I: BloomItem + ?Sized>(&mut self, item: &I) -> bool;
}

/// Filters that combine with same-shaped filters.
///
/// `union` and `intersect` never mutate either operand.
pub trait MergeableBloomFilter: Sized {
    /// Succeeds iff `self` and `other` have the same shape.
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::IncompatibleFilters`] describing the mismatch.
    fn check_compatible(&self, other: &Self) -> Result<()>;

    /// Boolean form of [`check_compatible`](Self::check_compatible).
    #[must_use]
    fn is_compatible(&self, other: &Self) -> bool {
        self.check_compatible(other).is_ok()
    }

    /// A filter holding every member of either operand.
    ///
    /// # Errors
    ///
    /// [`BloomyError::IncompatibleFilters`] on shape mismatch, or
    /// [`BloomyError::Unsupported`] if the variant cannot union.
    fn union(&self, other: &Self) -> Result<Self>;

    /// A filter approximating the members common to both operands.
    ///
    /// # Errors
    ///
    /// [`BloomyError::IncompatibleFilters`] on shape mismatch, or
    /// [`BloomyError::Unsupported`] if the variant cannot intersect.
    fn intersect(&self, other: &Self) -> Result<Self>;

    /// Number of occupied slots (set bits, non-zero counters).
    #[must_use]
    fn occupied_slots(&self) -> u64;

    /// Number of slots occupied in both filters.
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::IncompatibleFilters`] on shape mismatch.
    fn shared_slots(&self, other: &Self) -> Result<u64>;
}

/// Filter variant tag. The discriminant is the wire-format type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Bit-array filter.
    Standard = 0,
    /// Counter-array filter with deletion.
    Counting = 1,
    /// Growing sequence of standard slices.
    Scalable = 2,
}

impl FilterKind {
    /// Wire-format type byte.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Lower-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Counting => "counting",
            Self::Scalable => "scalable",
        }
    }
}

impl TryFrom<u8> for FilterKind {
    type Error = BloomyError;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Self::Standard),
            1 => Ok(Self::Counting),
            2 => Ok(Self::Scalable),
            tag => Err(BloomyError::UnknownFilterType { tag }),
        }
    }
}

impl FromStr for FilterKind {
    type Err = BloomyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "counting" => Ok(Self::Counting),
            "scalable" => Ok(Self::Scalable),
            other => Err(BloomyError::invalid_parameters(format!(
                "unknown filter type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Diagnostic snapshot of a filter.
///
/// Every field is derived from filter state, so two filters that behave the
/// same report the same info. Serializes to JSON for dashboards and logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterInfo {
    /// Variant.
    #[serde(rename = "type")]
    pub kind: FilterKind,
    /// Items the filter was sized for (sum over slices when scalable).
    pub capacity: u64,
    /// Storage slots (sum over slices when scalable).
    pub size: u64,
    /// Hash functions per item (newest slice when scalable).
    pub hash_count: u32,
    /// `add` calls so far.
    pub items_added: u64,
    /// Fraction of slots occupied.
    pub fill_ratio: f64,
    /// Configured false positive rate.
    pub target_fp_rate: f64,
    /// Design false positive rate at capacity (combined estimate when scalable).
    pub estimated_fp_rate: f64,
    /// Variant-specific fields.
    pub details: FilterDetails,
}

/// Variant-specific part of [`FilterInfo`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterDetails {
    /// Standard filter details.
    Standard {
        /// Bits currently set.
        set_bits: u64,
        /// False positive rate implied by the current fill, `fill^k`.
        current_fp_rate: f64,
    },
    /// Counting filter details.
    Counting {
        /// Counter width.
        counter_width: CounterWidth,
        /// Counters above zero.
        nonzero_counters: u64,
        /// Counters stuck at their maximum.
        saturated_counters: u64,
    },
    /// Scalable filter details.
    Scalable {
        /// Number of slices.
        slice_count: usize,
        /// Capacity of the first slice.
        initial_capacity: u64,
        /// Capacity multiplier between consecutive slices.
        growth_factor: u32,
        /// Rate multiplier between consecutive slices.
        tightening_ratio: f64,
    },
}

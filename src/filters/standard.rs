//! Standard Bloom filter implementation.
//!
//! # Algorithm
//!
//! A Bloom filter is a space-efficient probabilistic set supporting two
//! operations:
//!
//! - Add: set the k bits an item hashes to (irreversible)
//! - Query: report whether all k bits are set
//!
//! # Properties
//!
//! - **False positives**: possible (controllable via parameters)
//! - **False negatives**: never occur
//! - **Space efficiency**: ~9.6 bits per element for 1% FP rate
//! - **Time complexity**: O(k) for both add and query
//!
//! # Mathematical Foundation
//!
//! Given:
//! - n = capacity
//! - p = desired false positive rate
//!
//! Optimal parameters:
//! - m = ⌈-n × ln(p) / (ln(2)²)⌉ (filter size in bits)
//! - k = round((m/n) × ln(2)) (number of hash functions)
//!
//! Actual false positive rate:
//! - p_actual = (1 - e^(-kn/m))^k
//!
//! # Merging
//!
//! Two filters with the same `(size, hash_count)` combine bitwise. After a
//! union, `items_added` is the sum of both inputs, an overestimate when the
//! inputs share members. After an intersection it is estimated from the
//! intersected fill ratio instead.
//!
//! ## Health Monitoring
//!
//! ```
//! use bloomy::filters::{StandardBloomFilter, FilterHealth};
//! use bloomy::core::BloomFilter;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut filter = StandardBloomFilter::new(1000, 0.01)?;
//! for i in 0..500_u64 {
//!     filter.add(&i);
//! }
//!
//! let health = filter.health_check();
//! println!("Filter health: {}", health);
//! assert!(matches!(health, FilterHealth::Healthy { .. }));
//! # Ok(())
//! # }
//! ```

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

use crate::config::DEFAULT_FALSE_POSITIVE_RATE;
use crate::core::filter::{
    BloomFilter, FilterDetails, FilterInfo, FilterKind, MergeableBloomFilter,
};
use crate::core::params::{estimate_item_count, Params};
use crate::core::BitStore;
use crate::error::{BloomyError, Result};
use crate::hash::{BloomItem, HashEngine, IndexIter};

/// Saturation of a standard filter, as reported by
/// [`StandardBloomFilter::health_check`].
///
/// A filter leaves `Healthy` once it is half full or its implied false
/// positive rate reaches twice the target, and becomes `Critical` at 70% full
/// or five times the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterHealth {
    /// Within target.
    Healthy {
        /// Fraction of bits set.
        fill_ratio: f64,
        /// False positive rate implied by the current fill.
        current_fp_rate: f64,
        /// Estimated number of distinct items.
        estimated_items: u64,
    },
    /// Drifting from target; still usable.
    Degraded {
        /// Fraction of bits set.
        fill_ratio: f64,
        /// False positive rate implied by the current fill.
        current_fp_rate: f64,
        /// Estimated number of distinct items.
        estimated_items: u64,
    },
    /// Saturated; queries answer `true` far more often than configured.
    Critical {
        /// Fraction of bits set.
        fill_ratio: f64,
        /// False positive rate implied by the current fill.
        current_fp_rate: f64,
        /// Estimated number of distinct items.
        estimated_items: u64,
    },
}

impl FilterHealth {
    fn classify(fill_ratio: f64, current_fp_rate: f64, target: f64, estimated_items: u64) -> Self {
        let fp_ratio = current_fp_rate / target;
        if fill_ratio < 0.5 && fp_ratio < 2.0 {
            Self::Healthy {
                fill_ratio,
                current_fp_rate,
                estimated_items,
            }
        } else if fill_ratio < 0.7 && fp_ratio < 5.0 {
            Self::Degraded {
                fill_ratio,
                current_fp_rate,
                estimated_items,
            }
        } else {
            Self::Critical {
                fill_ratio,
                current_fp_rate,
                estimated_items,
            }
        }
    }

    /// Lower-case status name.
    #[must_use]
    pub fn status(&self) -> &'static str {
        match self {
            Self::Healthy { .. } => "healthy",
            Self::Degraded { .. } => "degraded",
            Self::Critical { .. } => "critical",
        }
    }

    /// Fill ratio at the time of the check.
    #[must_use]
    pub fn fill_ratio(&self) -> f64 {
        match *self {
            Self::Healthy { fill_ratio, .. }
            | Self::Degraded { fill_ratio, .. }
            | Self::Critical { fill_ratio, .. } => fill_ratio,
        }
    }

    /// False positive rate at the time of the check.
    #[must_use]
    pub fn current_fp_rate(&self) -> f64 {
        match *self {
            Self::Healthy { current_fp_rate, .. }
            | Self::Degraded { current_fp_rate, .. }
            | Self::Critical { current_fp_rate, .. } => current_fp_rate,
        }
    }

    /// Item count estimated from the fill.
    #[must_use]
    pub fn estimated_items(&self) -> u64 {
        match *self {
            Self::Healthy { estimated_items, .. }
            | Self::Degraded { estimated_items, .. }
            | Self::Critical { estimated_items, .. } => estimated_items,
        }
    }

    /// `true` for [`FilterHealth::Healthy`].
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy { .. })
    }

    /// `true` for [`FilterHealth::Critical`].
    #[must_use]
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Critical { .. })
    }
}

impl std::fmt::Display for FilterHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {:.1}% of bits set, fp rate {:.4}, ~{} items",
            self.status(),
            self.fill_ratio() * 100.0,
            self.current_fp_rate(),
            self.estimated_items()
        )
    }
}

/// Standard Bloom filter with optimal parameters.
///
/// # Examples
///
/// ```
/// use bloomy::filters::StandardBloomFilter;
/// use bloomy::core::BloomFilter;
///
/// let mut filter = StandardBloomFilter::new(1000, 0.01).unwrap();
/// filter.add("apple");
/// assert!(filter.query("apple"));
/// assert!(!filter.query("zzz_never_added"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StandardBloomFilter {
    bits: BitStore,
    params: Params,
    items_added: u64,
}

impl StandardBloomFilter {
    /// Create a filter for `capacity` items at false positive `rate`.
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::InvalidParameters`] if `capacity == 0`, `rate`
    /// is outside `(0, 1)`, or the derived size exceeds `1e9` bits.
    pub fn new(capacity: u64, rate: f64) -> Result<Self> {
        Self::with_params(Params::for_filter(capacity, rate)?)
    }

    /// Create a filter for `capacity` items at the default 1% rate.
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::InvalidParameters`] if `capacity == 0` or too large.
    pub fn with_capacity(capacity: u64) -> Result<Self> {
        Self::new(capacity, DEFAULT_FALSE_POSITIVE_RATE)
    }

    /// Create a filter from explicit parameters.
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::InvalidParameters`] if `params` fails validation.
    pub fn with_params(params: Params) -> Result<Self> {
        let params = params.checked()?;
        Ok(Self {
            bits: BitStore::new(params.size)?,
            params,
            items_added: 0,
        })
    }

    /// Reassemble a filter from decoded state.
    pub(crate) fn from_parts(params: Params, bits: BitStore, items_added: u64) -> Result<Self> {
        if bits.size() != params.size {
            return Err(BloomyError::malformed(format!(
                "bit store holds {} bits, parameters say {}",
                bits.size(),
                params.size
            )));
        }
        Ok(Self {
            bits,
            params,
            items_added,
        })
    }

    /// Sizing parameters.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Size of the bit array (m).
    #[must_use]
    pub fn size(&self) -> u64 {
        self.params.size
    }

    /// Number of hash functions (k).
    #[must_use]
    pub fn hash_count(&self) -> u32 {
        self.params.hash_count
    }

    /// Items the filter was sized for.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.params.capacity
    }

    /// Configured false positive rate.
    #[must_use]
    pub fn target_fp_rate(&self) -> f64 {
        self.params.target_fp_rate
    }

    /// The underlying bit store.
    #[must_use]
    pub fn bits(&self) -> &BitStore {
        &self.bits
    }

    /// Number of bits currently set.
    #[must_use]
    pub fn count_set_bits(&self) -> u64 {
        self.bits.count_ones()
    }

    /// Whether `items_added` has reached capacity.
    #[must_use]
    pub fn at_capacity(&self) -> bool {
        self.items_added >= self.params.capacity
    }

    /// False positive rate implied by the current fill: `fill^k`.
    #[must_use]
    pub fn current_fp_rate(&self) -> f64 {
        self.bits.fill_ratio().powi(self.params.hash_count as i32)
    }

    /// Estimate the number of distinct items from the fill ratio.
    ///
    /// Unlike [`items_added`](BloomFilter::items_added) this ignores repeats.
    #[must_use]
    pub fn estimate_cardinality(&self) -> u64 {
        estimate_item_count(self.size(), self.hash_count(), self.bits.fill_ratio()).round() as u64
    }

    /// Heap bytes held by the filter.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.bits.memory_usage()
    }

    #[inline]
    fn indices<I: BloomItem + ?Sized>(&self, item: &I) -> IndexIter {
        HashEngine::item_indices(item, self.params.hash_count, self.params.size)
    }

    /// Check the operational health of this filter.
    #[must_use]
    pub fn health_check(&self) -> FilterHealth {
        FilterHealth::classify(
            self.bits.fill_ratio(),
            self.current_fp_rate(),
            self.params.target_fp_rate,
            self.estimate_cardinality(),
        )
    }
}

impl BloomFilter for StandardBloomFilter {
    #[inline]
    fn add<I: BloomItem + ?Sized>(&mut self, item: &I) {
        let indices = self.indices(item);
        self.bits.set_indices(indices);
        self.items_added = self.items_added.saturating_add(1);
    }

    #[inline]
    fn query<I: BloomItem + ?Sized>(&self, item: &I) -> bool {
        self.bits.all_set(self.indices(item))
    }

    fn clear(&mut self) {
        self.bits.clear();
        self.items_added = 0;
    }

    fn items_added(&self) -> u64 {
        self.items_added
    }

    fn fill_ratio(&self) -> f64 {
        self.bits.fill_ratio()
    }

    fn kind(&self) -> FilterKind {
        FilterKind::Standard
    }

    fn info(&self) -> FilterInfo {
        FilterInfo {
            kind: FilterKind::Standard,
            capacity: self.params.capacity,
            size: self.params.size,
            hash_count: self.params.hash_count,
            items_added: self.items_added,
            fill_ratio: self.bits.fill_ratio(),
            target_fp_rate: self.params.target_fp_rate,
            estimated_fp_rate: self.params.estimated_fp_rate,
            details: FilterDetails::Standard {
                set_bits: self.bits.count_ones(),
                current_fp_rate: self.current_fp_rate(),
            },
        }
    }
}

impl MergeableBloomFilter for StandardBloomFilter {
    fn check_compatible(&self, other: &Self) -> Result<()> {
        if self.size() != other.size() {
            return Err(BloomyError::incompatible_filters(format!(
                "size mismatch: {} vs {} bits",
                self.size(),
                other.size()
            )));
        }
        if self.hash_count() != other.hash_count() {
            return Err(BloomyError::incompatible_filters(format!(
                "hash count mismatch: {} vs {}",
                self.hash_count(),
                other.hash_count()
            )));
        }
        Ok(())
    }

    fn union(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        Ok(Self {
            bits: self.bits.union(&other.bits)?,
            params: self.params,
            items_added: self.items_added.saturating_add(other.items_added),
        })
    }

    fn intersect(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        let bits = self.bits.intersect(&other.bits)?;
        let items_added =
            estimate_item_count(self.size(), self.hash_count(), bits.fill_ratio()).round() as u64;
        Ok(Self {
            bits,
            params: self.params,
            items_added,
        })
    }

    fn occupied_slots(&self) -> u64 {
        self.bits.count_ones()
    }

    fn shared_slots(&self, other: &Self) -> Result<u64> {
        self.check_compatible(other)?;
        self.bits.intersect_count(&other.bits)
    }
}

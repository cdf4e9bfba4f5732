//! Counting Bloom filter with deletion support.
//!
//! A counting Bloom filter (Fan et al., 2000) replaces each bit with a small
//! saturating counter:
//! - Add: increment k counters
//! - Remove: decrement k counters
//! - Query: check that all k counters are non-zero
//!
//! # Trade-offs
//!
//! | Aspect | Standard Bloom | Counting Bloom |
//! |--------|----------------|----------------|
//! | Add | O(k) | O(k) |
//! | Query | O(k) | O(k) |
//! | Remove | Not supported | O(k) |
//! | Space | 1 bit per slot | 8, 16 or 32 bits per slot |
//! | False negatives | Never | Only after removing items never added |
//!
//! # Saturation
//!
//! Increments past a counter's maximum are dropped, so a saturated counter
//! undercounts and repeated removals can zero it early. Saturation is counted
//! and reported through [`FilterInfo`] instead of failing the add.
//!
//! # Merging
//!
//! Union takes the element-wise maximum of the counters. Intersection is not
//! defined and fails with [`BloomyError::Unsupported`].
//!
//! # Examples
//!
//! ```
//! use bloomy::filters::CountingBloomFilter;
//! use bloomy::core::{BloomFilter, DeletableBloomFilter};
//!
//! let mut filter = CountingBloomFilter::with_capacity(10_000).unwrap();
//! filter.add("hello");
//! filter.add("world");
//! assert!(filter.query("hello"));
//!
//! assert!(filter.remove("hello"));
//! assert!(!filter.query("hello"));
//! assert!(filter.query("world"));
//! ```

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use crate::config::DEFAULT_FALSE_POSITIVE_RATE;
use crate::core::counters::{CounterStore, CounterWidth};
use crate::core::filter::{
    BloomFilter, DeletableBloomFilter, FilterDetails, FilterInfo, FilterKind,
    MergeableBloomFilter,
};
use crate::core::params::Params;
use crate::error::{BloomyError, Result};
use crate::hash::{BloomItem, HashEngine, IndexIter};
use tracing::debug;

/// Counting Bloom filter over saturating counters.
#[derive(Debug, Clone, PartialEq)]
pub struct CountingBloomFilter {
    counters: CounterStore,
    params: Params,
    items_added: u64,
}

impl CountingBloomFilter {
    /// Create a filter for `capacity` items at false positive `rate` with
    /// counters of `width`.
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::InvalidParameters`] for a zero capacity, a rate
    /// outside `(0, 1)`, or a derived size above `1e9`.
    pub fn new(capacity: u64, rate: f64, width: CounterWidth) -> Result<Self> {
        Self::with_params(Params::for_filter(capacity, rate)?, width)
    }

    /// Create a filter with the default 1% rate and 8-bit counters.
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::InvalidParameters`] if `capacity == 0` or too large.
    pub fn with_capacity(capacity: u64) -> Result<Self> {
        Self::new(capacity, DEFAULT_FALSE_POSITIVE_RATE, CounterWidth::default())
    }

    /// Create a filter from explicit parameters.
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::InvalidParameters`] if `params` fails validation.
    pub fn with_params(params: Params, width: CounterWidth) -> Result<Self> {
        let params = params.checked()?;
        Ok(Self {
            counters: CounterStore::new(params.size, width)?,
            params,
            items_added: 0,
        })
    }

    pub(crate) fn from_parts(
        params: Params,
        counters: CounterStore,
        items_added: u64,
    ) -> Result<Self> {
        if counters.size() != params.size {
            return Err(BloomyError::malformed(format!(
                "counter store holds {} counters, parameters say {}",
                counters.size(),
                params.size
            )));
        }
        Ok(Self {
            counters,
            params,
            items_added,
        })
    }

    /// Sizing parameters.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Number of counters (m).
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

    /// Counter width, fixed at construction.
    #[must_use]
    pub fn counter_width(&self) -> CounterWidth {
        self.counters.width()
    }

    /// The underlying counter store.
    #[must_use]
    pub fn counters(&self) -> &CounterStore {
        &self.counters
    }

    /// Whether `items_added` has reached capacity.
    #[must_use]
    pub fn at_capacity(&self) -> bool {
        self.items_added >= self.params.capacity
    }

    /// Upper bound on how many times `item` is present: its smallest counter.
    #[must_use]
    pub fn count_estimate<I: BloomItem + ?Sized>(&self, item: &I) -> u32 {
        self.counters.min_count(self.indices(item))
    }

    /// Number of counters stuck at the maximum.
    #[must_use]
    pub fn saturated_counters(&self) -> u64 {
        self.counters.saturated_count()
    }

    /// Heap bytes held by the filter.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.counters.memory_usage()
    }

    #[inline]
    fn indices<I: BloomItem + ?Sized>(&self, item: &I) -> IndexIter {
        HashEngine::item_indices(item, self.params.hash_count, self.params.size)
    }
}

impl BloomFilter for CountingBloomFilter {
    fn add<I: BloomItem + ?Sized>(&mut self, item: &I) {
        let saturated = self.counters.increment(self.indices(item));
        if saturated > 0 {
            debug!(
                saturated,
                width = self.counters.width().bits(),
                "counting filter add hit saturated counters"
            );
        }
        self.items_added = self.items_added.saturating_add(1);
    }

    fn query<I: BloomItem + ?Sized>(&self, item: &I) -> bool {
        self.counters.all_nonzero(self.indices(item))
    }

    fn clear(&mut self) {
        self.counters.clear();
        self.items_added = 0;
    }

    fn items_added(&self) -> u64 {
        self.items_added
    }

    fn fill_ratio(&self) -> f64 {
        self.counters.fill_ratio()
    }

    fn kind(&self) -> FilterKind {
        FilterKind::Counting
    }

    fn info(&self) -> FilterInfo {
        FilterInfo {
            kind: FilterKind::Counting,
            capacity: self.params.capacity,
            size: self.params.size,
            hash_count: self.params.hash_count,
            items_added: self.items_added,
            fill_ratio: self.counters.fill_ratio(),
            target_fp_rate: self.params.target_fp_rate,
            estimated_fp_rate: self.params.estimated_fp_rate,
            details: FilterDetails::Counting {
                counter_width: self.counters.width(),
                nonzero_counters: self.counters.count_nonzero(),
                saturated_counters: self.counters.saturated_count(),
            },
        }
    }
}

impl DeletableBloomFilter for CountingBloomFilter {
    fn remove<I: BloomItem + ?Sized>(&mut self, item: &I) -> bool {
        // Decrementing slots of an absent item would erase other members.
        if !self.query(item) {
            return false;
        }
        self.counters.decrement(self.indices(item));
        self.items_added = self.items_added.saturating_sub(1);
        true
    }
}

impl MergeableBloomFilter for CountingBloomFilter {
    fn check_compatible(&self, other: &Self) -> Result<()> {
        if self.size() != other.size() {
            return Err(BloomyError::incompatible_filters(format!(
                "size mismatch: {} vs {} counters",
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
        if self.counter_width() != other.counter_width() {
            return Err(BloomyError::incompatible_filters(format!(
                "counter width mismatch: {} vs {}",
                self.counter_width(),
                other.counter_width()
            )));
        }
        Ok(())
    }

    fn union(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        Ok(Self {
            counters: self.counters.union_max(&other.counters)?,
            params: self.params,
            items_added: self.items_added.saturating_add(other.items_added),
        })
    }

    fn intersect(&self, _other: &Self) -> Result<Self> {
        Err(BloomyError::unsupported("intersect", FilterKind::Counting.name()))
    }

    fn occupied_slots(&self) -> u64 {
        self.counters.count_nonzero()
    }

    fn shared_slots(&self, other: &Self) -> Result<u64> {
        self.check_compatible(other)?;
        self.counters.shared_nonzero(&other.counters)
    }
}

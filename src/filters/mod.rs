//! Bloom filter implementations.
//!
//! # Available Filters
//!
//! - [`StandardBloomFilter`] - General-purpose filter over a bit array
//! - [`CountingBloomFilter`] - Supports deletion using counters instead of bits
//! - [`ScalableBloomFilter`] - Grows by appending standard slices
//!
//! [`Filter`] wraps all three behind one type for callers that pick the
//! variant at run time, e.g. from a configuration file or a decoded buffer.
//!
//! # Choosing a Filter
//!
//! | Filter | Use Case | Memory | Operations |
//! |--------|----------|--------|------------|
//! | [`StandardBloomFilter`] | Known size, no deletion | Optimal (m bits) | Add, Query |
//! | [`CountingBloomFilter`] | Need deletion | 8-32× Standard | Add, Remove, Query |
//! | [`ScalableBloomFilter`] | Unknown size | Grows dynamically | Add, Query, Auto-grow |
//!
//! # Examples
//!
//! ```
//! use bloomy::config::FilterOptions;
//! use bloomy::core::{BloomFilter, FilterKind};
//! use bloomy::filters::Filter;
//!
//! let mut filter = Filter::create(FilterKind::Counting, 1000, &FilterOptions::default()).unwrap();
//! filter.add("temporary");
//! assert!(filter.query("temporary"));
//!
//! assert!(filter.remove("temporary").unwrap());
//! assert!(!filter.query("temporary"));
//! ```

pub mod counting;
pub mod scalable;
pub mod standard;

pub use counting::CountingBloomFilter;
pub use scalable::ScalableBloomFilter;
pub use standard::{FilterHealth, StandardBloomFilter};

use crate::config::FilterOptions;
use crate::core::filter::{
    BloomFilter, DeletableBloomFilter, FilterInfo, FilterKind, MergeableBloomFilter,
};
use crate::error::{BloomyError, Result};
use crate::hash::BloomItem;
use crate::wire;
use std::path::Path;

/// Any filter variant, selected at run time.
///
/// Variant-only capabilities ([`remove`](Self::remove), scalable slices) are
/// reached through this type with a typed error, or through the concrete
/// type via [`as_counting`](Self::as_counting) and friends.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Standard bit-array filter.
    Standard(StandardBloomFilter),
    /// Counting filter with deletion.
    Counting(CountingBloomFilter),
    /// Scalable filter.
    Scalable(ScalableBloomFilter),
}

macro_rules! dispatch {
    ($filter:expr, $f:ident => $body:expr) => {
        match $filter {
            Filter::Standard($f) => $body,
            Filter::Counting($f) => $body,
            Filter::Scalable($f) => $body,
        }
    };
}

impl Filter {
    /// Build a filter of `kind` for `capacity` items.
    ///
    /// Fields of `options` that `kind` does not use are still validated.
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::InvalidParameters`] for a zero capacity, any
    /// out-of-range option, or a derived size above `1e9`.
    pub fn create(kind: FilterKind, capacity: u64, options: &FilterOptions) -> Result<Self> {
        options.validate()?;
        let rate = options.false_positive_rate;
        Ok(match kind {
            FilterKind::Standard => Self::Standard(StandardBloomFilter::new(capacity, rate)?),
            FilterKind::Counting => Self::Counting(CountingBloomFilter::new(
                capacity,
                rate,
                options.counter_width,
            )?),
            FilterKind::Scalable => Self::Scalable(ScalableBloomFilter::with_growth(
                capacity,
                rate,
                options.growth_factor,
                options.tightening_ratio,
            )?),
        })
    }

    /// Remove one occurrence of `item`.
    ///
    /// Returns `Ok(false)` if the item is not present.
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::Unsupported`] unless this is a counting filter.
    pub fn remove<I: BloomItem + ?Sized>(&mut self, item: &I) -> Result<bool> {
        match self {
            Self::Counting(f) => Ok(f.remove(item)),
            other => Err(BloomyError::unsupported("remove", other.kind().name())),
        }
    }

    /// Slices of a scalable filter, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::Unsupported`] unless this is a scalable filter.
    pub fn slices(&self) -> Result<&[StandardBloomFilter]> {
        match self {
            Self::Scalable(f) => Ok(f.slices()),
            other => Err(BloomyError::unsupported("slices", other.kind().name())),
        }
    }

    /// The standard filter, if this is one.
    #[must_use]
    pub fn as_standard(&self) -> Option<&StandardBloomFilter> {
        match self {
            Self::Standard(f) => Some(f),
            _ => None,
        }
    }

    /// The counting filter, if this is one.
    #[must_use]
    pub fn as_counting(&self) -> Option<&CountingBloomFilter> {
        match self {
            Self::Counting(f) => Some(f),
            _ => None,
        }
    }

    /// The scalable filter, if this is one.
    #[must_use]
    pub fn as_scalable(&self) -> Option<&ScalableBloomFilter> {
        match self {
            Self::Scalable(f) => Some(f),
            _ => None,
        }
    }

    /// Heap bytes held by the filter.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        dispatch!(self, f => f.memory_usage())
    }

    /// Encode in the binary wire format. See [`wire::to_bytes`].
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::Serialization`] if a section overflows its length field.
    pub fn to_bytes(&self, compress: bool) -> Result<Vec<u8>> {
        wire::to_bytes(self, compress)
    }

    /// Decode from the binary wire format. See [`wire::from_bytes`].
    ///
    /// # Errors
    ///
    /// Returns a decode error describing the first problem found.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        wire::from_bytes(bytes)
    }

    /// Encode and write to `path`. See [`wire::save`].
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::Io`] if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P, compress: bool) -> Result<()> {
        wire::save(self, path, compress)
    }

    /// Read and decode a filter from `path`. See [`wire::load`].
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::Io`] if the file cannot be read, or a decode error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        wire::load(path)
    }
}

impl From<StandardBloomFilter> for Filter {
    fn from(filter: StandardBloomFilter) -> Self {
        Self::Standard(filter)
    }
}

impl From<CountingBloomFilter> for Filter {
    fn from(filter: CountingBloomFilter) -> Self {
        Self::Counting(filter)
    }
}

impl From<ScalableBloomFilter> for Filter {
    fn from(filter: ScalableBloomFilter) -> Self {
        Self::Scalable(filter)
    }
}

impl BloomFilter for Filter {
    fn add<I: BloomItem + ?Sized>(&mut self, item: &I) {
        dispatch!(self, f => f.add(item));
    }

    fn query<I: BloomItem + ?Sized>(&self, item: &I) -> bool {
        dispatch!(self, f => f.query(item))
    }

    fn clear(&mut self) {
        dispatch!(self, f => f.clear());
    }

    fn items_added(&self) -> u64 {
        dispatch!(self, f => f.items_added())
    }

    fn fill_ratio(&self) -> f64 {
        dispatch!(self, f => f.fill_ratio())
    }

    fn kind(&self) -> FilterKind {
        dispatch!(self, f => f.kind())
    }

    fn info(&self) -> FilterInfo {
        dispatch!(self, f => f.info())
    }
}

impl MergeableBloomFilter for Filter {
    fn check_compatible(&self, other: &Self) -> Result<()> {
        match (self, other) {
            (Self::Standard(a), Self::Standard(b)) => a.check_compatible(b),
            (Self::Counting(a), Self::Counting(b)) => a.check_compatible(b),
            (Self::Scalable(a), Self::Scalable(b)) => a.check_compatible(b),
            (a, b) => Err(type_mismatch(a, b)),
        }
    }

    fn union(&self, other: &Self) -> Result<Self> {
        match (self, other) {
            (Self::Standard(a), Self::Standard(b)) => a.union(b).map(Self::Standard),
            (Self::Counting(a), Self::Counting(b)) => a.union(b).map(Self::Counting),
            (Self::Scalable(a), Self::Scalable(b)) => a.union(b).map(Self::Scalable),
            (a, b) => Err(type_mismatch(a, b)),
        }
    }

    fn intersect(&self, other: &Self) -> Result<Self> {
        match (self, other) {
            (Self::Standard(a), Self::Standard(b)) => a.intersect(b).map(Self::Standard),
            (Self::Counting(a), Self::Counting(b)) => a.intersect(b).map(Self::Counting),
            (Self::Scalable(a), Self::Scalable(b)) => a.intersect(b).map(Self::Scalable),
            (a, b) => Err(type_mismatch(a, b)),
        }
    }

    fn occupied_slots(&self) -> u64 {
        dispatch!(self, f => f.occupied_slots())
    }

    fn shared_slots(&self, other: &Self) -> Result<u64> {
        match (self, other) {
            (Self::Standard(a), Self::Standard(b)) => a.shared_slots(b),
            (Self::Counting(a), Self::Counting(b)) => a.shared_slots(b),
            (Self::Scalable(a), Self::Scalable(b)) => a.shared_slots(b),
            (a, b) => Err(type_mismatch(a, b)),
        }
    }
}

fn type_mismatch(a: &Filter, b: &Filter) -> BloomyError {
    BloomyError::incompatible_filters(format!(
        "filter type mismatch: {} vs {}",
        a.kind(),
        b.kind()
    ))
}

//! bloomy: a probabilistic set-membership engine.
//!
//! bloomy provides three Bloom filter variants over one deterministic hashing
//! scheme, with set algebra between compatible filters and a versioned binary
//! format for storage and transport.
//!
//! # What are Bloom Filters?
//!
//! A Bloom filter is a space-efficient probabilistic data structure that tests whether
//! an element is a member of a set. It can produce:
//! - **False positives**: May indicate an element is in the set when it isn't
//! - **Zero false negatives**: If it says an element isn't in the set, it definitely isn't
//!
//! # Quick Start
//!
//! ```
//! use bloomy::prelude::*;
//!
//! // Create a filter for 10,000 items with 1% false positive rate
//! let mut filter = StandardBloomFilter::new(10_000, 0.01).unwrap();
//!
//! filter.add("hello");
//! filter.add("world");
//!
//! assert!(filter.query("hello"));    // true - might be in set
//! assert!(!filter.query("goodbye")); // false - definitely not in set
//! ```
//!
//! # Filter Variants
//!
//! | Filter | Best For | Deletion | Memory |
//! |--------|----------|----------|--------|
//! | [`StandardBloomFilter`] | Known size | No | m bits |
//! | [`CountingBloomFilter`] | Sets that shrink | Yes | m × 8/16/32 bits |
//! | [`ScalableBloomFilter`] | Unknown size | No | Grows by slices |
//!
//! [`Filter`] selects among them at run time:
//!
//! ```
//! use bloomy::prelude::*;
//!
//! let options = FilterOptions::default().with_counter_width(CounterWidth::Bits16);
//! let mut filter = Filter::create(FilterKind::Counting, 1000, &options).unwrap();
//! filter.add("x");
//! assert!(filter.remove("x").unwrap());
//! assert!(!filter.query("x"));
//! ```
//!
//! # Persistence
//!
//! ```
//! use bloomy::prelude::*;
//!
//! let mut filter = Filter::create(FilterKind::Scalable, 100, &FilterOptions::default()).unwrap();
//! filter.add_all(0..1000_u32);
//!
//! let bytes = filter.to_bytes(true).unwrap();
//! let restored = Filter::from_bytes(&bytes).unwrap();
//! assert_eq!(restored.info(), filter.info());
//! ```
//!
//! # Concurrency
//!
//! Filters are plain owned values. Mutation takes `&mut self`; wrap a filter in
//! a `Mutex` or `RwLock` to share it between threads. Nothing in the crate
//! spawns threads except `merge::batch_query_parallel` under the `rayon`
//! feature.
//!
//! # Logging
//!
//! The crate emits [`tracing`] events (slice growth, counter saturation,
//! encode/decode, file I/O) and never installs a subscriber.
//!
//! # Optional Features
//!
//! - `rayon` - Parallel batch queries

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::len_zero)]
#![allow(clippy::bool_assert_comparison)]
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Filter construction options
pub mod config;

/// Core data structures and traits
pub mod core;

/// Error types and result aliases
pub mod error;

/// Filter implementations (variants)
pub mod filters;

/// Hash functions and index derivation
pub mod hash;

/// Union, intersection and similarity across filters
pub mod merge;

/// Binary wire format and file persistence
pub mod wire;

// Re-export commonly used types at crate root
pub use error::{BloomyError, Result};

// Re-export core traits
pub use crate::core::filter::{BloomFilter, DeletableBloomFilter, MergeableBloomFilter};

// Re-export all filter types at the crate root
pub use filters::{CountingBloomFilter, Filter, ScalableBloomFilter, StandardBloomFilter};

pub use config::FilterOptions;

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use bloomy::prelude::*;
///
/// let mut filter = CountingBloomFilter::with_capacity(1000).unwrap();
/// filter.add("hello");
/// assert!(filter.query("hello"));
/// ```
pub mod prelude {
    pub use crate::config::FilterOptions;
    pub use crate::core::counters::CounterWidth;
    pub use crate::core::filter::{
        BloomFilter, DeletableBloomFilter, FilterInfo, FilterKind, MergeableBloomFilter,
    };
    pub use crate::error::{BloomyError, Result};
    pub use crate::filters::{
        CountingBloomFilter, Filter, ScalableBloomFilter, StandardBloomFilter,
    };
    pub use crate::hash::BloomItem;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        let mut filter = StandardBloomFilter::new(100, 0.01).unwrap();
        filter.add(&"test".to_string());
        assert!(filter.query("test"));
    }

    #[test]
    fn test_trait_usage() {
        fn exercise<F: BloomFilter>(filter: &mut F) {
            filter.add("item");
            assert!(filter.query("item"));
            filter.clear();
            assert!(filter.is_empty());
        }

        exercise(&mut StandardBloomFilter::new(100, 0.01).unwrap());
        exercise(&mut CountingBloomFilter::with_capacity(100).unwrap());
        exercise(&mut ScalableBloomFilter::new(100, 0.01).unwrap());
    }

    #[test]
    fn test_string_and_str_hash_alike() {
        let mut filter = StandardBloomFilter::new(100, 0.01).unwrap();
        filter.add(&String::from("same"));
        assert!(filter.query("same"));
        assert!(filter.query(b"same".as_slice()));
    }
}

//! Core types, traits, and storage shared by all filter variants.
//!
//! # Module Organization
//!
//! ```text
//! core/
//! ├── filter.rs    - Trait definitions, FilterKind, FilterInfo
//! ├── params.rs    - Parameter calculations
//! ├── bitstore.rs  - Packed bit vector
//! ├── counters.rs  - Saturating counter array
//! └── mod.rs       - This file (public API)
//! ```
//!
//! # Examples
//!
//! ## Using Parameter Calculations
//!
//! ```
//! use bloomy::core::params::Params;
//!
//! let params = Params::compute(10_000, 0.01).unwrap();
//! assert_eq!(params.hash_count, 7);
//! assert!(params.size > 95_000 && params.size < 96_000);
//! ```
//!
//! ## Using BitStore Directly
//!
//! ```
//! use bloomy::core::BitStore;
//!
//! let mut bits = BitStore::new(1000).unwrap();
//! bits.set_indices([42, 100]);
//! assert!(bits.all_set([42, 100]));
//! assert!(!bits.get(43));
//! ```

pub mod bitstore;
pub mod counters;
pub mod filter;
pub mod params;

pub use bitstore::BitStore;
pub use counters::{CounterStore, CounterWidth};
pub use filter::{
    BloomFilter, DeletableBloomFilter, FilterDetails, FilterInfo, FilterKind,
    MergeableBloomFilter,
};
pub use params::Params;

/// Convenient imports for filter traits.
pub mod prelude {
    pub use super::filter::{BloomFilter, DeletableBloomFilter, MergeableBloomFilter};
}

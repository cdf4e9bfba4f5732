//! Set algebra and similarity over filters.
//!
//! Every function here is generic over [`MergeableBloomFilter`], so it works
//! on the concrete filter types and on the run-time [`Filter`] enum alike.
//! No function mutates its inputs.
//!
//! Similarity metrics are computed from slot counts. For two compatible
//! filters `|A ∨ B| = |A| + |B| - |A ∧ B|` holds slot by slot, so the union
//! never has to be materialized.
//!
//! # Examples
//!
//! ```
//! use bloomy::core::BloomFilter;
//! use bloomy::filters::StandardBloomFilter;
//! use bloomy::merge::{jaccard_similarity, union_all};
//!
//! let mut a = StandardBloomFilter::new(1000, 0.01).unwrap();
//! let mut b = StandardBloomFilter::new(1000, 0.01).unwrap();
//! a.add("alice");
//! b.add("bob");
//!
//! let both = union_all(&[a.clone(), b.clone()]).unwrap();
//! assert!(both.query("alice") && both.query("bob"));
//!
//! let j = jaccard_similarity(&a, &b).unwrap();
//! assert!(j < 0.5);
//! ```
//!
//! [`Filter`]: crate::filters::Filter

#![allow(clippy::cast_precision_loss)]

use crate::core::filter::{BloomFilter, MergeableBloomFilter};
use crate::error::{BloomyError, Result};
use crate::hash::BloomItem;
use std::collections::HashMap;
use std::hash::Hash;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Union of every filter in `filters`, folded left to right.
///
/// A single filter is returned as a copy.
///
/// # Errors
///
/// - [`BloomyError::EmptyInput`] if `filters` is empty
/// - the first error any pairwise union returns
pub fn union_all<F: MergeableBloomFilter + Clone>(filters: &[F]) -> Result<F> {
    fold(filters, "union_all", F::union)
}

/// Intersection of every filter in `filters`, folded left to right.
///
/// Only standard filters define intersection; the others fail with
/// [`BloomyError::Unsupported`].
///
/// # Errors
///
/// - [`BloomyError::EmptyInput`] if `filters` is empty
/// - the first error any pairwise intersection returns
pub fn intersect_all<F: MergeableBloomFilter + Clone>(filters: &[F]) -> Result<F> {
    fold(filters, "intersect_all", F::intersect)
}

fn fold<F, Op>(filters: &[F], operation: &str, op: Op) -> Result<F>
where
    F: MergeableBloomFilter + Clone,
    Op: Fn(&F, &F) -> Result<F>,
{
    let (first, rest) = filters
        .split_first()
        .ok_or_else(|| BloomyError::empty_input(operation))?;
    rest.iter()
        .try_fold(first.clone(), |acc, next| op(&acc, next))
}

/// Check that two filters can be merged or compared.
///
/// # Errors
///
/// Returns [`BloomyError::IncompatibleFilters`] describing the mismatch.
pub fn compatible<F: MergeableBloomFilter>(a: &F, b: &F) -> Result<()> {
    a.check_compatible(b)
}

/// Jaccard similarity of the occupied slots: `|A ∧ B| / |A ∨ B|`.
///
/// Two empty filters are identical, so the result is 1.0.
///
/// # Errors
///
/// Returns [`BloomyError::IncompatibleFilters`] if the filters differ in shape.
pub fn jaccard_similarity<F: MergeableBloomFilter>(a: &F, b: &F) -> Result<f64> {
    let shared = a.shared_slots(b)?;
    let union = a.occupied_slots() + b.occupied_slots() - shared;
    if union == 0 {
        return Ok(1.0);
    }
    Ok(shared as f64 / union as f64)
}

/// Overlap coefficient of the occupied slots: `|A ∧ B| / min(|A|, |B|)`.
///
/// 0.0 when either filter is empty.
///
/// # Errors
///
/// Returns [`BloomyError::IncompatibleFilters`] if the filters differ in shape.
pub fn overlap_coefficient<F: MergeableBloomFilter>(a: &F, b: &F) -> Result<f64> {
    let shared = a.shared_slots(b)?;
    let smaller = a.occupied_slots().min(b.occupied_slots());
    if smaller == 0 {
        return Ok(0.0);
    }
    Ok(shared as f64 / smaller as f64)
}

/// Query every item, keyed by item.
///
/// Duplicate items collapse to one entry.
#[must_use]
pub fn batch_query<F, I>(filter: &F, items: &[I]) -> HashMap<I, bool>
where
    F: BloomFilter,
    I: BloomItem + Eq + Hash + Clone,
{
    items
        .iter()
        .map(|item| (item.clone(), filter.query(item)))
        .collect()
}

/// Parallel [`batch_query`] (requires `rayon` feature).
#[cfg(feature = "rayon")]
#[must_use]
pub fn batch_query_parallel<F, I>(filter: &F, items: &[I]) -> HashMap<I, bool>
where
    F: BloomFilter + Sync,
    I: BloomItem + Eq + Hash + Clone + Send + Sync,
{
    items
        .par_iter()
        .map(|item| (item.clone(), filter.query(item)))
        .collect()
}

//! Scalable Bloom filter that grows by appending slices.
//!
//! Based on Almeida et al. (2007), "Scalable Bloom Filters".
//!
//! # Algorithm
//!
//! ```text
//! ScalableBloomFilter = [Slice₀, Slice₁, Slice₂, ...]
//!
//! Where:
//!   - Capacity(Sliceᵢ) = n₀ × sⁱ   (geometric growth)
//!   - FPR(Sliceᵢ)      = p₀ × rⁱ   (error tightening, floored at 1e-4)
//!   - Add:   goes to the newest slice; a new slice is appended first when
//!            the newest one is at capacity
//!   - Query: any slice reports membership, newest first
//! ```
//!
//! Slices are never merged or dropped implicitly. Only [`clear`] shrinks the
//! sequence, back to a single empty slice.
//!
//! # Combined false positive rate
//!
//! [`combined_fp_rate`] reports `Σ p₀ × rⁱ` over the existing slices, capped
//! at 1.0. This is an approximation, not an inclusion-exclusion bound.
//!
//! # Examples
//!
//! ```
//! use bloomy::filters::ScalableBloomFilter;
//! use bloomy::core::BloomFilter;
//!
//! let mut filter = ScalableBloomFilter::new(100, 0.01).unwrap();
//! for i in 0..1000_u32 {
//!     filter.add(&i);
//! }
//!
//! assert!(filter.slice_count() > 1);
//! assert!(filter.query(&500_u32));
//! ```
//!
//! [`clear`]: BloomFilter::clear
//! [`combined_fp_rate`]: ScalableBloomFilter::combined_fp_rate

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]

use crate::config::{
    validate_growth, validate_rate, DEFAULT_GROWTH_FACTOR, DEFAULT_TIGHTENING_RATIO,
};
use crate::core::filter::{
    BloomFilter, FilterDetails, FilterInfo, FilterKind, MergeableBloomFilter,
};
use crate::core::params::Params;
use crate::error::{BloomyError, Result};
use crate::filters::StandardBloomFilter;
use crate::hash::BloomItem;
use tracing::{debug, warn};

/// Floor applied to every slice's target false positive rate.
pub const MIN_SLICE_FP_RATE: f64 = 1e-4;

/// Maximum number of slices a filter will create.
pub const MAX_SLICES: usize = 64;

// Relative slack when comparing a stored slice rate with the policy.
const RATE_TOLERANCE: f64 = 1e-9;

/// Bloom filter that keeps its false positive rate bounded as it grows.
///
/// # Examples
///
/// ```
/// use bloomy::filters::ScalableBloomFilter;
/// use bloomy::core::BloomFilter;
///
/// let mut filter = ScalableBloomFilter::with_growth(10, 0.01, 4, 0.5).unwrap();
/// filter.add_all(0..50_u64);
///
/// assert_eq!(filter.slice_count(), 2);
/// assert_eq!(filter.slices()[1].capacity(), 40);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ScalableBloomFilter {
    /// Oldest first; never empty.
    slices: Vec<StandardBloomFilter>,
    initial_capacity: u64,
    target_rate: f64,
    growth_factor: u32,
    tightening_ratio: f64,
    items_added: u64,
}

impl ScalableBloomFilter {
    /// Create a filter whose first slice holds `initial_capacity` items at
    /// `target_rate`, growing 2× per slice with a 0.8 tightening ratio.
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::InvalidParameters`] if the first slice cannot be
    /// built.
    pub fn new(initial_capacity: u64, target_rate: f64) -> Result<Self> {
        Self::with_growth(
            initial_capacity,
            target_rate,
            DEFAULT_GROWTH_FACTOR,
            DEFAULT_TIGHTENING_RATIO,
        )
    }

    /// Create a filter with an explicit growth policy.
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::InvalidParameters`] if `target_rate` is outside
    /// `(0, 1)`, `growth_factor` is 0, `tightening_ratio` is outside `(0, 1]`,
    /// or the first slice cannot be built.
    pub fn with_growth(
        initial_capacity: u64,
        target_rate: f64,
        growth_factor: u32,
        tightening_ratio: f64,
    ) -> Result<Self> {
        validate_rate(target_rate)?;
        validate_growth(growth_factor, tightening_ratio)?;

        let mut filter = Self {
            slices: Vec::with_capacity(4),
            initial_capacity,
            target_rate,
            growth_factor,
            tightening_ratio,
            items_added: 0,
        };
        filter.create_next_slice()?;
        Ok(filter)
    }

    /// Reassemble a filter from decoded state.
    pub(crate) fn from_parts(
        initial_capacity: u64,
        target_rate: f64,
        growth_factor: u32,
        tightening_ratio: f64,
        slices: Vec<StandardBloomFilter>,
        items_added: u64,
    ) -> Result<Self> {
        let layout = SliceLayout::checked(initial_capacity, target_rate, growth_factor, tightening_ratio)?;
        layout.check_count(slices.len())?;
        for (index, slice) in slices.iter().enumerate() {
            layout.check_slice(index, slice.params())?;
        }

        Ok(Self {
            slices,
            initial_capacity,
            target_rate,
            growth_factor,
            tightening_ratio,
            items_added,
        })
    }

    /// Slices, oldest first.
    #[must_use]
    pub fn slices(&self) -> &[StandardBloomFilter] {
        &self.slices
    }

    /// Number of slices.
    #[must_use]
    pub fn slice_count(&self) -> usize {
        self.slices.len()
    }

    /// Capacity of the first slice.
    #[must_use]
    pub fn initial_capacity(&self) -> u64 {
        self.initial_capacity
    }

    /// Target rate of the first slice.
    #[must_use]
    pub fn target_fp_rate(&self) -> f64 {
        self.target_rate
    }

    /// Capacity multiplier between consecutive slices.
    #[must_use]
    pub fn growth_factor(&self) -> u32 {
        self.growth_factor
    }

    /// Rate multiplier between consecutive slices.
    #[must_use]
    pub fn tightening_ratio(&self) -> f64 {
        self.tightening_ratio
    }

    /// Sum of slice capacities.
    #[must_use]
    pub fn total_capacity(&self) -> u64 {
        self.slices
            .iter()
            .fold(0_u64, |acc, s| acc.saturating_add(s.capacity()))
    }

    /// Sum of slice sizes in bits.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.slices.iter().map(StandardBloomFilter::size).sum()
    }

    /// Approximate false positive rate: `Σ p₀ × rⁱ` over existing slices,
    /// capped at 1.0.
    ///
    /// The per-slice floor is not applied here.
    #[must_use]
    pub fn combined_fp_rate(&self) -> f64 {
        (0..self.slices.len())
            .map(|i| self.target_rate * self.tightening_ratio.powi(i as i32))
            .sum::<f64>()
            .min(1.0)
    }

    /// Heap bytes held by all slices.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.slices.iter().map(StandardBloomFilter::memory_usage).sum()
    }

    /// Add an item, failing if a required new slice cannot be created.
    ///
    /// On failure nothing is added.
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::InvalidParameters`] if the next slice would
    /// exceed the size ceiling or the slice limit.
    pub fn try_add<I: BloomItem + ?Sized>(&mut self, item: &I) -> Result<()> {
        if self.newest().at_capacity() {
            self.create_next_slice()?;
        }
        self.add_to_newest(item);
        Ok(())
    }

    fn slice_capacity(&self, index: usize) -> u64 {
        slice_capacity(self.initial_capacity, self.growth_factor, index)
    }

    fn slice_rate(&self, index: usize) -> f64 {
        slice_rate(self.target_rate, self.tightening_ratio, index)
    }

    fn create_next_slice(&mut self) -> Result<()> {
        let index = self.slices.len();
        if index >= MAX_SLICES {
            return Err(BloomyError::invalid_parameters(format!(
                "scalable filter is limited to {} slices",
                MAX_SLICES
            )));
        }

        let capacity = self.slice_capacity(index);
        let rate = self.slice_rate(index);
        let slice = StandardBloomFilter::new(capacity, rate)?;
        debug!(
            slice = index,
            capacity,
            rate,
            size = slice.size(),
            "scalable filter created slice"
        );
        self.slices.push(slice);
        Ok(())
    }

    #[inline]
    fn newest(&self) -> &StandardBloomFilter {
        &self.slices[self.slices.len() - 1]
    }

    fn add_to_newest<I: BloomItem + ?Sized>(&mut self, item: &I) {
        let last = self.slices.len() - 1;
        self.slices[last].add(item);
        self.items_added = self.items_added.saturating_add(1);
    }
}

fn slice_capacity(initial_capacity: u64, growth_factor: u32, index: usize) -> u64 {
    let factor = u64::from(growth_factor).saturating_pow(index as u32);
    initial_capacity.saturating_mul(factor)
}

fn slice_rate(target_rate: f64, tightening_ratio: f64, index: usize) -> f64 {
    (target_rate * tightening_ratio.powi(index as i32)).max(MIN_SLICE_FP_RATE)
}

/// Growth policy used to check stored slices before any of them is built.
///
/// Every failure is a [`BloomyError::MalformedBinary`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct SliceLayout {
    initial_capacity: u64,
    target_rate: f64,
    growth_factor: u32,
    tightening_ratio: f64,
}

impl SliceLayout {
    pub(crate) fn checked(
        initial_capacity: u64,
        target_rate: f64,
        growth_factor: u32,
        tightening_ratio: f64,
    ) -> Result<Self> {
        validate_rate(target_rate)
            .and_then(|()| validate_growth(growth_factor, tightening_ratio))
            .map_err(|err| BloomyError::malformed(err.to_string()))?;
        Ok(Self {
            initial_capacity,
            target_rate,
            growth_factor,
            tightening_ratio,
        })
    }

    pub(crate) fn check_count(&self, count: usize) -> Result<()> {
        if count == 0 || count > MAX_SLICES {
            return Err(BloomyError::malformed(format!(
                "scalable filter needs 1 to {} slices, found {}",
                MAX_SLICES, count
            )));
        }
        Ok(())
    }

    /// Check one stored slice against the parameters the policy gives slot `index`.
    pub(crate) fn check_slice(&self, index: usize, stored: &Params) -> Result<()> {
        let capacity = slice_capacity(self.initial_capacity, self.growth_factor, index);
        let rate = slice_rate(self.target_rate, self.tightening_ratio, index);

        if stored.capacity != capacity {
            return Err(BloomyError::malformed(format!(
                "slice {} has capacity {}, growth policy says {}",
                index, stored.capacity, capacity
            )));
        }
        if (stored.target_fp_rate - rate).abs() > rate * RATE_TOLERANCE {
            return Err(BloomyError::malformed(format!(
                "slice {} has rate {}, growth policy says {}",
                index, stored.target_fp_rate, rate
            )));
        }

        let expected = Params::compute(capacity, rate)
            .map_err(|err| BloomyError::malformed(format!("slice {}: {}", index, err)))?;
        if stored.size != expected.size || stored.hash_count != expected.hash_count {
            return Err(BloomyError::malformed(format!(
                "slice {} has size {} and {} hashes, growth policy says {} and {}",
                index, stored.size, stored.hash_count, expected.size, expected.hash_count
            )));
        }
        Ok(())
    }
}

impl BloomFilter for ScalableBloomFilter {
    /// Add an item, growing when the newest slice is full.
    ///
    /// If the next slice cannot be created the item goes into the newest
    /// slice anyway, past its capacity. Use [`try_add`] to observe the failure.
    ///
    /// [`try_add`]: ScalableBloomFilter::try_add
    fn add<I: BloomItem + ?Sized>(&mut self, item: &I) {
        if self.newest().at_capacity() {
            if let Err(err) = self.create_next_slice() {
                warn!(
                    slices = self.slices.len(),
                    error = %err,
                    "scalable filter cannot grow, overfilling last slice"
                );
            }
        }
        self.add_to_newest(item);
    }

    fn query<I: BloomItem + ?Sized>(&self, item: &I) -> bool {
        self.slices.iter().rev().any(|slice| slice.query(item))
    }

    fn clear(&mut self) {
        self.slices.truncate(1);
        for slice in &mut self.slices {
            slice.clear();
        }
        self.items_added = 0;
    }

    fn items_added(&self) -> u64 {
        self.items_added
    }

    fn fill_ratio(&self) -> f64 {
        let total = self.total_size();
        if total == 0 {
            return 0.0;
        }
        self.occupied_slots() as f64 / total as f64
    }

    fn kind(&self) -> FilterKind {
        FilterKind::Scalable
    }

    fn info(&self) -> FilterInfo {
        FilterInfo {
            kind: FilterKind::Scalable,
            capacity: self.total_capacity(),
            size: self.total_size(),
            hash_count: self.newest().hash_count(),
            items_added: self.items_added,
            fill_ratio: self.fill_ratio(),
            target_fp_rate: self.target_rate,
            estimated_fp_rate: self.combined_fp_rate(),
            details: FilterDetails::Scalable {
                slice_count: self.slices.len(),
                initial_capacity: self.initial_capacity,
                growth_factor: self.growth_factor,
                tightening_ratio: self.tightening_ratio,
            },
        }
    }
}

impl MergeableBloomFilter for ScalableBloomFilter {
    /// Two scalable filters are compatible when they share a growth policy
    /// and have grown to the same number of slices.
    fn check_compatible(&self, other: &Self) -> Result<()> {
        if self.initial_capacity != other.initial_capacity
            || self.target_rate != other.target_rate
            || self.growth_factor != other.growth_factor
            || self.tightening_ratio != other.tightening_ratio
        {
            return Err(BloomyError::incompatible_filters(format!(
                "growth policy mismatch: ({}, {}, {}, {}) vs ({}, {}, {}, {})",
                self.initial_capacity,
                self.target_rate,
                self.growth_factor,
                self.tightening_ratio,
                other.initial_capacity,
                other.target_rate,
                other.growth_factor,
                other.tightening_ratio
            )));
        }
        if self.slices.len() != other.slices.len() {
            return Err(BloomyError::incompatible_filters(format!(
                "slice count mismatch: {} vs {}",
                self.slices.len(),
                other.slices.len()
            )));
        }
        self.slices
            .iter()
            .zip(&other.slices)
            .try_for_each(|(a, b)| a.check_compatible(b))
    }

    fn union(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        let slices = self
            .slices
            .iter()
            .zip(&other.slices)
            .map(|(a, b)| a.union(b))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            slices,
            initial_capacity: self.initial_capacity,
            target_rate: self.target_rate,
            growth_factor: self.growth_factor,
            tightening_ratio: self.tightening_ratio,
            items_added: self.items_added.saturating_add(other.items_added),
        })
    }

    fn intersect(&self, _other: &Self) -> Result<Self> {
        Err(BloomyError::unsupported("intersect", "scalable"))
    }

    fn occupied_slots(&self) -> u64 {
        self.slices
            .iter()
            .map(StandardBloomFilter::count_set_bits)
            .sum()
    }

    fn shared_slots(&self, other: &Self) -> Result<u64> {
        self.check_compatible(other)?;
        self.slices
            .iter()
            .zip(&other.slices)
            .map(|(a, b)| a.shared_slots(b))
            .sum()
    }
}

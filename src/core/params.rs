//! Optimal parameter calculation for Bloom filters.
//!
//! # Mathematical Background
//!
//! Given:
//! - `n`: expected number of elements (capacity)
//! - `ε`: target false positive rate
//!
//! Optimal parameters:
//! - `m = ⌈-n × ln(ε) / (ln 2)²⌉` (bits in filter, at least 1)
//! - `k = round((m/n) × ln 2)` (number of hash functions, at least 1)
//!
//! Expected false positive rate after `n` inserts:
//! - `p = (1 - e^(-kn/m))^k`
//!
//! Expected fill ratio after `n` inserts, and its inverse used for
//! cardinality estimation:
//! - `f = 1 - e^(-kn/m)`
//! - `n ≈ -(m/k) × ln(1 - f)`
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/Time Trade-offs in Hash Coding with Allowable Errors"
//! - Swamidass & Baldi (2007). "Mathematical correction for fingerprint similarity measures"

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

use crate::error::{BloomyError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::LN_2;

/// (ln 2)² ≈ 0.4804530139182014
const LN2_SQUARED: f64 = LN_2 * LN_2;

/// Sanity ceiling on the bit array size.
pub const MAX_SIZE: u64 = 1_000_000_000;

/// Minimum number of hash functions.
pub const MIN_HASH_COUNT: u32 = 1;

/// Maximum number of hash functions.
pub const MAX_HASH_COUNT: u32 = 100;

/// Sizing of one Bloom filter, derived once from `(capacity, rate)`.
///
/// `Params` is an immutable value: filters hold a copy and never change it.
/// [`Params::compute`] derives it, [`Params::validate`] enforces the sanity
/// bounds (`1 ≤ size ≤ 1e9`, `1 ≤ hash_count ≤ 100`, `0 < rate < 1`).
///
/// # Examples
///
/// ```
/// use bloomy::core::params::Params;
///
/// let params = Params::compute(1000, 0.01).unwrap();
/// assert_eq!(params.size, 9586);
/// assert_eq!(params.hash_count, 7);
/// assert!((params.estimated_fp_rate - 0.01).abs() < 0.001);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Params {
    /// Bit (or counter) array length.
    pub size: u64,
    /// Number of hash indices per item.
    pub hash_count: u32,
    /// Number of items the filter was sized for.
    pub capacity: u64,
    /// Requested false positive rate.
    pub target_fp_rate: f64,
    /// False positive rate the chosen `(size, hash_count)` gives at `capacity`.
    pub estimated_fp_rate: f64,
}

impl Params {
    /// Derive optimal parameters for `capacity` items at false positive `rate`.
    ///
    /// The result is not range-checked against [`MAX_SIZE`]; call
    /// [`validate`](Self::validate) before allocating storage.
    ///
    /// # Errors
    ///
    /// - [`BloomyError::InvalidParameters`] if `capacity == 0`
    /// - [`BloomyError::InvalidRate`] if `rate` is not in `(0, 1)`
    pub fn compute(capacity: u64, rate: f64) -> Result<Self> {
        if capacity == 0 {
            return Err(BloomyError::invalid_parameters("capacity must be > 0"));
        }
        check_rate(rate)?;

        let size = optimal_size(capacity, rate);
        let hash_count = optimal_hash_count(size, capacity);
        Ok(Self::from_parts(capacity, rate, size, hash_count))
    }

    /// Assemble parameters from stored fields, recomputing the estimated rate.
    ///
    /// Used when decoding, where size and hash count are authoritative.
    #[must_use]
    pub fn from_parts(capacity: u64, target_fp_rate: f64, size: u64, hash_count: u32) -> Self {
        Self {
            size,
            hash_count,
            capacity,
            target_fp_rate,
            estimated_fp_rate: false_positive_rate(size, hash_count, capacity),
        }
    }

    /// Check the sanity bounds.
    ///
    /// # Errors
    ///
    /// - [`BloomyError::InvalidSize`] if `size == 0` or `size > 1e9`
    /// - [`BloomyError::InvalidHashCount`] if `hash_count == 0` or `hash_count > 100`
    /// - [`BloomyError::InvalidRate`] if `target_fp_rate` is not in `(0, 1)`
    /// - [`BloomyError::InvalidParameters`] if `capacity == 0`
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 || self.size > MAX_SIZE {
            return Err(BloomyError::InvalidSize { size: self.size });
        }
        if !(MIN_HASH_COUNT..=MAX_HASH_COUNT).contains(&self.hash_count) {
            return Err(BloomyError::InvalidHashCount {
                count: self.hash_count,
            });
        }
        check_rate(self.target_fp_rate)?;
        if self.capacity == 0 {
            return Err(BloomyError::invalid_parameters("capacity must be > 0"));
        }
        Ok(())
    }

    /// Compute and validate, folding any violation into `InvalidParameters`.
    ///
    /// This is what filter constructors call.
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::InvalidParameters`] describing the violation.
    pub fn for_filter(capacity: u64, rate: f64) -> Result<Self> {
        Self::compute(capacity, rate)
            .map_err(|err| wrap_violation(capacity, rate, err))?
            .checked()
    }

    /// Validate, folding any violation into `InvalidParameters`.
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::InvalidParameters`] describing the violation.
    pub fn checked(self) -> Result<Self> {
        self.validate()
            .map(|()| self)
            .map_err(|err| wrap_violation(self.capacity, self.target_fp_rate, err))
    }

    /// Bits of storage per expected item.
    #[must_use]
    pub fn bits_per_item(&self) -> f64 {
        self.size as f64 / self.capacity as f64
    }

    /// Storage bytes needed for the bit array.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.size.div_ceil(8) as usize
    }
}

fn wrap_violation(capacity: u64, rate: f64, err: BloomyError) -> BloomyError {
    match err {
        BloomyError::InvalidParameters { .. } => err,
        other => BloomyError::invalid_parameters(format!(
            "capacity={} rate={}: {}",
            capacity, rate, other
        )),
    }
}

fn check_rate(rate: f64) -> Result<()> {
    // Written so NaN is rejected too.
    if rate > 0.0 && rate < 1.0 {
        Ok(())
    } else {
        Err(BloomyError::InvalidRate { rate })
    }
}

/// Optimal number of bits: `max(1, ⌈-n × ln(ε) / (ln 2)²⌉)`.
///
/// Saturates at `u64::MAX` for absurd inputs; [`Params::validate`] rejects
/// anything above [`MAX_SIZE`].
///
/// ```
/// use bloomy::core::params::optimal_size;
///
/// assert_eq!(optimal_size(1000, 0.01), 9586);
/// assert_eq!(optimal_size(1, 0.99), 1);
/// ```
#[must_use]
pub fn optimal_size(capacity: u64, rate: f64) -> u64 {
    let m = -(capacity as f64) * rate.ln() / LN2_SQUARED;
    (m.ceil() as u64).max(1)
}

/// Optimal number of hash functions: `max(1, round((m/n) × ln 2))`.
///
/// `n == 0` yields 1. The result is not clamped to [`MAX_HASH_COUNT`].
///
/// ```
/// use bloomy::core::params::optimal_hash_count;
///
/// assert_eq!(optimal_hash_count(9586, 1000), 7);
/// assert_eq!(optimal_hash_count(10, 100_000), 1);
/// ```
#[must_use]
pub fn optimal_hash_count(size: u64, capacity: u64) -> u32 {
    if capacity == 0 {
        return MIN_HASH_COUNT;
    }
    let k = (size as f64 / capacity as f64) * LN_2;
    (k.round() as u32).max(MIN_HASH_COUNT)
}

/// Expected false positive rate `(1 - e^(-kn/m))^k` after `n` inserts.
#[must_use]
pub fn false_positive_rate(size: u64, hash_count: u32, items: u64) -> f64 {
    if size == 0 {
        return 1.0;
    }
    expected_fill_ratio(size, hash_count, items).powi(hash_count as i32)
}

/// Expected fraction of set bits `1 - e^(-kn/m)` after `n` inserts.
#[must_use]
pub fn expected_fill_ratio(size: u64, hash_count: u32, items: u64) -> f64 {
    if size == 0 {
        return 1.0;
    }
    let exponent = -(f64::from(hash_count) * items as f64) / size as f64;
    1.0 - exponent.exp()
}

/// Estimate how many distinct items produced `fill_ratio`.
///
/// Inverse of [`expected_fill_ratio`]: `-(m/k) × ln(1 - f)`. Saturates at
/// `m/k` when `fill_ratio ≥ 1`, and returns 0 for an empty store.
///
/// ```
/// use bloomy::core::params::{estimate_item_count, expected_fill_ratio};
///
/// let fill = expected_fill_ratio(9586, 7, 1000);
/// let n = estimate_item_count(9586, 7, fill);
/// assert!((n - 1000.0).abs() < 1e-6);
/// ```
#[must_use]
pub fn estimate_item_count(size: u64, hash_count: u32, fill_ratio: f64) -> f64 {
    let k = f64::from(hash_count.max(MIN_HASH_COUNT));
    let m = size as f64;
    if fill_ratio >= 1.0 {
        return m / k;
    }
    if fill_ratio <= 0.0 {
        return 0.0;
    }
    -(m / k) * (1.0 - fill_ratio).ln()
}

/// Bits per element needed for false positive `rate`: `-ln(ε) / (ln 2)²`.
///
/// # Errors
///
/// Returns [`BloomyError::InvalidRate`] if `rate` is not in `(0, 1)`.
pub fn bits_per_element(rate: f64) -> Result<f64> {
    check_rate(rate)?;
    Ok(-rate.ln() / LN2_SQUARED)
}

#[cfg(test)]
mod tests {
    use super::*;

    // -(1000 × ln 0.01) / ln²2 = 9585.06
    const EXPECTED_BITS_1000_1PCT: u64 = 9586;
    const EXPECTED_HASH_1000_1PCT: u32 = 7;

    #[test]
    fn test_ln2_squared_constant() {
        let expected = 0.480_453_013_918_201_4;
        assert!((LN2_SQUARED - expected).abs() < 1e-15);
    }

    #[test]
    fn test_compute_1_percent() {
        let p = Params::compute(1000, 0.01).unwrap();
        assert_eq!(p.size, EXPECTED_BITS_1000_1PCT);
        assert_eq!(p.hash_count, EXPECTED_HASH_1000_1PCT);
        assert_eq!(p.capacity, 1000);
        assert_eq!(p.target_fp_rate, 0.01);
        assert!((p.estimated_fp_rate - 0.010_034_5).abs() < 1e-6);
    }

    #[test]
    fn test_compute_table() {
        let cases = [
            (10, 0.01, 96, 7),
            (20, 0.008, 201, 7),
            (100, 0.01, 959, 7),
            (1, 0.5, 2, 1),
            (1, 0.99, 1, 1),
        ];
        for (n, rate, size, k) in cases {
            let p = Params::compute(n, rate).unwrap();
            assert_eq!((p.size, p.hash_count), (size, k), "n={} rate={}", n, rate);
        }
    }

    #[test]
    fn test_compute_zero_capacity() {
        let err = Params::compute(0, 0.01).unwrap_err();
        assert!(matches!(err, BloomyError::InvalidParameters { .. }));
    }

    #[test]
    fn test_compute_invalid_rates() {
        for rate in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            let err = Params::compute(1000, rate).unwrap_err();
            assert!(matches!(err, BloomyError::InvalidRate { .. }), "rate={}", rate);
        }
    }

    #[test]
    fn test_validate_accepts_computed() {
        Params::compute(1000, 0.01).unwrap().validate().unwrap();
    }

    #[test]
    fn test_validate_size_bounds() {
        let mut p = Params::compute(1000, 0.01).unwrap();
        p.size = 0;
        assert_eq!(p.validate(), Err(BloomyError::InvalidSize { size: 0 }));

        p.size = MAX_SIZE + 1;
        assert_eq!(
            p.validate(),
            Err(BloomyError::InvalidSize { size: MAX_SIZE + 1 })
        );

        p.size = MAX_SIZE;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_validate_hash_count_bounds() {
        let mut p = Params::compute(1000, 0.01).unwrap();
        p.hash_count = 0;
        assert_eq!(p.validate(), Err(BloomyError::InvalidHashCount { count: 0 }));
        p.hash_count = 101;
        assert_eq!(p.validate(), Err(BloomyError::InvalidHashCount { count: 101 }));
        p.hash_count = 100;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_for_filter_wraps_violations() {
        // 1e9 items at 1% needs ~9.6e9 bits, above the ceiling.
        let err = Params::for_filter(1_000_000_000, 0.01).unwrap_err();
        match err {
            BloomyError::InvalidParameters { message } => assert!(message.contains("bits")),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = Params::for_filter(1000, 2.0).unwrap_err();
        assert!(matches!(err, BloomyError::InvalidParameters { .. }));
    }

    #[test]
    fn test_huge_capacity_saturates_then_fails_validation() {
        let p = Params::compute(u64::MAX, 0.01).unwrap();
        assert!(p.size > MAX_SIZE);
        assert!(matches!(p.validate(), Err(BloomyError::InvalidSize { .. })));
    }

    #[test]
    fn test_optimal_hash_count_zero_capacity() {
        assert_eq!(optimal_hash_count(1000, 0), 1);
    }

    #[test]
    fn test_false_positive_rate_monotonic_in_items() {
        let low = false_positive_rate(9586, 7, 500);
        let mid = false_positive_rate(9586, 7, 1000);
        let high = false_positive_rate(9586, 7, 2000);
        assert!(low < mid && mid < high);
        assert_eq!(false_positive_rate(9586, 7, 0), 0.0);
    }

    #[test]
    fn test_estimate_item_count_inverse() {
        for n in [1_u64, 10, 500, 1000, 3000] {
            let fill = expected_fill_ratio(9586, 7, n);
            let est = estimate_item_count(9586, 7, fill);
            assert!((est - n as f64).abs() < 1e-6 * n as f64 + 1e-9, "n={}", n);
        }
    }

    #[test]
    fn test_estimate_item_count_saturates() {
        assert_eq!(estimate_item_count(700, 7, 1.0), 100.0);
        assert_eq!(estimate_item_count(700, 7, 1.5), 100.0);
        assert_eq!(estimate_item_count(700, 7, 0.0), 0.0);
    }

    #[test]
    fn test_bits_per_element() {
        let bpe = bits_per_element(0.01).unwrap();
        assert!((bpe - 9.585).abs() < 0.001);
        assert!(bits_per_element(0.0).is_err());
    }

    #[test]
    fn test_byte_len_and_bits_per_item() {
        let p = Params::compute(1000, 0.01).unwrap();
        assert_eq!(p.byte_len(), 1199);
        assert!((p.bits_per_item() - 9.586).abs() < 1e-9);
    }

    #[test]
    fn test_params_serde_json() {
        let p = Params::compute(1000, 0.01).unwrap();
        let json = serde_json::to_string(&p).unwrap();
        let back: Params = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}

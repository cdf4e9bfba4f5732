//! Filter construction options.
//!
//! Options are an explicit value passed to [`Filter::create`]; there is no
//! process-wide default to mutate. Fields a variant does not use are ignored
//! by it (counter width only matters to counting filters, growth settings only
//! to scalable ones).
//!
//! `FilterOptions` deserializes with every field optional, so callers can keep
//! it in their own JSON or TOML configuration:
//!
//! ```
//! use bloomy::config::FilterOptions;
//! use bloomy::core::CounterWidth;
//!
//! let opts: FilterOptions = serde_json::from_str(r#"{"counter_width": 16}"#).unwrap();
//! assert_eq!(opts.counter_width, CounterWidth::Bits16);
//! assert_eq!(opts.false_positive_rate, 0.01);
//! ```
//!
//! [`Filter::create`]: crate::filters::Filter::create

use crate::core::counters::CounterWidth;
use crate::error::{BloomyError, Result};
use serde::{Deserialize, Serialize};

/// Default target false positive rate.
pub const DEFAULT_FALSE_POSITIVE_RATE: f64 = 0.01;

/// Default capacity multiplier between scalable slices.
pub const DEFAULT_GROWTH_FACTOR: u32 = 2;

/// Default rate multiplier between scalable slices.
pub const DEFAULT_TIGHTENING_RATIO: f64 = 0.8;

/// Options for [`Filter::create`](crate::filters::Filter::create).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterOptions {
    /// Target false positive rate, in `(0, 1)`.
    pub false_positive_rate: f64,
    /// Counter width for counting filters.
    pub counter_width: CounterWidth,
    /// Capacity multiplier between scalable slices, at least 1.
    pub growth_factor: u32,
    /// Rate multiplier between scalable slices, in `(0, 1]`.
    pub tightening_ratio: f64,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            false_positive_rate: DEFAULT_FALSE_POSITIVE_RATE,
            counter_width: CounterWidth::default(),
            growth_factor: DEFAULT_GROWTH_FACTOR,
            tightening_ratio: DEFAULT_TIGHTENING_RATIO,
        }
    }
}

impl FilterOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target false positive rate.
    #[must_use]
    pub fn with_false_positive_rate(mut self, rate: f64) -> Self {
        self.false_positive_rate = rate;
        self
    }

    /// Set the counter width.
    #[must_use]
    pub fn with_counter_width(mut self, width: CounterWidth) -> Self {
        self.counter_width = width;
        self
    }

    /// Set the scalable growth factor.
    #[must_use]
    pub fn with_growth_factor(mut self, growth_factor: u32) -> Self {
        self.growth_factor = growth_factor;
        self
    }

    /// Set the scalable tightening ratio.
    #[must_use]
    pub fn with_tightening_ratio(mut self, ratio: f64) -> Self {
        self.tightening_ratio = ratio;
        self
    }

    /// Check every field range.
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::InvalidParameters`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        validate_rate(self.false_positive_rate)?;
        validate_growth(self.growth_factor, self.tightening_ratio)
    }
}

pub(crate) fn validate_rate(rate: f64) -> Result<()> {
    if rate > 0.0 && rate < 1.0 {
        Ok(())
    } else {
        Err(BloomyError::invalid_parameters(format!(
            "false_positive_rate must be in (0, 1), got {}",
            rate
        )))
    }
}

pub(crate) fn validate_growth(growth_factor: u32, tightening_ratio: f64) -> Result<()> {
    if growth_factor == 0 {
        return Err(BloomyError::invalid_parameters(
            "growth_factor must be at least 1",
        ));
    }
    if !(tightening_ratio > 0.0 && tightening_ratio <= 1.0) {
        return Err(BloomyError::invalid_parameters(format!(
            "tightening_ratio must be in (0, 1], got {}",
            tightening_ratio
        )));
    }
    Ok(())
}

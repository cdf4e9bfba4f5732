//! JSON metadata records, one per filter type.
//!
//! Field names are part of the format. Unknown fields are ignored on read so
//! a newer writer can add fields without breaking older readers.

use super::compression;
use super::WireError;
use crate::core::counters::CounterWidth;
use crate::core::filter::BloomFilter;
use crate::core::params::Params;
use crate::core::{BitStore, CounterStore};
use crate::error::{BloomyError, Result};
use crate::filters::scalable::SliceLayout;
use crate::filters::{CountingBloomFilter, ScalableBloomFilter, StandardBloomFilter};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StandardMeta {
    pub capacity: u64,
    pub target_rate: f64,
    pub size: u64,
    pub hash_count: u32,
    pub items_added: u64,
}

impl StandardMeta {
    pub fn from_filter(filter: &StandardBloomFilter) -> Self {
        let params = filter.params();
        Self {
            capacity: params.capacity,
            target_rate: params.target_fp_rate,
            size: params.size,
            hash_count: params.hash_count,
            items_added: filter.items_added(),
        }
    }

    pub fn params(&self) -> Result<Params> {
        checked_params(self.capacity, self.target_rate, self.size, self.hash_count)
    }

    /// Rebuild the filter from its bit buffer, inflating it first if `compressed`.
    pub fn into_filter(self, payload: &[u8], compressed: bool) -> Result<StandardBloomFilter> {
        let params = self.params()?;
        let payload = inflate(payload, params.byte_len(), compressed)?;
        let bits = BitStore::from_bytes(params.size, &payload)?;
        StandardBloomFilter::from_parts(params, bits, self.items_added)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct CountingMeta {
    pub capacity: u64,
    pub target_rate: f64,
    pub size: u64,
    pub hash_count: u32,
    pub items_added: u64,
    pub counter_width: CounterWidth,
}

impl CountingMeta {
    pub fn from_filter(filter: &CountingBloomFilter) -> Self {
        let params = filter.params();
        Self {
            capacity: params.capacity,
            target_rate: params.target_fp_rate,
            size: params.size,
            hash_count: params.hash_count,
            items_added: filter.items_added(),
            counter_width: filter.counter_width(),
        }
    }

    pub fn into_filter(self, payload: &[u8], compressed: bool) -> Result<CountingBloomFilter> {
        let params = checked_params(self.capacity, self.target_rate, self.size, self.hash_count)?;
        let expected = params.size as usize * self.counter_width.bytes();
        let payload = inflate(payload, expected, compressed)?;
        let counters = CounterStore::from_bytes(params.size, self.counter_width, &payload)?;
        CountingBloomFilter::from_parts(params, counters, self.items_added)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct SliceMeta {
    #[serde(flatten)]
    pub standard: StandardMeta,
    /// Bit buffer, zlib compressed when the header's flag is set.
    pub bits: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ScalableMeta {
    pub initial_capacity: u64,
    pub target_rate: f64,
    pub growth_factor: u32,
    pub tightening_ratio: f64,
    pub items_added: u64,
    /// Oldest first.
    pub slices: Vec<SliceMeta>,
}

impl ScalableMeta {
    pub fn from_filter(
        filter: &ScalableBloomFilter,
        compress: bool,
    ) -> std::result::Result<Self, WireError> {
        let slices = filter
            .slices()
            .iter()
            .map(|slice| {
                let raw = slice.bits().to_bytes();
                let bits = if compress {
                    compression::compress(&raw)?
                } else {
                    raw
                };
                Ok(SliceMeta {
                    standard: StandardMeta::from_filter(slice),
                    bits,
                })
            })
            .collect::<std::result::Result<Vec<_>, WireError>>()?;

        Ok(Self {
            initial_capacity: filter.initial_capacity(),
            target_rate: filter.target_fp_rate(),
            growth_factor: filter.growth_factor(),
            tightening_ratio: filter.tightening_ratio(),
            items_added: filter.items_added(),
            slices,
        })
    }

    /// Check the slice records against the growth policy, then inflate them.
    ///
    /// Nothing is allocated for a slice until every record has passed.
    pub fn into_filter(self, compressed: bool) -> Result<ScalableBloomFilter> {
        let layout = SliceLayout::checked(
            self.initial_capacity,
            self.target_rate,
            self.growth_factor,
            self.tightening_ratio,
        )?;
        layout.check_count(self.slices.len())?;
        for (index, slice) in self.slices.iter().enumerate() {
            layout.check_slice(index, &slice.standard.params()?)?;
        }

        let slices = self
            .slices
            .into_iter()
            .map(|slice| slice.standard.into_filter(&slice.bits, compressed))
            .collect::<Result<Vec<_>>>()?;

        ScalableBloomFilter::from_parts(
            self.initial_capacity,
            self.target_rate,
            self.growth_factor,
            self.tightening_ratio,
            slices,
            self.items_added,
        )
    }
}

fn inflate(data: &[u8], expected_len: usize, compressed: bool) -> Result<Cow<'_, [u8]>> {
    if compressed {
        Ok(Cow::Owned(compression::decompress(data, expected_len)?))
    } else {
        Ok(Cow::Borrowed(data))
    }
}

/// Rebuild and validate stored parameters; any violation is a malformed input.
fn checked_params(capacity: u64, target_rate: f64, size: u64, hash_count: u32) -> Result<Params> {
    let params = Params::from_parts(capacity, target_rate, size, hash_count);
    params
        .validate()
        .map_err(|err| BloomyError::malformed(format!("invalid parameters: {}", err)))?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::scalable::MAX_SLICES;

    #[test]
    fn test_standard_meta_json_fields() {
        let mut f = StandardBloomFilter::new(1000, 0.01).unwrap();
        f.add("apple");
        let json = serde_json::to_value(StandardMeta::from_filter(&f)).unwrap();
        assert_eq!(json["capacity"], 1000);
        assert_eq!(json["target_rate"], 0.01);
        assert_eq!(json["size"], 9586);
        assert_eq!(json["hash_count"], 7);
        assert_eq!(json["items_added"], 1);
    }

    #[test]
    fn test_counting_meta_width_as_bits() {
        let f = CountingBloomFilter::new(100, 0.01, CounterWidth::Bits32).unwrap();
        let json = serde_json::to_value(CountingMeta::from_filter(&f)).unwrap();
        assert_eq!(json["counter_width"], 32);
    }

    #[test]
    fn test_slice_meta_is_flat() {
        let f = ScalableBloomFilter::new(10, 0.01).unwrap();
        let meta = ScalableMeta::from_filter(&f, false).unwrap();
        let json = serde_json::to_value(&meta).unwrap();
        let slice = &json["slices"][0];
        assert_eq!(slice["capacity"], 10);
        assert!(slice["bits"].is_array());
        assert!(slice.get("standard").is_none());
    }

    fn scalable_meta(items: u64) -> ScalableMeta {
        let mut f = ScalableBloomFilter::new(10, 0.01).unwrap();
        f.add_all(0..items);
        ScalableMeta::from_filter(&f, false).unwrap()
    }

    #[test]
    fn test_too_many_slices_rejected() {
        let mut meta = scalable_meta(0);
        let first = meta.slices[0].clone();
        meta.slices.resize(MAX_SLICES + 1, first);

        let err = meta.into_filter(false).unwrap_err();
        assert!(matches!(err, BloomyError::MalformedBinary { .. }));
        assert!(err.to_string().contains("65"));
    }

    #[test]
    fn test_slice_rate_must_follow_policy() {
        let mut meta = scalable_meta(15);
        assert_eq!(meta.slices.len(), 2);
        meta.slices[1].standard.target_rate = 0.5;

        let err = meta.into_filter(false).unwrap_err();
        assert!(matches!(err, BloomyError::MalformedBinary { .. }));
        assert!(err.to_string().contains("rate"));
    }

    #[test]
    fn test_slice_shape_checked_before_inflating() {
        // A slice that claims a huge size would fail the policy check, so
        // its bogus buffer is never inflated.
        let mut meta = scalable_meta(15);
        meta.slices[1].standard.size = 900_000_000;
        meta.slices[1].bits = vec![0xFF; 3];

        let err = meta.into_filter(true).unwrap_err();
        assert!(matches!(err, BloomyError::MalformedBinary { .. }));
        assert!(err.to_string().contains("size"));
    }

    #[test]
    fn test_consistent_slices_accepted() {
        let meta = scalable_meta(31);
        let filter = meta.into_filter(false).unwrap();
        assert_eq!(filter.slice_count(), 3);
        assert_eq!(filter.items_added(), 31);
    }

    #[test]
    fn test_invalid_params_are_malformed() {
        let meta = StandardMeta {
            capacity: 100,
            target_rate: 0.01,
            size: 960,
            hash_count: 0,
            items_added: 0,
        };
        let err = meta.into_filter(&[0u8; 120], false).unwrap_err();
        assert!(matches!(err, BloomyError::MalformedBinary { .. }));
    }
}

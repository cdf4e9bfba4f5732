//! Saturating counter array backing counting filters.
//!
//! Counters are 8, 16 or 32 bits wide. Increment clamps at the width's
//! maximum and decrement clamps at zero; nothing ever wraps or errors.
//!
//! # Counter Width Selection
//!
//! | Width | Max value     | Memory per slot |
//! |-------|---------------|-----------------|
//! | 8     | 255           | 1 byte          |
//! | 16    | 65 535        | 2 bytes         |
//! | 32    | 4 294 967 295 | 4 bytes         |

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use crate::core::params::MAX_SIZE;
use crate::error::{BloomyError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of each counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CounterWidth {
    /// 8-bit counters, max 255.
    #[default]
    Bits8,
    /// 16-bit counters, max 65535.
    Bits16,
    /// 32-bit counters, max 4294967295.
    Bits32,
}

impl CounterWidth {
    /// Width in bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Bits8 => 8,
            Self::Bits16 => 16,
            Self::Bits32 => 32,
        }
    }

    /// Width in bytes.
    #[must_use]
    pub const fn bytes(self) -> usize {
        self.bits() as usize / 8
    }

    /// Largest value a counter can hold: `2^w - 1`.
    #[must_use]
    pub const fn max_value(self) -> u32 {
        match self {
            Self::Bits8 => u8::MAX as u32,
            Self::Bits16 => u16::MAX as u32,
            Self::Bits32 => u32::MAX,
        }
    }
}

impl TryFrom<u8> for CounterWidth {
    type Error = BloomyError;

    fn try_from(bits: u8) -> Result<Self> {
        match bits {
            8 => Ok(Self::Bits8),
            16 => Ok(Self::Bits16),
            32 => Ok(Self::Bits32),
            other => Err(BloomyError::invalid_parameters(format!(
                "counter width must be 8, 16 or 32 bits, got {}",
                other
            ))),
        }
    }
}

impl From<CounterWidth> for u8 {
    fn from(width: CounterWidth) -> Self {
        width.bits()
    }
}

impl fmt::Display for CounterWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

trait Cell: Copy + Ord + Default {
    const MAX: Self;
    const BYTES: usize;

    fn bump(self) -> Self;
    fn drop_one(self) -> Self;
    fn widen(self) -> u32;
    fn put_be(self, out: &mut Vec<u8>);
    fn read_be(chunk: &[u8]) -> Self;
}

macro_rules! impl_cell {
    ($($t:ty),*) => {
        $(
            impl Cell for $t {
                const MAX: Self = <$t>::MAX;
                const BYTES: usize = std::mem::size_of::<$t>();

                #[inline]
                fn bump(self) -> Self {
                    self.saturating_add(1)
                }

                #[inline]
                fn drop_one(self) -> Self {
                    self.saturating_sub(1)
                }

                #[inline]
                fn widen(self) -> u32 {
                    u32::from(self)
                }

                #[inline]
                fn put_be(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_be_bytes());
                }

                #[inline]
                fn read_be(chunk: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(chunk);
                    <$t>::from_be_bytes(buf)
                }
            }
        )*
    };
}

impl_cell!(u8, u16, u32);

fn increment_cells<C: Cell>(cells: &mut [C], indices: impl IntoIterator<Item = u64>) -> usize {
    let mut saturated = 0;
    for index in indices {
        let cell = &mut cells[index as usize];
        if *cell == C::MAX {
            saturated += 1;
        } else {
            *cell = cell.bump();
        }
    }
    saturated
}

fn decrement_cells<C: Cell>(cells: &mut [C], indices: impl IntoIterator<Item = u64>) -> usize {
    let mut at_zero = 0;
    for index in indices {
        let cell = &mut cells[index as usize];
        if *cell == C::default() {
            at_zero += 1;
        } else {
            *cell = cell.drop_one();
        }
    }
    at_zero
}

fn max_cells<C: Cell>(a: &[C], b: &[C]) -> Vec<C> {
    a.iter().zip(b).map(|(&x, &y)| x.max(y)).collect()
}

fn encode_cells<C: Cell>(cells: &[C]) -> Vec<u8> {
    let mut out = Vec::with_capacity(cells.len() * C::BYTES);
    for &cell in cells {
        cell.put_be(&mut out);
    }
    out
}

fn decode_cells<C: Cell>(bytes: &[u8]) -> Vec<C> {
    bytes.chunks_exact(C::BYTES).map(C::read_be).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cells {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
}

macro_rules! with_cells {
    ($cells:expr, $c:ident => $body:expr) => {
        match $cells {
            Cells::U8($c) => $body,
            Cells::U16($c) => $body,
            Cells::U32($c) => $body,
        }
    };
}

/// Fixed-size array of saturating counters.
///
/// # Examples
///
/// ```
/// use bloomy::core::{CounterStore, CounterWidth};
///
/// let mut store = CounterStore::new(16, CounterWidth::Bits8).unwrap();
/// store.increment([3, 3, 7]);
/// assert_eq!(store.get(3), 2);
/// assert!(store.all_nonzero([3, 7]));
///
/// store.decrement([7]);
/// assert!(!store.all_nonzero([3, 7]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterStore {
    cells: Cells,
    width: CounterWidth,
}

impl CounterStore {
    /// Create `size` zeroed counters of `width`.
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::InvalidSize`] if `size` is 0 or above `1e9`.
    pub fn new(size: u64, width: CounterWidth) -> Result<Self> {
        if size == 0 || size > MAX_SIZE {
            return Err(BloomyError::InvalidSize { size });
        }
        let n = size as usize;
        let cells = match width {
            CounterWidth::Bits8 => Cells::U8(vec![0; n]),
            CounterWidth::Bits16 => Cells::U16(vec![0; n]),
            CounterWidth::Bits32 => Cells::U32(vec![0; n]),
        };
        Ok(Self { cells, width })
    }

    /// Number of counters.
    #[must_use]
    pub fn size(&self) -> u64 {
        with_cells!(&self.cells, c => c.len() as u64)
    }

    /// Counter width.
    #[must_use]
    pub fn width(&self) -> CounterWidth {
        self.width
    }

    /// Largest value a counter can hold.
    #[must_use]
    pub fn max_value(&self) -> u32 {
        self.width.max_value()
    }

    /// Read one counter.
    #[must_use]
    pub fn get(&self, index: u64) -> u32 {
        with_cells!(&self.cells, c => c[index as usize].widen())
    }

    /// Add one to each referenced counter, clamping at the maximum.
    ///
    /// Returns how many of the referenced counters were already saturated.
    pub fn increment<I: IntoIterator<Item = u64>>(&mut self, indices: I) -> usize {
        with_cells!(&mut self.cells, c => increment_cells(c, indices))
    }

    /// Subtract one from each referenced counter, clamping at zero.
    ///
    /// Returns how many of the referenced counters were already zero.
    pub fn decrement<I: IntoIterator<Item = u64>>(&mut self, indices: I) -> usize {
        with_cells!(&mut self.cells, c => decrement_cells(c, indices))
    }

    /// True iff every referenced counter is non-zero. The membership primitive.
    #[must_use]
    pub fn all_nonzero<I: IntoIterator<Item = u64>>(&self, indices: I) -> bool {
        indices.into_iter().all(|index| self.get(index) != 0)
    }

    /// Smallest referenced counter, 0 for an empty index set.
    #[must_use]
    pub fn min_count<I: IntoIterator<Item = u64>>(&self, indices: I) -> u32 {
        indices.into_iter().map(|index| self.get(index)).min().unwrap_or(0)
    }

    /// Zero all counters.
    pub fn clear(&mut self) {
        with_cells!(&mut self.cells, c => c.iter_mut().for_each(|x| *x = Default::default()))
    }

    /// Number of non-zero counters.
    #[must_use]
    pub fn count_nonzero(&self) -> u64 {
        with_cells!(&self.cells, c => c.iter().filter(|x| x.widen() != 0).count() as u64)
    }

    /// Number of counters stuck at the maximum.
    #[must_use]
    pub fn saturated_count(&self) -> u64 {
        let max = self.max_value();
        with_cells!(&self.cells, c => c.iter().filter(|x| x.widen() == max).count() as u64)
    }

    /// Fraction of non-zero counters.
    #[must_use]
    pub fn fill_ratio(&self) -> f64 {
        self.count_nonzero() as f64 / self.size() as f64
    }

    /// Heap bytes held by the store.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.size() as usize * self.width.bytes()
    }

    /// Element-wise maximum into a new store.
    ///
    /// # Errors
    ///
    /// - [`BloomyError::SizeMismatch`] if sizes differ
    /// - [`BloomyError::IncompatibleFilters`] if widths differ
    pub fn union_max(&self, other: &Self) -> Result<Self> {
        if self.size() != other.size() {
            return Err(BloomyError::SizeMismatch {
                left: self.size(),
                right: other.size(),
            });
        }
        let cells = match (&self.cells, &other.cells) {
            (Cells::U8(a), Cells::U8(b)) => Cells::U8(max_cells(a, b)),
            (Cells::U16(a), Cells::U16(b)) => Cells::U16(max_cells(a, b)),
            (Cells::U32(a), Cells::U32(b)) => Cells::U32(max_cells(a, b)),
            _ => {
                return Err(BloomyError::incompatible_filters(format!(
                    "counter width mismatch: {} vs {}",
                    self.width, other.width
                )))
            }
        };
        Ok(Self {
            cells,
            width: self.width,
        })
    }

    /// Number of slots non-zero in both stores.
    ///
    /// # Errors
    ///
    /// Returns [`BloomyError::SizeMismatch`] if sizes differ.
    pub fn shared_nonzero(&self, other: &Self) -> Result<u64> {
        if self.size() != other.size() {
            return Err(BloomyError::SizeMismatch {
                left: self.size(),
                right: other.size(),
            });
        }
        Ok((0..self.size())
            .filter(|&i| self.get(i) != 0 && other.get(i) != 0)
            .count() as u64)
    }

    /// Serialize counters as consecutive big-endian integers of the store's width.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        with_cells!(&self.cells, c => encode_cells(c))
    }

    /// Rebuild a store from [`to_bytes`](Self::to_bytes) output.
    ///
    /// # Errors
    ///
    /// - [`BloomyError::InvalidSize`] if `size` is out of range
    /// - [`BloomyError::MalformedBinary`] if `bytes.len() != size * width/8`
    pub fn from_bytes(size: u64, width: CounterWidth, bytes: &[u8]) -> Result<Self> {
        if size == 0 || size > MAX_SIZE {
            return Err(BloomyError::InvalidSize { size });
        }
        let expected = size as usize * width.bytes();
        if bytes.len() != expected {
            return Err(BloomyError::malformed(format!(
                "counter buffer is {} bytes, expected {} for {} {} counters",
                bytes.len(),
                expected,
                size,
                width
            )));
        }
        let cells = match width {
            CounterWidth::Bits8 => Cells::U8(bytes.to_vec()),
            CounterWidth::Bits16 => Cells::U16(decode_cells(bytes)),
            CounterWidth::Bits32 => Cells::U32(decode_cells(bytes)),
        };
        Ok(Self { cells, width })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_values() {
        assert_eq!(CounterWidth::Bits8.max_value(), 255);
        assert_eq!(CounterWidth::Bits16.max_value(), 65_535);
        assert_eq!(CounterWidth::Bits32.max_value(), 4_294_967_295);
        assert_eq!(CounterWidth::Bits16.bytes(), 2);
        assert_eq!(CounterWidth::default(), CounterWidth::Bits8);
    }

    #[test]
    fn test_width_try_from() {
        assert_eq!(CounterWidth::try_from(16).unwrap(), CounterWidth::Bits16);
        let err = CounterWidth::try_from(12).unwrap_err();
        assert!(matches!(err, BloomyError::InvalidParameters { .. }));
        assert_eq!(u8::from(CounterWidth::Bits32), 32);
    }

    #[test]
    fn test_width_serde_as_bits() {
        assert_eq!(serde_json::to_string(&CounterWidth::Bits16).unwrap(), "16");
        let w: CounterWidth = serde_json::from_str("32").unwrap();
        assert_eq!(w, CounterWidth::Bits32);
        assert!(serde_json::from_str::<CounterWidth>("7").is_err());
    }

    #[test]
    fn test_new_invalid_size() {
        assert!(CounterStore::new(0, CounterWidth::Bits8).is_err());
    }

    #[test]
    fn test_increment_decrement() {
        let mut s = CounterStore::new(10, CounterWidth::Bits16).unwrap();
        assert_eq!(s.increment([1, 2, 2]), 0);
        assert_eq!(s.get(1), 1);
        assert_eq!(s.get(2), 2);
        assert_eq!(s.count_nonzero(), 2);

        assert_eq!(s.decrement([2]), 0);
        assert_eq!(s.get(2), 1);
        assert_eq!(s.min_count([1, 2]), 1);
    }

    #[test]
    fn test_increment_saturates() {
        for width in [CounterWidth::Bits8, CounterWidth::Bits16] {
            let mut s = CounterStore::new(4, width).unwrap();
            let max = width.max_value();
            for _ in 0..max {
                s.increment([0]);
            }
            assert_eq!(s.get(0), max);
            assert_eq!(s.increment([0]), 1);
            assert_eq!(s.get(0), max);
            assert_eq!(s.saturated_count(), 1);
        }
    }

    #[test]
    fn test_decrement_saturates_at_zero() {
        let mut s = CounterStore::new(4, CounterWidth::Bits8).unwrap();
        assert_eq!(s.decrement([0, 1]), 2);
        assert_eq!(s.get(0), 0);
        assert_eq!(s.get(1), 0);
    }

    #[test]
    fn test_all_nonzero() {
        let mut s = CounterStore::new(8, CounterWidth::Bits32).unwrap();
        s.increment([1, 3]);
        assert!(s.all_nonzero([1, 3]));
        assert!(!s.all_nonzero([1, 2]));
    }

    #[test]
    fn test_clear_and_fill_ratio() {
        let mut s = CounterStore::new(4, CounterWidth::Bits8).unwrap();
        s.increment([0, 1]);
        assert_eq!(s.fill_ratio(), 0.5);
        s.clear();
        assert_eq!(s.count_nonzero(), 0);
    }

    #[test]
    fn test_union_max() {
        let mut a = CounterStore::new(4, CounterWidth::Bits8).unwrap();
        let mut b = CounterStore::new(4, CounterWidth::Bits8).unwrap();
        a.increment([0, 0, 1]);
        b.increment([0, 2, 2, 2]);
        let u = a.union_max(&b).unwrap();
        assert_eq!((u.get(0), u.get(1), u.get(2), u.get(3)), (2, 1, 3, 0));
    }

    #[test]
    fn test_union_max_mismatch() {
        let a = CounterStore::new(4, CounterWidth::Bits8).unwrap();
        let b = CounterStore::new(5, CounterWidth::Bits8).unwrap();
        let c = CounterStore::new(4, CounterWidth::Bits16).unwrap();
        assert!(matches!(a.union_max(&b), Err(BloomyError::SizeMismatch { .. })));
        assert!(matches!(
            a.union_max(&c),
            Err(BloomyError::IncompatibleFilters { .. })
        ));
    }

    #[test]
    fn test_shared_nonzero() {
        let mut a = CounterStore::new(8, CounterWidth::Bits8).unwrap();
        let mut b = CounterStore::new(8, CounterWidth::Bits16).unwrap();
        a.increment([0, 1, 2]);
        b.increment([1, 2, 3]);
        assert_eq!(a.shared_nonzero(&b).unwrap(), 2);
        let c = CounterStore::new(9, CounterWidth::Bits8).unwrap();
        assert!(a.shared_nonzero(&c).is_err());
    }

    #[test]
    fn test_bytes_big_endian() {
        let mut s = CounterStore::new(2, CounterWidth::Bits16).unwrap();
        s.increment([1, 1, 1]);
        assert_eq!(s.to_bytes(), vec![0, 0, 0, 3]);

        let back = CounterStore::from_bytes(2, CounterWidth::Bits16, &[0x01, 0x02, 0, 3]).unwrap();
        assert_eq!(back.get(0), 0x0102);
        assert_eq!(back.get(1), 3);
    }

    #[test]
    fn test_bytes_round_trip_all_widths() {
        for width in [CounterWidth::Bits8, CounterWidth::Bits16, CounterWidth::Bits32] {
            let mut s = CounterStore::new(33, width).unwrap();
            s.increment([0, 5, 5, 32]);
            let back = CounterStore::from_bytes(33, width, &s.to_bytes()).unwrap();
            assert_eq!(back, s);
        }
    }

    #[test]
    fn test_from_bytes_wrong_length() {
        let err = CounterStore::from_bytes(4, CounterWidth::Bits32, &[0; 15]).unwrap_err();
        assert!(matches!(err, BloomyError::MalformedBinary { .. }));
    }
}

//! Canonical byte encoding of filter items.
//!
//! Hashing works on bytes. Strings and byte sequences pass through as is,
//! integers use their fixed-width little-endian bytes. Any other type opts in
//! by implementing [`BloomItem`] with its own stable encoding.
//!
//! ```
//! use bloomy::hash::BloomItem;
//! use std::borrow::Cow;
//!
//! struct UserId { shard: u16, id: u64 }
//!
//! impl BloomItem for UserId {
//!     fn item_bytes(&self) -> Cow<'_, [u8]> {
//!         let mut buf = Vec::with_capacity(10);
//!         buf.extend_from_slice(&self.shard.to_le_bytes());
//!         buf.extend_from_slice(&self.id.to_le_bytes());
//!         Cow::Owned(buf)
//!     }
//! }
//!
//! let id = UserId { shard: 1, id: 42 };
//! assert_eq!(id.item_bytes().len(), 10);
//! ```

use std::borrow::Cow;

/// A value with a canonical byte representation for hashing.
///
/// Two values that should be treated as the same member must yield the same
/// bytes, on every platform.
pub trait BloomItem {
    /// The bytes fed to the hash functions.
    fn item_bytes(&self) -> Cow<'_, [u8]>;
}

impl BloomItem for [u8] {
    #[inline]
    fn item_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }
}

impl<const N: usize> BloomItem for [u8; N] {
    #[inline]
    fn item_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }
}

impl BloomItem for Vec<u8> {
    #[inline]
    fn item_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }
}

impl BloomItem for str {
    #[inline]
    fn item_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl BloomItem for String {
    #[inline]
    fn item_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl<T: BloomItem + ?Sized> BloomItem for &T {
    #[inline]
    fn item_bytes(&self) -> Cow<'_, [u8]> {
        (**self).item_bytes()
    }
}

macro_rules! impl_bloom_item_for_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl BloomItem for $t {
                #[inline]
                fn item_bytes(&self) -> Cow<'_, [u8]> {
                    Cow::Owned(self.to_le_bytes().to_vec())
                }
            }
        )*
    };
}

// Fixed-width types only; convert `usize`/`isize` to `u64`/`i64` first.
impl_bloom_item_for_int!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128);

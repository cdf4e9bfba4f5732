//! 32-bit FNV-1a.

/// FNV-1a 32-bit offset basis.
pub const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;

/// FNV-1a 32-bit prime.
pub const FNV_PRIME: u32 = 0x0100_0193;

/// Hash `data` with FNV-1a (xor, then multiply).
///
/// ```
/// use bloomy::hash::fnv1a_32;
///
/// assert_eq!(fnv1a_32(b""), 0x811c_9dc5);
/// assert_eq!(fnv1a_32(b"foobar"), 0xbf9c_f968);
/// ```
#[inline]
#[must_use]
pub fn fnv1a_32(data: &[u8]) -> u32 {
    data.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

//! 32-bit MurmurHash3 (x86 variant).
//!
//! Austin Appleby's public-domain algorithm, bit-for-bit. Blocks are read as
//! little-endian `u32` regardless of host endianness.

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;
const FMIX1: u32 = 0x85eb_ca6b;
const FMIX2: u32 = 0xc2b2_ae35;

/// Seed used for the primary Bloom hash.
pub const BLOOM_SEED: u32 = 0x9747_b28c;

#[inline(always)]
fn mix_k(mut k: u32) -> u32 {
    k = k.wrapping_mul(C1);
    k = k.rotate_left(15);
    k.wrapping_mul(C2)
}

#[inline(always)]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(FMIX1);
    h ^= h >> 13;
    h = h.wrapping_mul(FMIX2);
    h ^ (h >> 16)
}

/// Hash `data` with MurmurHash3_x86_32.
///
/// # Examples
///
/// ```
/// use bloomy::hash::murmur3_32;
///
/// assert_eq!(murmur3_32(b"", 1), 0x514e_28b7);
/// assert_eq!(murmur3_32(b"abc", 0x9747_b28c), 0xc84a_62dd);
/// ```
#[must_use]
pub fn murmur3_32(data: &[u8], seed: u32) -> u32 {
    let mut h = seed;

    let mut blocks = data.chunks_exact(4);
    for block in blocks.by_ref() {
        let k = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        h ^= mix_k(k);
        h = h.rotate_left(13);
        h = h.wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let mut k = 0u32;
        for (i, &byte) in tail.iter().enumerate() {
            k ^= u32::from(byte) << (8 * i);
        }
        h ^= mix_k(k);
    }

    // The reference mixes in the length modulo 2^32.
    #[allow(clippy::cast_possible_truncation)]
    let len = data.len() as u32;
    fmix32(h ^ len)
}

//! Versioned binary encoding of filters.
//!
//! # Format
//!
//! ```text
//! [Header: 18 bytes, integers big-endian]
//!   Magic:         4 bytes  ("BLMY")
//!   Version:       u32      (1)
//!   Filter Type:   u8       (0=Standard, 1=Counting, 2=Scalable)
//!   Compressed:    u8       (0 or 1)
//!   Metadata Len:  u32
//!   Payload Len:   u32
//!
//! [Metadata: JSON record describing parameters and counters]
//! [Payload: bit buffer (standard) or big-endian counters (counting);
//!           empty for scalable, whose slice buffers live in the metadata]
//! ```
//!
//! With the compressed flag set, the payload and every scalable slice buffer
//! are zlib streams.
//!
//! Decoding checks the header in a fixed order (length, magic, version, type,
//! compression flag, section lengths) and reports the first failure. A buffer
//! either decodes completely or not at all.
//!
//! # Examples
//!
//! ```
//! use bloomy::core::BloomFilter;
//! use bloomy::filters::{Filter, StandardBloomFilter};
//! use bloomy::wire;
//!
//! let mut filter: Filter = StandardBloomFilter::new(1000, 0.01).unwrap().into();
//! filter.add("apple");
//!
//! let bytes = wire::to_bytes(&filter, true).unwrap();
//! assert_eq!(&bytes[..4], b"BLMY");
//!
//! let restored = wire::from_bytes(&bytes).unwrap();
//! assert!(restored.query("apple"));
//! assert_eq!(restored.info(), filter.info());
//! ```

mod compression;
mod io;
mod metadata;

pub use io::{load, save};

use crate::core::filter::{BloomFilter, FilterKind};
use crate::error::{BloomyError, Result};
use crate::filters::Filter;
use metadata::{CountingMeta, ScalableMeta, StandardMeta};
use serde::de::DeserializeOwned;
use tracing::trace;

/// Magic bytes opening every encoded filter.
pub const MAGIC: &[u8; 4] = b"BLMY";

/// Format version this build reads and writes.
pub const VERSION: u32 = 1;

/// Header size in bytes.
pub const HEADER_LEN: usize = 18;

/// Codec-level errors.
///
/// Public operations report these as [`BloomyError`]: version and type
/// failures keep their own variants, encode failures become
/// [`BloomyError::Serialization`] and everything else
/// [`BloomyError::MalformedBinary`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// Input shorter than the header.
    #[error("buffer too small: expected at least {expected} bytes, got {actual}")]
    BufferTooSmall {
        /// Header length.
        expected: usize,
        /// Input length.
        actual: usize,
    },

    /// Input does not start with [`MAGIC`].
    #[error("invalid magic bytes {0:02x?} (expected 'BLMY')")]
    InvalidMagic([u8; 4]),

    /// Header version other than [`VERSION`].
    #[error("unsupported format version: {0} (expected {expected})", expected = VERSION)]
    UnsupportedVersion(u32),

    /// Type byte outside {0, 1, 2}.
    #[error("unknown filter type: {0}")]
    UnknownFilterType(u8),

    /// Compression byte other than 0 or 1.
    #[error("invalid compression flag: {0}")]
    InvalidCompressionFlag(u8),

    /// Declared section lengths disagree with the input length.
    #[error("header declares {declared} bytes in total, input has {actual}")]
    LengthMismatch {
        /// Header plus declared metadata and payload lengths.
        declared: u64,
        /// Input length.
        actual: usize,
    },

    /// Scalable filters carry no payload.
    #[error("scalable filter has a {0}-byte payload, expected none")]
    UnexpectedPayload(u32),

    /// Metadata is not valid JSON for its filter type.
    #[error("invalid metadata: {0}")]
    Metadata(String),

    /// A zlib stream failed to inflate to the expected length.
    #[error("decompression failed: {0}")]
    Decompression(String),

    /// A buffer failed to compress.
    #[error("compression failed: {0}")]
    Compression(String),

    /// A section does not fit its u32 length field.
    #[error("{section} is {len} bytes, too long for a u32 length field")]
    SectionTooLong {
        /// Section name.
        section: &'static str,
        /// Section length.
        len: usize,
    },
}

impl From<WireError> for BloomyError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::UnsupportedVersion(found) => BloomyError::UnsupportedVersion {
                found,
                supported: VERSION,
            },
            WireError::UnknownFilterType(tag) => BloomyError::UnknownFilterType { tag },
            WireError::Compression(_) | WireError::SectionTooLong { .. } => {
                BloomyError::serialization(err.to_string())
            }
            other => BloomyError::malformed(other.to_string()),
        }
    }
}

/// Decoded fixed-size header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Format version.
    pub version: u32,
    /// Filter variant.
    pub kind: FilterKind,
    /// Whether buffers are zlib compressed.
    pub compressed: bool,
    /// Metadata section length.
    pub metadata_len: u32,
    /// Payload section length.
    pub payload_len: u32,
}

impl Header {
    /// Parse and check the header of `bytes`, including that the declared
    /// section lengths account for the whole input.
    ///
    /// # Errors
    ///
    /// Returns the first [`WireError`] in check order.
    pub fn parse(bytes: &[u8]) -> std::result::Result<Self, WireError> {
        if bytes.len() < HEADER_LEN {
            return Err(WireError::BufferTooSmall {
                expected: HEADER_LEN,
                actual: bytes.len(),
            });
        }

        let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
        if &magic != MAGIC {
            return Err(WireError::InvalidMagic(magic));
        }

        let version = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if version != VERSION {
            return Err(WireError::UnsupportedVersion(version));
        }

        let kind = FilterKind::try_from(bytes[8])
            .map_err(|_| WireError::UnknownFilterType(bytes[8]))?;

        let compressed = match bytes[9] {
            0 => false,
            1 => true,
            flag => return Err(WireError::InvalidCompressionFlag(flag)),
        };

        let metadata_len = u32::from_be_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]);
        let payload_len = u32::from_be_bytes([bytes[14], bytes[15], bytes[16], bytes[17]]);
        let declared = HEADER_LEN as u64 + u64::from(metadata_len) + u64::from(payload_len);
        if declared != bytes.len() as u64 {
            return Err(WireError::LengthMismatch {
                declared,
                actual: bytes.len(),
            });
        }

        Ok(Self {
            version,
            kind,
            compressed,
            metadata_len,
            payload_len,
        })
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&self.version.to_be_bytes());
        out.push(self.kind.as_byte());
        out.push(u8::from(self.compressed));
        out.extend_from_slice(&self.metadata_len.to_be_bytes());
        out.extend_from_slice(&self.payload_len.to_be_bytes());
    }
}

/// Encode `filter`, zlib-compressing its buffers if `compress` is set.
///
/// # Errors
///
/// Returns [`BloomyError::Serialization`] if a section exceeds `u32::MAX`
/// bytes or compression fails.
pub fn to_bytes(filter: &Filter, compress: bool) -> Result<Vec<u8>> {
    let (metadata, payload) = match filter {
        Filter::Standard(f) => (
            encode_metadata(&StandardMeta::from_filter(f))?,
            maybe_compress(f.bits().to_bytes(), compress)?,
        ),
        Filter::Counting(f) => (
            encode_metadata(&CountingMeta::from_filter(f))?,
            maybe_compress(f.counters().to_bytes(), compress)?,
        ),
        Filter::Scalable(f) => (
            encode_metadata(&ScalableMeta::from_filter(f, compress)?)?,
            Vec::new(),
        ),
    };

    let header = Header {
        version: VERSION,
        kind: filter.kind(),
        compressed: compress,
        metadata_len: section_len("metadata", &metadata)?,
        payload_len: section_len("payload", &payload)?,
    };

    let mut out = Vec::with_capacity(HEADER_LEN + metadata.len() + payload.len());
    header.write_to(&mut out);
    out.extend_from_slice(&metadata);
    out.extend_from_slice(&payload);

    trace!(
        kind = %header.kind,
        compressed = compress,
        metadata_len = header.metadata_len,
        payload_len = header.payload_len,
        "encoded filter"
    );
    Ok(out)
}

/// Decode a filter produced by [`to_bytes`].
///
/// # Errors
///
/// - [`BloomyError::UnsupportedVersion`] if the version is not [`VERSION`]
/// - [`BloomyError::UnknownFilterType`] for a type byte outside {0, 1, 2}
/// - [`BloomyError::MalformedBinary`] for anything else that fails to parse
pub fn from_bytes(bytes: &[u8]) -> Result<Filter> {
    let header = Header::parse(bytes)?;
    let metadata_end = HEADER_LEN + header.metadata_len as usize;
    let metadata = &bytes[HEADER_LEN..metadata_end];
    let payload = &bytes[metadata_end..];

    let filter = match header.kind {
        FilterKind::Standard => Filter::Standard(
            decode_metadata::<StandardMeta>(metadata)?.into_filter(payload, header.compressed)?,
        ),
        FilterKind::Counting => Filter::Counting(
            decode_metadata::<CountingMeta>(metadata)?.into_filter(payload, header.compressed)?,
        ),
        FilterKind::Scalable => {
            if header.payload_len != 0 {
                return Err(WireError::UnexpectedPayload(header.payload_len).into());
            }
            Filter::Scalable(decode_metadata::<ScalableMeta>(metadata)?.into_filter(header.compressed)?)
        }
    };

    trace!(
        kind = %header.kind,
        compressed = header.compressed,
        metadata_len = header.metadata_len,
        payload_len = header.payload_len,
        "decoded filter"
    );
    Ok(filter)
}

/// Parse only the header of an encoded filter.
///
/// # Errors
///
/// Same header errors as [`from_bytes`].
pub fn read_header(bytes: &[u8]) -> Result<Header> {
    Ok(Header::parse(bytes)?)
}

fn encode_metadata<T: serde::Serialize>(record: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(record).map_err(|e| BloomyError::serialization(e.to_string()))
}

fn decode_metadata<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| WireError::Metadata(e.to_string()).into())
}

fn maybe_compress(buffer: Vec<u8>, compress: bool) -> Result<Vec<u8>> {
    if compress {
        Ok(compression::compress(&buffer)?)
    } else {
        Ok(buffer)
    }
}

fn section_len(section: &'static str, data: &[u8]) -> Result<u32> {
    u32::try_from(data.len()).map_err(|_| {
        WireError::SectionTooLong {
            section,
            len: data.len(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CounterWidth;
    use crate::filters::{CountingBloomFilter, ScalableBloomFilter, StandardBloomFilter};

    fn standard() -> Filter {
        let mut f = StandardBloomFilter::new(1000, 0.01).unwrap();
        f.add("apple");
        f.into()
    }

    #[test]
    fn test_header_layout() {
        let bytes = to_bytes(&standard(), false).unwrap();
        assert_eq!(&bytes[0..4], b"BLMY");
        assert_eq!(&bytes[4..8], &[0, 0, 0, 1]);
        assert_eq!(bytes[8], 0);
        assert_eq!(bytes[9], 0);

        let header = read_header(&bytes).unwrap();
        assert_eq!(header.payload_len, 9586_u32.div_ceil(8));
        assert_eq!(
            bytes.len(),
            HEADER_LEN + header.metadata_len as usize + header.payload_len as usize
        );
    }

    #[test]
    fn test_roundtrip_each_kind() {
        let mut counting = CountingBloomFilter::new(500, 0.01, CounterWidth::Bits16).unwrap();
        counting.add_all(["a", "b", "b"]);
        let mut scalable = ScalableBloomFilter::new(10, 0.01).unwrap();
        scalable.add_all(0..40_u32);

        for filter in [standard(), counting.into(), scalable.into()] {
            for compress in [false, true] {
                let bytes = to_bytes(&filter, compress).unwrap();
                assert_eq!(bytes[9], u8::from(compress));
                let back = from_bytes(&bytes).unwrap();
                assert_eq!(back, filter, "compress={}", compress);
            }
        }
    }

    #[test]
    fn test_scalable_payload_is_empty() {
        let filter: Filter = ScalableBloomFilter::new(10, 0.01).unwrap().into();
        for compress in [false, true] {
            let header = read_header(&to_bytes(&filter, compress).unwrap()).unwrap();
            assert_eq!(header.kind, FilterKind::Scalable);
            assert_eq!(header.payload_len, 0);
        }
    }

    #[test]
    fn test_compression_shrinks_sparse_payload() {
        let plain = to_bytes(&standard(), false).unwrap();
        let packed = to_bytes(&standard(), true).unwrap();
        assert!(packed.len() < plain.len() / 4);
    }

    #[test]
    fn test_short_input() {
        let err = from_bytes(b"BLMY").unwrap_err();
        assert!(matches!(err, BloomyError::MalformedBinary { .. }));
        assert!(from_bytes(&[]).is_err());
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = to_bytes(&standard(), false).unwrap();
        bytes[0] = b'X';
        let err = from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, BloomyError::MalformedBinary { .. }));
        assert!(err.to_string().contains("magic"));
    }

    #[test]
    fn test_bad_version() {
        let mut bytes = to_bytes(&standard(), false).unwrap();
        bytes[4..8].copy_from_slice(&99_u32.to_be_bytes());
        assert_eq!(
            from_bytes(&bytes).unwrap_err(),
            BloomyError::UnsupportedVersion {
                found: 99,
                supported: 1
            }
        );
    }

    #[test]
    fn test_unknown_type() {
        let mut bytes = to_bytes(&standard(), false).unwrap();
        bytes[8] = 7;
        assert_eq!(
            from_bytes(&bytes).unwrap_err(),
            BloomyError::UnknownFilterType { tag: 7 }
        );
    }

    #[test]
    fn test_check_order_magic_before_version() {
        let mut bytes = to_bytes(&standard(), false).unwrap();
        bytes[0] = 0;
        bytes[4..8].copy_from_slice(&99_u32.to_be_bytes());
        bytes[8] = 9;
        assert!(matches!(
            from_bytes(&bytes),
            Err(BloomyError::MalformedBinary { .. })
        ));
    }

    #[test]
    fn test_bad_compression_flag() {
        let mut bytes = to_bytes(&standard(), false).unwrap();
        bytes[9] = 2;
        assert!(matches!(
            from_bytes(&bytes),
            Err(BloomyError::MalformedBinary { .. })
        ));
    }

    #[test]
    fn test_truncated_and_trailing() {
        let bytes = to_bytes(&standard(), false).unwrap();
        assert!(matches!(
            from_bytes(&bytes[..bytes.len() - 1]),
            Err(BloomyError::MalformedBinary { .. })
        ));

        let mut longer = bytes;
        longer.push(0);
        assert!(matches!(
            from_bytes(&longer),
            Err(BloomyError::MalformedBinary { .. })
        ));
    }

    #[test]
    fn test_garbage_metadata() {
        let mut bytes = to_bytes(&standard(), false).unwrap();
        bytes[HEADER_LEN] = b'!';
        let err = from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, BloomyError::MalformedBinary { .. }));
        assert!(err.to_string().contains("metadata"));
    }

    #[test]
    fn test_corrupt_compressed_payload() {
        let mut bytes = to_bytes(&standard(), true).unwrap();
        let header = read_header(&bytes).unwrap();
        let payload_start = HEADER_LEN + header.metadata_len as usize;
        bytes[payload_start] = 0;
        assert!(matches!(
            from_bytes(&bytes),
            Err(BloomyError::MalformedBinary { .. })
        ));
    }

    #[test]
    fn test_wire_error_messages() {
        assert_eq!(
            WireError::UnsupportedVersion(99).to_string(),
            "unsupported format version: 99 (expected 1)"
        );
        assert_eq!(
            WireError::InvalidMagic(*b"XXXX").to_string(),
            "invalid magic bytes [58, 58, 58, 58] (expected 'BLMY')"
        );
    }

    #[test]
    fn test_wire_error_conversion() {
        assert!(matches!(
            BloomyError::from(WireError::SectionTooLong {
                section: "payload",
                len: 1
            }),
            BloomyError::Serialization { .. }
        ));
        assert!(BloomyError::from(WireError::InvalidCompressionFlag(5)).is_decode_error());
    }
}

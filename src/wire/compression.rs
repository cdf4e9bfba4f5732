//! zlib compression of payload buffers.

use super::WireError;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Compress `data` at the default level.
pub(crate) fn compress(data: &[u8]) -> Result<Vec<u8>, WireError> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 4), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| WireError::Compression(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| WireError::Compression(e.to_string()))
}

/// Decompress `data`, which must inflate to exactly `expected_len` bytes.
///
/// Reading stops one byte past `expected_len`, so an oversized stream is
/// rejected without inflating all of it.
pub(crate) fn decompress(data: &[u8], expected_len: usize) -> Result<Vec<u8>, WireError> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .take(expected_len as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| WireError::Decompression(e.to_string()))?;
    if out.len() != expected_len {
        return Err(WireError::Decompression(format!(
            "inflated to {} bytes{}, expected {}",
            out.len(),
            if out.len() > expected_len { " or more" } else { "" },
            expected_len
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_decompress() {
        let data = vec![0u8; 4096];
        let packed = compress(&data).unwrap();
        assert!(packed.len() < 100);
        assert_eq!(decompress(&packed, data.len()).unwrap(), data);
    }

    #[test]
    fn test_decompress_length_mismatch() {
        let packed = compress(b"hello world").unwrap();
        assert!(matches!(
            decompress(&packed, 5),
            Err(WireError::Decompression(_))
        ));
        assert!(decompress(&packed, 64).is_err());
    }

    #[test]
    fn test_decompress_garbage() {
        assert!(matches!(
            decompress(b"not zlib at all", 10),
            Err(WireError::Decompression(_))
        ));
    }
}

//! File save and load.
//!
//! Each call is a single whole-buffer write or read; the file handle is closed
//! before returning on every path.

use super::{from_bytes, to_bytes};
use crate::core::filter::BloomFilter;
use crate::error::{BloomyError, Result};
use crate::filters::Filter;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Encode `filter` and write it to `path`, replacing any existing file.
///
/// # Errors
///
/// - [`BloomyError::Serialization`] if encoding fails
/// - [`BloomyError::Io`] if the file cannot be written
pub fn save<P: AsRef<Path>>(filter: &Filter, path: P, compress: bool) -> Result<()> {
    let path = path.as_ref();
    let bytes = to_bytes(filter, compress)?;
    fs::write(path, &bytes).map_err(|err| BloomyError::io(path.display().to_string(), &err))?;
    debug!(
        path = %path.display(),
        bytes = bytes.len(),
        kind = %filter.kind(),
        compressed = compress,
        "saved filter"
    );
    Ok(())
}

/// Read `path` and decode the filter it holds.
///
/// # Errors
///
/// - [`BloomyError::Io`] if the file cannot be read
/// - any decode error from [`from_bytes`](super::from_bytes)
pub fn load<P: AsRef<Path>>(path: P) -> Result<Filter> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| BloomyError::io(path.display().to_string(), &err))?;
    let filter = from_bytes(&bytes)?;
    debug!(
        path = %path.display(),
        bytes = bytes.len(),
        kind = %filter.kind(),
        "loaded filter"
    );
    Ok(filter)
}

//! Error types for bloomy operations.
//!
//! Every fallible operation in the crate returns [`Result<T>`] with a
//! [`BloomyError`]. Errors are plain values: they can be cloned, compared in
//! tests and carried across threads. None of them is retried internally.
//!
//! # Error Propagation
//!
//! ```
//! use bloomy::{Result, BloomyError};
//! use bloomy::core::params::Params;
//!
//! fn plan(capacity: u64, rate: f64) -> Result<(u64, u32)> {
//!     let params = Params::compute(capacity, rate)?;
//!     params.validate()?;
//!     Ok((params.size, params.hash_count))
//! }
//! # assert_eq!(plan(1000, 0.01).unwrap(), (9586, 7));
//! # assert!(matches!(plan(0, 0.01), Err(BloomyError::InvalidParameters { .. })));
//! ```

#![allow(clippy::module_name_repetitions)]

use std::fmt;

/// Result type alias for bloomy operations.
pub type Result<T> = std::result::Result<T, BloomyError>;

/// Errors that can occur while building, merging or decoding filters.
///
/// # Design Notes
/// - `Clone` + `PartialEq` enable testing and error comparison
/// - Construction errors never leave a half-built filter behind
/// - Merge and decode errors never mutate their inputs
#[derive(Debug, Clone, PartialEq)]
pub enum BloomyError {
    /// Invalid construction input: capacity, rate, counter width or growth policy.
    InvalidParameters {
        /// Human-readable description of what's invalid.
        message: String,
    },

    /// Bit array size outside `[1, 1e9]`.
    InvalidSize {
        /// The rejected size in bits.
        size: u64,
    },

    /// Hash count outside `[1, 100]`.
    InvalidHashCount {
        /// The rejected hash count.
        count: u32,
    },

    /// False positive rate outside the open interval `(0, 1)`.
    InvalidRate {
        /// The rejected rate.
        rate: f64,
    },

    /// Storage-level union or intersection over stores of different sizes.
    SizeMismatch {
        /// Size of the left operand.
        left: u64,
        /// Size of the right operand.
        right: u64,
    },

    /// Filters differ in size, hash count, counter width or type.
    IncompatibleFilters {
        /// Description of the incompatibility.
        reason: String,
    },

    /// Operation is not defined for this filter variant.
    ///
    /// For example `remove` on a standard filter or `intersect` on a
    /// counting filter.
    Unsupported {
        /// Name of the operation attempted.
        operation: String,
        /// Name of the filter variant.
        variant: String,
    },

    /// A merge operation received zero filters.
    EmptyInput {
        /// Name of the merge operation.
        operation: String,
    },

    /// The byte buffer is not a valid encoded filter.
    MalformedBinary {
        /// Description of what failed to parse.
        message: String,
    },

    /// The header carries a format version this build cannot read.
    UnsupportedVersion {
        /// Version found in the header.
        found: u32,
        /// Version this build reads and writes.
        supported: u32,
    },

    /// The header's filter type byte is not a known variant.
    UnknownFilterType {
        /// The unrecognised type byte.
        tag: u8,
    },

    /// Encoding failed, e.g. a section does not fit the header's u32 length fields.
    Serialization {
        /// Description of what failed.
        message: String,
    },

    /// Reading or writing a filter file failed.
    Io {
        /// Path involved.
        path: String,
        /// Underlying I/O error message.
        message: String,
    },
}

impl fmt::Display for BloomyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameters { message } => {
                write!(f, "Invalid Bloom filter parameters: {}.", message)
            }
            Self::InvalidSize { size } => {
                write!(
                    f,
                    "Invalid filter size: {} bits. Must be in range [1, 1000000000].",
                    size
                )
            }
            Self::InvalidHashCount { count } => {
                write!(
                    f,
                    "Invalid hash function count: {}. Must be in range [1, 100].",
                    count
                )
            }
            Self::InvalidRate { rate } => {
                write!(
                    f,
                    "False positive rate {} is out of bounds. Must be in range (0, 1).",
                    rate
                )
            }
            Self::SizeMismatch { left, right } => {
                write!(f, "Storage size mismatch: {} vs {} bits.", left, right)
            }
            Self::IncompatibleFilters { reason } => {
                write!(
                    f,
                    "Cannot perform operation on incompatible filters: {}.",
                    reason
                )
            }
            Self::Unsupported { operation, variant } => {
                write!(
                    f,
                    "Operation '{}' is not supported by the {} filter variant.",
                    operation, variant
                )
            }
            Self::EmptyInput { operation } => {
                write!(f, "Operation '{}' requires at least one filter.", operation)
            }
            Self::MalformedBinary { message } => {
                write!(f, "Malformed filter binary: {}.", message)
            }
            Self::UnsupportedVersion { found, supported } => {
                write!(
                    f,
                    "Unsupported format version {}. This build reads version {}.",
                    found, supported
                )
            }
            Self::UnknownFilterType { tag } => {
                write!(f, "Unknown filter type tag {}.", tag)
            }
            Self::Serialization { message } => {
                write!(f, "Serialization error: {}.", message)
            }
            Self::Io { path, message } => {
                write!(f, "I/O error on '{}': {}.", path, message)
            }
        }
    }
}

impl std::error::Error for BloomyError {}

impl BloomyError {
    /// Create an `InvalidParameters` error with a formatted message.
    ///
    /// # Examples
    /// ```
    /// use bloomy::BloomyError;
    ///
    /// let err = BloomyError::invalid_parameters(format!("capacity {} must be > 0", 0));
    /// assert!(err.to_string().contains("capacity 0"));
    /// ```
    #[must_use]
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Create an `IncompatibleFilters` error.
    #[must_use]
    pub fn incompatible_filters(reason: impl Into<String>) -> Self {
        Self::IncompatibleFilters {
            reason: reason.into(),
        }
    }

    /// Create an `Unsupported` error.
    #[must_use]
    pub fn unsupported(operation: impl Into<String>, variant: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
            variant: variant.into(),
        }
    }

    /// Create an `EmptyInput` error.
    #[must_use]
    pub fn empty_input(operation: impl Into<String>) -> Self {
        Self::EmptyInput {
            operation: operation.into(),
        }
    }

    /// Create a `MalformedBinary` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedBinary {
            message: message.into(),
        }
    }

    /// Create a `Serialization` error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an `Io` error from a path and the underlying error.
    #[must_use]
    pub fn io(path: impl Into<String>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Whether this error came from decoding a byte buffer.
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedBinary { .. }
                | Self::UnsupportedVersion { .. }
                | Self::UnknownFilterType { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_parameters() {
        let err = BloomyError::invalid_parameters("test message");
        let display = format!("{err}");
        assert!(display.contains("Invalid Bloom filter parameters"));
        assert!(display.contains("test message"));
        assert!(display.ends_with('.'));
    }

    #[test]
    fn test_error_display_invalid_rate() {
        let err = BloomyError::InvalidRate { rate: 1.5 };
        let display = format!("{err}");
        assert!(display.contains("1.5"));
        assert!(display.contains("(0, 1)"));
    }

    #[test]
    fn test_error_display_invalid_size_and_hash_count() {
        let size = BloomyError::InvalidSize { size: 0 }.to_string();
        assert!(size.contains("0 bits"));

        let k = BloomyError::InvalidHashCount { count: 101 }.to_string();
        assert!(k.contains("101"));
        assert!(k.contains("[1, 100]"));
    }

    #[test]
    fn test_error_display_size_mismatch() {
        let display = BloomyError::SizeMismatch { left: 64, right: 128 }.to_string();
        assert!(display.contains("64"));
        assert!(display.contains("128"));
    }

    #[test]
    fn test_error_display_unsupported() {
        let err = BloomyError::unsupported("remove", "standard");
        let display = format!("{err}");
        assert!(display.contains("remove"));
        assert!(display.contains("standard"));
        assert!(display.contains("not supported"));
    }

    #[test]
    fn test_error_display_incompatible_filters() {
        let err = BloomyError::incompatible_filters("different sizes");
        let display = format!("{err}");
        assert!(display.contains("incompatible"));
        assert!(display.contains("different sizes"));
    }

    #[test]
    fn test_error_display_decode_errors() {
        let v = BloomyError::UnsupportedVersion {
            found: 99,
            supported: 1,
        };
        assert!(v.to_string().contains("99"));
        assert!(v.is_decode_error());

        let t = BloomyError::UnknownFilterType { tag: 7 };
        assert!(t.to_string().contains('7'));
        assert!(t.is_decode_error());

        let m = BloomyError::malformed("bad magic");
        assert!(m.to_string().contains("bad magic"));
        assert!(m.is_decode_error());

        assert!(!BloomyError::empty_input("union_all").is_decode_error());
    }

    #[test]
    fn test_error_io_carries_path() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = BloomyError::io("/tmp/x.blmy", &io);
        let display = err.to_string();
        assert!(display.contains("/tmp/x.blmy"));
        assert!(display.contains("missing"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let _err: Box<dyn std::error::Error> = Box::new(BloomyError::invalid_parameters("test"));
    }

    #[test]
    fn test_error_clone() {
        let err1 = BloomyError::invalid_parameters("test");
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn inner() -> Result<()> {
            Err(BloomyError::empty_input("intersect_all"))
        }

        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}

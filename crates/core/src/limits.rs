//! Size limits for document values and paths
//!
//! Checked on every document the engine writes. Violations surface to the
//! caller as `Error::Validation`.
//!
//! | Limit | Value | Constant |
//! |-------|-------|----------|
//! | Max document size | 16 MB | [`MAX_DOCUMENT_SIZE`] |
//! | Max nesting depth | 100 levels | [`MAX_NESTING_DEPTH`] |
//! | Max path length | 256 segments | [`MAX_PATH_LENGTH`] |
//! | Max array size | 1M elements | [`MAX_ARRAY_SIZE`] |

use crate::value::DocumentValue;
use thiserror::Error;

/// Maximum serialized document size in bytes (16 MB)
pub const MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// Maximum nesting depth in a document (100 levels)
pub const MAX_NESTING_DEPTH: usize = 100;

/// Maximum path length in segments (256 segments)
pub const MAX_PATH_LENGTH: usize = 256;

/// Maximum array size in elements (1 million elements)
pub const MAX_ARRAY_SIZE: usize = 1_000_000;

/// Error type for document limit violations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LimitError {
    /// Document exceeds maximum size
    #[error("document size {size} exceeds maximum of {max} bytes")]
    DocumentTooLarge {
        /// Actual document size
        size: usize,
        /// Maximum allowed size
        max: usize,
    },

    /// Document nesting exceeds maximum depth
    #[error("document nesting depth {depth} exceeds maximum of {max} levels")]
    NestingTooDeep {
        /// Actual nesting depth
        depth: usize,
        /// Maximum allowed depth
        max: usize,
    },

    /// Path exceeds maximum length
    #[error("path length {length} exceeds maximum of {max} segments")]
    PathTooLong {
        /// Actual path length
        length: usize,
        /// Maximum allowed length
        max: usize,
    },

    /// Array exceeds maximum size
    #[error("array size {size} exceeds maximum of {max} elements")]
    ArrayTooLarge {
        /// Actual array size
        size: usize,
        /// Maximum allowed size
        max: usize,
    },

    /// Document holds NaN or an infinity
    #[error("document contains a non-finite number")]
    NonFiniteNumber,
}

/// Validate depth, array sizes, number finiteness and total size of a document
///
/// Depth is checked first so the size estimate never recurses into a
/// pathologically deep value.
pub fn validate_document(value: &DocumentValue) -> Result<(), LimitError> {
    let depth = value.nesting_depth();
    if depth > MAX_NESTING_DEPTH {
        return Err(LimitError::NestingTooDeep {
            depth,
            max: MAX_NESTING_DEPTH,
        });
    }

    let size = value.max_array_len();
    if size > MAX_ARRAY_SIZE {
        return Err(LimitError::ArrayTooLarge {
            size,
            max: MAX_ARRAY_SIZE,
        });
    }

    if value.has_non_finite() {
        return Err(LimitError::NonFiniteNumber);
    }

    let size = value.size_bytes();
    if size > MAX_DOCUMENT_SIZE {
        return Err(LimitError::DocumentTooLarge {
            size,
            max: MAX_DOCUMENT_SIZE,
        });
    }
    Ok(())
}

/// Validate a path length
pub fn validate_path_length(length: usize) -> Result<(), LimitError> {
    if length > MAX_PATH_LENGTH {
        return Err(LimitError::PathTooLong {
            length,
            max: MAX_PATH_LENGTH,
        });
    }
    Ok(())
}

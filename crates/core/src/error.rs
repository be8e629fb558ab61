//! Error types for docfield
//!
//! Every failure a caller can observe is one variant of [`Error`]. Callers
//! branch on [`Error::kind`] rather than on message text.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::record::{EntityKind, RecordId};
use crate::value::{DocumentValue, Shape};
use thiserror::Error;

/// Result type alias for docfield operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the document-field engine
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Referenced row is absent
    #[error("{kind} {id} not found")]
    NotFound {
        /// Entity kind that was looked up
        kind: EntityKind,
        /// Row id that was looked up
        id: RecordId,
    },

    /// Patch operation incompatible with the current document shape
    #[error("shape mismatch on '{column}': expected {expected}, found {found}")]
    ShapeMismatch {
        /// Document column being written
        column: String,
        /// Shape the operation required
        expected: Shape,
        /// Shape actually found
        found: Shape,
    },

    /// Set operation on a non-scalar operand or array element
    ///
    /// Reported under [`ErrorKind::ShapeMismatch`].
    #[error("shape mismatch on '{column}': {position} must be a scalar, found {found}")]
    NotScalar {
        /// Document column being written
        column: String,
        /// `operand`, or the offending element as `element N`
        position: String,
        /// Shape actually found
        found: Shape,
    },

    /// Optimistic write lost a race
    ///
    /// `current` is the row as it is now stored, so the caller can retry
    /// against fresh state.
    #[error("concurrency conflict on {kind} {id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// Entity kind being written
        kind: EntityKind,
        /// Row id being written
        id: RecordId,
        /// Version the writer read
        expected: u64,
        /// Version currently stored
        actual: u64,
        /// Current row state
        current: Box<DocumentValue>,
    },

    /// Required field missing or malformed
    #[error("validation error: {0}")]
    Validation(String),

    /// Storage collaborator failure, not recoverable locally
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Fieldless discriminant of [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::NotFound`]
    NotFound,
    /// See [`Error::ShapeMismatch`]
    ShapeMismatch,
    /// See [`Error::ConcurrencyConflict`]
    ConcurrencyConflict,
    /// See [`Error::Validation`]
    Validation,
    /// See [`Error::StoreUnavailable`]
    StoreUnavailable,
}

impl Error {
    /// Build a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Build a store-unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Error::StoreUnavailable(msg.into())
    }

    /// Build a not-found error
    pub fn not_found(kind: EntityKind, id: RecordId) -> Self {
        Error::NotFound { kind, id }
    }

    /// Build a shape-mismatch error
    pub fn shape_mismatch(column: impl Into<String>, expected: Shape, found: Shape) -> Self {
        Error::ShapeMismatch {
            column: column.into(),
            expected,
            found,
        }
    }

    /// Build a not-a-scalar shape error
    pub fn not_scalar(column: impl Into<String>, position: impl Into<String>, found: Shape) -> Self {
        Error::NotScalar {
            column: column.into(),
            position: position.into(),
            found,
        }
    }

    /// Discriminant for branching
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::ShapeMismatch { .. } | Error::NotScalar { .. } => ErrorKind::ShapeMismatch,
            Error::ConcurrencyConflict { .. } => ErrorKind::ConcurrencyConflict,
            Error::Validation(_) => ErrorKind::Validation,
            Error::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
        }
    }

    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::ShapeMismatch => "ShapeMismatch",
            ErrorKind::ConcurrencyConflict => "ConcurrencyConflict",
            ErrorKind::Validation => "ValidationError",
            ErrorKind::StoreUnavailable => "StoreUnavailable",
        }
    }

    /// Whether the caller may retry after re-reading
    ///
    /// Only a lost optimistic race qualifies. The engine itself never retries.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::ConcurrencyConflict
    }

    /// Row state carried by a concurrency conflict
    pub fn current_state(&self) -> Option<&DocumentValue> {
        match self {
            Error::ConcurrencyConflict { current, .. } => Some(current.as_ref()),
            _ => None,
        }
    }
}

impl From<crate::path::PathParseError> for Error {
    fn from(e: crate::path::PathParseError) -> Self {
        Error::Validation(e.to_string())
    }
}

impl From<crate::limits::LimitError> for Error {
    fn from(e: crate::limits::LimitError) -> Self {
        Error::Validation(e.to_string())
    }
}

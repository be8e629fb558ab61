//! Core types and traits for docfield
//!
//! This crate defines the foundational types used throughout the system:
//! - DocumentValue: tagged value held by document columns
//! - contains: the containment predicate
//! - FieldPath / extract / ValueRange: scalar extraction at a dotted path
//! - FieldPatch / apply_patch: partial updates to one document column
//! - Record, EntityKind and the four record kinds with their drafts
//! - ColumnValue / RelationalFilter: relational column access
//! - RecordStore: row storage abstraction
//! - Error: error type hierarchy
//! - Limits: MAX_DOCUMENT_SIZE, MAX_NESTING_DEPTH, MAX_PATH_LENGTH, MAX_ARRAY_SIZE

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod column;
pub mod containment;
pub mod error;
pub mod limits;
pub mod patch;
pub mod path;
pub mod record;
pub mod records;
pub mod traits;
pub mod value;

pub use column::{ColumnValue, RelationalFilter};
pub use containment::contains;
pub use error::{Error, ErrorKind, Result};
pub use limits::{LimitError, MAX_ARRAY_SIZE, MAX_DOCUMENT_SIZE, MAX_NESTING_DEPTH, MAX_PATH_LENGTH};
pub use patch::{apply as apply_patch, FieldPatch, PatchOutcome};
pub use path::{extract, get_at_path, Bound, FieldPath, PathParseError, Scalar, ValueRange};
pub use record::{Draft, DocumentField, EntityKind, Record, RecordId, RelationalField};
pub use records::{
    LogEntry, NewLogEntry, NewOrder, NewProduct, NewUser, Order, Product, User, DEFAULT_LOG_LEVEL,
    DEFAULT_ORDER_STATUS,
};
pub use traits::RecordStore;
pub use value::{DocumentMap, DocumentValue, Number, Shape};

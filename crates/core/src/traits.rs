//! Storage abstraction for table rows
//!
//! The services in `docfield-engine` only ever talk to a [`RecordStore`]:
//! they never see how rows are laid out, encoded or indexed. This lets the
//! in-memory reference store be swapped for a real relational backend
//! without touching query or mutation logic.

use crate::column::RelationalFilter;
use crate::error::Result;
use crate::record::{Record, RecordId};
use crate::value::DocumentValue;

/// Row storage for one table
///
/// Thread safety: all methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync).
///
/// Every method returning rows returns them in ascending id order.
pub trait RecordStore<R: Record>: Send + Sync {
    /// Row by id, or `None` if absent
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the store cannot be read.
    fn get(&self, id: RecordId) -> Result<Option<R>>;

    /// Insert a new row
    ///
    /// Assigns the id and sets the version to 1. Returns the stored row.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the row's unique key is already taken.
    fn insert(&self, row: R) -> Result<R>;

    /// Overwrite an existing row
    ///
    /// When `expected_version` is given and differs from the stored version,
    /// nothing is written and `ConcurrencyConflict` is returned carrying the
    /// stored row. On success the version is incremented and the stored row
    /// is returned.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no row has this id.
    fn update(&self, row: R, expected_version: Option<u64>) -> Result<R>;

    /// Remove a row, returning whether it existed
    fn delete(&self, id: RecordId) -> Result<bool>;

    /// Every row
    fn scan_all(&self) -> Result<Vec<R>>;

    /// Rows whose document column `column` contains `probe`
    ///
    /// Stores may accelerate this with an index but must return exactly the
    /// rows a scan with [`contains`](crate::contains) would.
    fn find_by_containment(&self, column: &str, probe: &DocumentValue) -> Result<Vec<R>>;

    /// Rows whose relational column `column` satisfies `filter`
    fn find_by_relational_filter(&self, column: &str, filter: &RelationalFilter) -> Result<Vec<R>>;

    /// Number of rows
    fn len(&self) -> Result<usize>;

    /// Whether the table is empty
    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

//! Mutation service
//!
//! Every write is read-modify-write against a single row:
//!
//! 1. load the row (or `NotFound`)
//! 2. compute the new state; a no-op returns the loaded row untouched
//! 3. refresh `updatedAt`, re-validate
//! 4. write back with `expected_version` = the version read in step 1
//!
//! A concurrent writer between 1 and 4 makes step 4 fail with
//! `ConcurrencyConflict` carrying the current row. The service never
//! retries; the caller decides.

use crate::database::{Database, Table};
use chrono::{SecondsFormat, Utc};
use docfield_core::{
    apply_patch, limits, ColumnValue, Draft, DocumentValue, Error, ErrorKind, FieldPatch, Order,
    PatchOutcome, Product, Record, RecordId, RelationalField, Result, Shape,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Column holding an order's status transitions
const ORDER_HISTORY: &str = "orderHistory";

/// Write access to the tables
#[derive(Debug, Clone)]
pub struct MutationService {
    db: Arc<Database>,
}

impl MutationService {
    /// Service over `db`
    pub fn new(db: Arc<Database>) -> Self {
        MutationService { db }
    }

    // ========================================================================
    // Row lifecycle
    // ========================================================================

    /// Insert a row built from `draft`
    ///
    /// # Errors
    ///
    /// - `Validation` if a relational field is invalid, the unique key is
    ///   taken, or a referenced row is missing
    /// - `ShapeMismatch` if a document column has the wrong shape
    pub fn create<D>(&self, draft: D) -> Result<D::Record>
    where
        D: Draft,
        D::Record: Table,
    {
        let row = draft.into_record(Utc::now());
        row.validate()?;
        D::Record::check_references(&self.db, &row)?;
        let row = self.db.store::<D::Record>()?.insert(row)?;
        info!(kind = %D::Record::KIND, id = row.id(), "created row");
        Ok(row)
    }

    /// Row by id
    pub fn get<R: Table>(&self, id: RecordId) -> Result<R> {
        self.load(id)
    }

    /// Every row, by id
    pub fn list<R: Table>(&self) -> Result<Vec<R>> {
        self.db.store::<R>()?.scan_all()
    }

    /// Remove a row
    ///
    /// Referencing rows are left in place.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent.
    pub fn delete<R: Table>(&self, id: RecordId) -> Result<()> {
        if !self.db.store::<R>()?.delete(id)? {
            return Err(Error::not_found(R::KIND, id));
        }
        info!(kind = %R::KIND, id, "deleted row");
        Ok(())
    }

    // ========================================================================
    // Document columns
    // ========================================================================

    /// Apply `patch` to document column `column` of row `id`
    ///
    /// Returns the row as stored afterwards. When the patch changes nothing,
    /// the loaded row is returned and nothing is written.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the row is absent
    /// - `Validation` for an unknown column, or `Replace` on an append-only
    ///   column
    /// - `ShapeMismatch` if the operation does not fit the column's value
    /// - `ConcurrencyConflict` if the row changed after it was read
    pub fn apply_patch<R: Table>(&self, id: RecordId, column: &str, patch: FieldPatch) -> Result<R> {
        let row = self.load::<R>(id)?;
        self.patch_loaded(row, column, &patch, false)
    }

    /// Like [`apply_patch`](Self::apply_patch), against the version the
    /// caller read
    ///
    /// # Errors
    ///
    /// Returns `ConcurrencyConflict` immediately if the stored version is not
    /// `expected_version`.
    pub fn apply_patch_at_version<R: Table>(
        &self,
        id: RecordId,
        column: &str,
        patch: FieldPatch,
        expected_version: u64,
    ) -> Result<R> {
        let row = self.load::<R>(id)?;
        if row.version() != expected_version {
            return Err(self.conflict(&row, expected_version));
        }
        self.patch_loaded(row, column, &patch, false)
    }

    /// Add `tag` to a product's tag set
    ///
    /// A tag already present leaves the row, including `updatedAt`,
    /// untouched.
    pub fn add_tag(&self, product_id: RecordId, tag: &str) -> Result<Product> {
        self.apply_patch(product_id, "tags", FieldPatch::InsertUniqueScalar(tag.into()))
    }

    /// Remove `tag` from a product's tag set; absent tags are a no-op
    pub fn remove_tag(&self, product_id: RecordId, tag: &str) -> Result<Product> {
        self.apply_patch(product_id, "tags", FieldPatch::RemoveScalar(tag.into()))
    }

    /// Replace an order's whole status history
    ///
    /// The only way to rewrite `orderHistory`; the generic patch path only
    /// appends to it.
    pub fn replace_order_history(&self, order_id: RecordId, history: DocumentValue) -> Result<Order> {
        let row = self.load::<Order>(order_id)?;
        self.patch_loaded(row, ORDER_HISTORY, &FieldPatch::Replace(history), true)
    }

    // ========================================================================
    // Relational columns
    // ========================================================================

    /// Set one relational column
    ///
    /// # Errors
    ///
    /// `Validation` if the column is unknown or fixed (`id`, `createdAt`,
    /// `updatedAt`, `timestamp`, `userId`), is owned by a dedicated operation
    /// (`Order.status`, see [`Self::set_order_status`]), the value has the
    /// wrong type, or the row fails validation afterwards.
    pub fn set_column<R: Table>(&self, id: RecordId, column: &str, value: ColumnValue) -> Result<R> {
        match R::relational_field(column) {
            Some(field) if field.mutable => {}
            Some(RelationalField {
                written_by: Some(operation),
                ..
            }) => {
                return Err(Error::validation(format!(
                    "{}.{column} is changed through {operation}",
                    R::KIND
                )))
            }
            Some(_) => {
                return Err(Error::validation(format!(
                    "{}.{column} cannot be changed",
                    R::KIND
                )))
            }
            None => {
                return Err(Error::validation(format!(
                    "{} has no relational column '{column}'",
                    R::KIND
                )))
            }
        }
        let loaded = self.load::<R>(id)?;
        if loaded.column(column).as_ref() == Some(&value) {
            debug!(kind = %R::KIND, id, column, "column unchanged, skipping write");
            return Ok(loaded);
        }
        let mut row = loaded.clone();
        row.set_column(column, value)?;
        self.write(&loaded, row)
    }

    /// Move an order to `status`, recording the transition
    ///
    /// The status column and a `{timestamp, from, to}` entry appended to
    /// `orderHistory` are written together in one versioned write.
    pub fn set_order_status(&self, order_id: RecordId, status: &str) -> Result<Order> {
        let loaded = self.load::<Order>(order_id)?;
        let now = Utc::now();

        let entry: DocumentValue = [
            (
                "timestamp".to_string(),
                DocumentValue::from(now.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ),
            ("from".to_string(), DocumentValue::from(loaded.status.as_str())),
            ("to".to_string(), DocumentValue::from(status)),
        ]
        .into_iter()
        .collect();

        let history = match apply_patch(
            ORDER_HISTORY,
            Shape::Array,
            &loaded.order_history,
            &FieldPatch::AppendArrayElement(entry),
        )? {
            PatchOutcome::Changed(history) => history,
            PatchOutcome::Unchanged => loaded.order_history.clone(),
        };
        limits::validate_document(&history)?;

        let mut row = loaded.clone();
        row.set_column("status", ColumnValue::from(status))?;
        row.order_history = history;
        let from = loaded.status.clone();
        let row = self.write(&loaded, row)?;
        info!(id = order_id, from = %from, to = %status, "order status changed");
        Ok(row)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn load<R: Table>(&self, id: RecordId) -> Result<R> {
        self.db
            .store::<R>()?
            .get(id)?
            .ok_or_else(|| Error::not_found(R::KIND, id))
    }

    fn patch_loaded<R: Table>(
        &self,
        loaded: R,
        column: &str,
        patch: &FieldPatch,
        allow_history_rewrite: bool,
    ) -> Result<R> {
        let field = R::document_field(column).ok_or_else(|| {
            Error::validation(format!("{} has no document column '{column}'", R::KIND))
        })?;
        if field.append_only && patch.is_replace() && !allow_history_rewrite {
            return Err(Error::validation(format!(
                "{}.{column} is append-only; replace is not allowed",
                R::KIND
            )));
        }
        let current = loaded.document(column).ok_or_else(|| {
            Error::validation(format!("{} has no document column '{column}'", R::KIND))
        })?;

        let next = match apply_patch(column, field.shape, current, patch)? {
            PatchOutcome::Unchanged => {
                debug!(kind = %R::KIND, id = loaded.id(), column, op = patch.name(), "patch is a no-op");
                return Ok(loaded);
            }
            PatchOutcome::Changed(next) => next,
        };

        let mut row = loaded.clone();
        if let Some(slot) = row.document_mut(column) {
            *slot = next;
        }
        let row = self.write(&loaded, row)?;
        debug!(kind = %R::KIND, id = row.id(), column, op = patch.name(), version = row.version(), "patched");
        Ok(row)
    }

    /// Touch, validate and write `row` with `loaded`'s version as the guard
    fn write<R: Table>(&self, loaded: &R, mut row: R) -> Result<R> {
        row.touch(Utc::now());
        row.validate()?;
        match self.db.store::<R>()?.update(row, Some(loaded.version())) {
            Ok(row) => Ok(row),
            Err(e) if e.kind() == ErrorKind::ConcurrencyConflict => {
                warn!(kind = %R::KIND, id = loaded.id(), version = loaded.version(), "write lost a concurrent update");
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    fn conflict<R: Record>(&self, current: &R, expected: u64) -> Error {
        warn!(kind = %R::KIND, id = current.id(), expected, actual = current.version(), "stale version supplied");
        Error::ConcurrencyConflict {
            kind: R::KIND,
            id: current.id(),
            expected,
            actual: current.version(),
            current: Box::new(current.snapshot()),
        }
    }
}

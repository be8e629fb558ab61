//! Query service
//!
//! Three predicate forms, each with a fixed execution strategy:
//!
//! | Predicate | Strategy | Cost |
//! |-----------|----------|------|
//! | `Containment` | `RecordStore::find_by_containment` | index candidates + verification, or scan if unindexed |
//! | `PathRange` | `RecordStore::scan_all` + [`ValueRange::matches`] | always O(rows) |
//! | `Relational` | `RecordStore::find_by_relational_filter` | store-defined |
//!
//! Range comparisons on nested keys cannot be expressed as containment, so
//! they never use an index. Scans above `scan_warn_threshold` rows are
//! logged at warn level.

use crate::database::{Database, Table};
use docfield_core::{
    DocumentValue, Error, FieldPath, Order, Product, Record, RecordId, RelationalFilter, Result,
    User, ValueRange,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Row filter for [`QueryService::search`]
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Document column contains `probe`
    Containment {
        /// Document column
        column: String,
        /// Partial document to look for
        probe: DocumentValue,
    },
    /// Scalar at `path` inside a document column falls in `range`
    PathRange {
        /// Document column
        column: String,
        /// Key path inside the column
        path: FieldPath,
        /// Inclusive range
        range: ValueRange,
    },
    /// Relational column satisfies `filter`
    Relational {
        /// Relational column
        column: String,
        /// Filter to apply
        filter: RelationalFilter,
    },
}

impl Predicate {
    /// Containment predicate
    pub fn containment(column: impl Into<String>, probe: impl Into<DocumentValue>) -> Self {
        Predicate::Containment {
            column: column.into(),
            probe: probe.into(),
        }
    }

    /// Path-range predicate; `path` is dotted (`"address.city"`)
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the path is empty or has an empty segment.
    pub fn path_range(column: impl Into<String>, path: &str, range: ValueRange) -> Result<Self> {
        Ok(Predicate::PathRange {
            column: column.into(),
            path: path.parse()?,
            range,
        })
    }

    /// Relational predicate
    pub fn relational(column: impl Into<String>, filter: RelationalFilter) -> Self {
        Predicate::Relational {
            column: column.into(),
            filter,
        }
    }

    /// Column the predicate reads
    pub fn column(&self) -> &str {
        match self {
            Predicate::Containment { column, .. }
            | Predicate::PathRange { column, .. }
            | Predicate::Relational { column, .. } => column,
        }
    }
}

/// Result ordering for [`QueryService::search_sorted`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RecordOrder {
    /// Whatever order the store returned
    #[default]
    Unspecified,
    /// Newest first by creation (log: `timestamp`), ties by id descending
    NewestFirst,
    /// Oldest first by creation, ties by id ascending
    OldestFirst,
    /// Ascending id
    ById,
}

/// Sort rows in place
pub fn sort_records<R: Record>(rows: &mut [R], order: RecordOrder) {
    match order {
        RecordOrder::Unspecified => {}
        RecordOrder::NewestFirst => rows.sort_by(|a, b| {
            b.sort_timestamp()
                .cmp(&a.sort_timestamp())
                .then_with(|| b.id().cmp(&a.id()))
        }),
        RecordOrder::OldestFirst => rows.sort_by(|a, b| {
            a.sort_timestamp()
                .cmp(&b.sort_timestamp())
                .then_with(|| a.id().cmp(&b.id()))
        }),
        RecordOrder::ById => rows.sort_by_key(|r| r.id()),
    }
}

/// Read-only access to the tables
#[derive(Debug, Clone)]
pub struct QueryService {
    db: Arc<Database>,
}

impl QueryService {
    /// Service over `db`
    pub fn new(db: Arc<Database>) -> Self {
        QueryService { db }
    }

    /// Row by id
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent.
    pub fn get<R: Table>(&self, id: RecordId) -> Result<R> {
        self.db
            .store::<R>()?
            .get(id)?
            .ok_or_else(|| Error::not_found(R::KIND, id))
    }

    /// Every row, by id
    pub fn list<R: Table>(&self) -> Result<Vec<R>> {
        self.db.store::<R>()?.scan_all()
    }

    /// Rows matching `predicate`
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the column does not exist on `R` or belongs
    /// to the wrong category (document vs relational).
    pub fn search<R: Table>(&self, predicate: &Predicate) -> Result<Vec<R>> {
        let store = self.db.store::<R>()?;
        match predicate {
            Predicate::Containment { column, probe } => {
                require_document_column::<R>(column)?;
                let rows = store.find_by_containment(column, probe)?;
                debug!(kind = %R::KIND, column = %column, hits = rows.len(), "containment search");
                Ok(rows)
            }
            Predicate::PathRange { column, path, range } => {
                require_document_column::<R>(column)?;
                let rows = store.scan_all()?;
                if rows.len() > self.db.config().scan_warn_threshold {
                    warn!(
                        kind = %R::KIND,
                        column = %column,
                        path = %path,
                        rows = rows.len(),
                        "path range query is scanning the whole table"
                    );
                }
                let hits: Vec<R> = rows
                    .into_iter()
                    .filter(|row| {
                        row.document(column)
                            .is_some_and(|doc| range.matches(doc, path))
                    })
                    .collect();
                debug!(kind = %R::KIND, column = %column, path = %path, hits = hits.len(), "path range scan");
                Ok(hits)
            }
            Predicate::Relational { column, filter } => {
                if R::relational_field(column).is_none() {
                    return Err(Error::validation(format!(
                        "{} has no relational column '{column}'",
                        R::KIND
                    )));
                }
                store.find_by_relational_filter(column, filter)
            }
        }
    }

    /// Rows matching `predicate`, in `order`
    pub fn search_sorted<R: Table>(
        &self,
        predicate: &Predicate,
        order: RecordOrder,
    ) -> Result<Vec<R>> {
        let mut rows = self.search::<R>(predicate)?;
        sort_records(&mut rows, order);
        Ok(rows)
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Users whose profile has `key` set to `value`
    pub fn users_by_profile(&self, key: &str, value: impl Into<DocumentValue>) -> Result<Vec<User>> {
        self.search(&Predicate::containment(
            "profile",
            DocumentValue::single_entry(key, value),
        ))
    }

    /// Users whose address city is `city`
    pub fn users_by_city(&self, city: &str) -> Result<Vec<User>> {
        self.search(&Predicate::containment(
            "address",
            DocumentValue::single_entry("city", city),
        ))
    }

    /// Users with `min_age <= profile.age <= max_age`
    pub fn users_by_age_range(&self, min_age: i64, max_age: i64) -> Result<Vec<User>> {
        self.search(&Predicate::PathRange {
            column: "profile".into(),
            path: FieldPath::key("age"),
            range: ValueRange::between(min_age, max_age),
        })
    }

    // ========================================================================
    // Products
    // ========================================================================

    /// Products whose specifications have `key` set to `value`
    pub fn products_by_specification(
        &self,
        key: &str,
        value: impl Into<DocumentValue>,
    ) -> Result<Vec<Product>> {
        self.search(&Predicate::containment(
            "specifications",
            DocumentValue::single_entry(key, value),
        ))
    }

    /// Products tagged `tag`
    pub fn products_by_tag(&self, tag: &str) -> Result<Vec<Product>> {
        self.search(&Predicate::containment("tags", vec![tag]))
    }

    /// Products with `min <= specifications.price <= max`
    pub fn products_by_price_range(&self, min: f64, max: f64) -> Result<Vec<Product>> {
        self.search(&Predicate::PathRange {
            column: "specifications".into(),
            path: FieldPath::key("price"),
            range: ValueRange::between(min, max),
        })
    }

    // ========================================================================
    // Orders
    // ========================================================================

    /// Orders in `status`
    pub fn orders_by_status(&self, status: &str) -> Result<Vec<Order>> {
        self.search(&Predicate::relational(
            "status",
            RelationalFilter::equals(status),
        ))
    }

    /// Orders with a line item named `name`
    pub fn orders_by_product_name(&self, name: &str) -> Result<Vec<Order>> {
        self.search(&Predicate::containment(
            "items",
            vec![DocumentValue::single_entry("name", name)],
        ))
    }

    /// Orders with `min <= totalAmount <= max`
    pub fn orders_by_total_range(&self, min: f64, max: f64) -> Result<Vec<Order>> {
        self.search(&Predicate::relational(
            "totalAmount",
            RelationalFilter::between(min, max),
        ))
    }

    /// Orders shipped to `city`
    pub fn orders_by_shipping_city(&self, city: &str) -> Result<Vec<Order>> {
        self.search(&Predicate::containment(
            "shippingAddress",
            DocumentValue::single_entry("city", city),
        ))
    }

    /// Status history of an order
    pub fn order_history(&self, id: RecordId) -> Result<DocumentValue> {
        Ok(self.get::<Order>(id)?.order_history)
    }
}

fn require_document_column<R: Record>(column: &str) -> Result<()> {
    if R::document_field(column).is_none() {
        return Err(Error::validation(format!(
            "{} has no document column '{column}'",
            R::KIND
        )));
    }
    Ok(())
}

//! Record kinds and the schema every table row exposes
//!
//! A row mixes typed relational fields with document columns. The
//! [`Record`] trait is the uniform view the store and the services use:
//! identity and version, named access to document columns, dynamic access
//! to relational columns, and validation.

use crate::column::ColumnValue;
use crate::error::{Error, Result};
use crate::limits;
use crate::value::{DocumentValue, Shape};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Row identifier, assigned by the store on insert
pub type RecordId = u64;

/// The four tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// `users`
    User,
    /// `products`
    Product,
    /// `orders`
    Order,
    /// `logs`
    LogEntry,
}

impl EntityKind {
    /// All kinds, in table order
    pub const ALL: [EntityKind; 4] = [
        EntityKind::User,
        EntityKind::Product,
        EntityKind::Order,
        EntityKind::LogEntry,
    ];

    /// Table name
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Product => "products",
            EntityKind::Order => "orders",
            EntityKind::LogEntry => "logs",
        }
    }

    /// Kind for a table name
    pub fn from_table_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.table_name() == name)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::User => "User",
            EntityKind::Product => "Product",
            EntityKind::Order => "Order",
            EntityKind::LogEntry => "LogEntry",
        };
        f.write_str(s)
    }
}

/// Declared document column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentField {
    /// Column name
    pub name: &'static str,
    /// Top-level shape the column always holds
    pub shape: Shape,
    /// Only appends are allowed on the generic patch path
    pub append_only: bool,
}

impl DocumentField {
    /// Object column
    pub const fn object(name: &'static str) -> Self {
        DocumentField {
            name,
            shape: Shape::Object,
            append_only: false,
        }
    }

    /// Array column
    pub const fn array(name: &'static str) -> Self {
        DocumentField {
            name,
            shape: Shape::Array,
            append_only: false,
        }
    }

    /// Append-only array column
    pub const fn append_only_array(name: &'static str) -> Self {
        DocumentField {
            name,
            shape: Shape::Array,
            append_only: true,
        }
    }

    /// Empty value of the declared shape
    pub fn empty(&self) -> DocumentValue {
        match self.shape {
            Shape::Array => DocumentValue::array(),
            _ => DocumentValue::object(),
        }
    }
}

/// Declared relational column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationalField {
    /// Column name
    pub name: &'static str,
    /// Whether `set_column` may write it
    pub mutable: bool,
    /// Dedicated operation that owns writes to this column, if any
    pub written_by: Option<&'static str>,
}

impl RelationalField {
    /// Writable column
    pub const fn mutable(name: &'static str) -> Self {
        RelationalField {
            name,
            mutable: true,
            written_by: None,
        }
    }

    /// Column fixed after insert
    pub const fn fixed(name: &'static str) -> Self {
        RelationalField {
            name,
            mutable: false,
            written_by: None,
        }
    }

    /// Column changed only through `operation`, never by `set_column`
    pub const fn managed(name: &'static str, operation: &'static str) -> Self {
        RelationalField {
            name,
            mutable: false,
            written_by: Some(operation),
        }
    }
}

/// A table row
///
/// Implementations must keep document columns at their declared shape; the
/// provided [`Record::validate`] checks this along with document limits.
pub trait Record: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Table this row lives in
    const KIND: EntityKind;
    /// Document columns, in schema order
    const DOCUMENT_FIELDS: &'static [DocumentField];
    /// Relational columns, in schema order
    const RELATIONAL_FIELDS: &'static [RelationalField];

    /// Row id (0 before insert)
    fn id(&self) -> RecordId;
    /// Set the row id; called by the store on insert
    fn set_id(&mut self, id: RecordId);
    /// Optimistic concurrency token
    fn version(&self) -> u64;
    /// Set the version; called by the store on write
    fn set_version(&mut self, version: u64);

    /// Document column by name
    fn document(&self, column: &str) -> Option<&DocumentValue>;
    /// Mutable document column by name
    fn document_mut(&mut self, column: &str) -> Option<&mut DocumentValue>;

    /// Relational column by name
    fn column(&self, name: &str) -> Option<ColumnValue>;
    /// Write a mutable relational column
    fn set_column(&mut self, name: &str, value: ColumnValue) -> Result<()>;

    /// Relational field checks
    fn validate_fields(&self) -> Result<()>;

    /// Key that must be unique across the table, if any
    fn unique_key(&self) -> Option<String> {
        None
    }

    /// Refresh the modification timestamp
    fn touch(&mut self, now: DateTime<Utc>);

    /// Timestamp used for newest/oldest ordering
    fn sort_timestamp(&self) -> DateTime<Utc>;

    /// Declared document column
    fn document_field(column: &str) -> Option<&'static DocumentField> {
        Self::DOCUMENT_FIELDS.iter().find(|f| f.name == column)
    }

    /// Declared relational column
    fn relational_field(column: &str) -> Option<&'static RelationalField> {
        Self::RELATIONAL_FIELDS.iter().find(|f| f.name == column)
    }

    /// Full row validation: relational fields, document shapes and limits
    fn validate(&self) -> Result<()> {
        self.validate_fields()?;
        for field in Self::DOCUMENT_FIELDS {
            let value = self.document(field.name).ok_or_else(|| {
                Error::validation(format!("{} has no column '{}'", Self::KIND, field.name))
            })?;
            if value.shape() != field.shape {
                return Err(Error::shape_mismatch(field.name, field.shape, value.shape()));
            }
            limits::validate_document(value)?;
        }
        Ok(())
    }

    /// Current row state as a document, for conflict reports
    fn snapshot(&self) -> DocumentValue {
        DocumentValue::from_serialize(self).unwrap_or_default()
    }
}

/// Creation payload for a record kind
pub trait Draft {
    /// Row type this draft produces
    type Record: Record;

    /// Build the unsaved row; id and version are assigned by the store
    fn into_record(self, now: DateTime<Utc>) -> Self::Record;
}

// =============================================================================
// Field helpers shared by the record kinds
// =============================================================================

/// Document column, or the declared empty value when the caller left it null
pub(crate) fn or_empty(value: DocumentValue, field: &DocumentField) -> DocumentValue {
    if value.is_null() {
        field.empty()
    } else {
        value
    }
}

/// Reject empty text
pub(crate) fn require_non_empty(column: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{column} is required")));
    }
    Ok(())
}

/// Reject text longer than `max` characters
pub(crate) fn require_max_len(column: &str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(Error::validation(format!(
            "{column} is {len} characters, maximum is {max}"
        )));
    }
    Ok(())
}

/// Reject NaN, infinities and negatives
pub(crate) fn require_non_negative(column: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::validation(format!(
            "{column} must be a finite non-negative amount, got {value}"
        )));
    }
    Ok(())
}

/// Reject an array column holding non-strings or repeated strings
///
/// Columns of another shape pass; the shape check reports those.
pub(crate) fn require_string_set(column: &str, value: &DocumentValue) -> Result<()> {
    let Some(items) = value.as_array() else {
        return Ok(());
    };
    let mut seen = std::collections::BTreeSet::new();
    for (i, item) in items.iter().enumerate() {
        let Some(text) = item.as_str() else {
            return Err(Error::validation(format!(
                "{column}[{i}] must be a string, found {}",
                item.shape()
            )));
        };
        if !seen.insert(text) {
            return Err(Error::validation(format!(
                "{column} already contains \"{text}\""
            )));
        }
    }
    Ok(())
}

/// Error for `set_column` on a column that is unknown or fixed
pub(crate) fn column_not_writable<R: Record>(name: &str) -> Error {
    match R::relational_field(name) {
        Some(_) => Error::validation(format!("{}.{name} is immutable", R::KIND)),
        None => Error::validation(format!("{} has no relational column '{name}'", R::KIND)),
    }
}

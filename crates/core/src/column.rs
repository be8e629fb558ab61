//! Relational column values and filters
//!
//! Fixed columns (`email`, `price`, `status`, `timestamp`, ...) are typed
//! Rust fields on each record. [`ColumnValue`] is their dynamic view, used
//! by relational filters and by narrow column updates.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Dynamic value of a relational column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ColumnValue {
    /// Integer column (ids, foreign keys)
    Int(i64),
    /// Decimal column (prices, totals)
    Decimal(f64),
    /// Text column
    Text(String),
    /// UTC timestamp column
    Timestamp(DateTime<Utc>),
}

impl ColumnValue {
    /// Type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnValue::Int(_) => "int",
            ColumnValue::Decimal(_) => "decimal",
            ColumnValue::Text(_) => "text",
            ColumnValue::Timestamp(_) => "timestamp",
        }
    }

    /// Compare two values of compatible type
    ///
    /// Int and Decimal compare numerically. Any other pairing of different
    /// types is incomparable and returns `None`.
    pub fn compare(&self, other: &ColumnValue) -> Option<Ordering> {
        match (self, other) {
            (ColumnValue::Int(a), ColumnValue::Int(b)) => Some(a.cmp(b)),
            (ColumnValue::Text(a), ColumnValue::Text(b)) => Some(a.cmp(b)),
            (ColumnValue::Timestamp(a), ColumnValue::Timestamp(b)) => Some(a.cmp(b)),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y),
                _ => None,
            },
        }
    }

    /// Numeric view of Int and Decimal values
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ColumnValue::Int(i) => Some(*i as f64),
            ColumnValue::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Text view
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ColumnValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Take a text value for `column`, or fail with a validation error
    pub fn into_text(self, column: &str) -> Result<String> {
        match self {
            ColumnValue::Text(s) => Ok(s),
            other => Err(type_error(column, "text", &other)),
        }
    }

    /// Take a decimal value for `column`; integers widen
    pub fn into_decimal(self, column: &str) -> Result<f64> {
        match self {
            ColumnValue::Decimal(d) => Ok(d),
            ColumnValue::Int(i) => Ok(i as f64),
            other => Err(type_error(column, "decimal", &other)),
        }
    }
}

fn type_error(column: &str, expected: &str, found: &ColumnValue) -> Error {
    Error::validation(format!(
        "column '{column}' expects {expected}, got {}",
        found.type_name()
    ))
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::Int(i) => write!(f, "{i}"),
            ColumnValue::Decimal(d) => write!(f, "{d}"),
            ColumnValue::Text(s) => write!(f, "{s:?}"),
            ColumnValue::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

impl From<i64> for ColumnValue {
    fn from(i: i64) -> Self {
        ColumnValue::Int(i)
    }
}

impl From<u64> for ColumnValue {
    fn from(i: u64) -> Self {
        ColumnValue::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<f64> for ColumnValue {
    fn from(d: f64) -> Self {
        ColumnValue::Decimal(d)
    }
}

impl From<&str> for ColumnValue {
    fn from(s: &str) -> Self {
        ColumnValue::Text(s.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(s: String) -> Self {
        ColumnValue::Text(s)
    }
}

impl From<DateTime<Utc>> for ColumnValue {
    fn from(t: DateTime<Utc>) -> Self {
        ColumnValue::Timestamp(t)
    }
}

// =============================================================================
// RelationalFilter
// =============================================================================

/// Predicate over one relational column, evaluated by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationalFilter {
    /// Column equals the value
    Equals(ColumnValue),
    /// `min <= column <= max`
    Between {
        /// Inclusive lower bound
        min: ColumnValue,
        /// Inclusive upper bound
        max: ColumnValue,
    },
    /// `column < value`
    Before(ColumnValue),
    /// Text column contains the substring (case-sensitive)
    TextContains(String),
}

impl RelationalFilter {
    /// Shorthand for `Equals`
    pub fn equals(value: impl Into<ColumnValue>) -> Self {
        RelationalFilter::Equals(value.into())
    }

    /// Shorthand for `Between`
    pub fn between(min: impl Into<ColumnValue>, max: impl Into<ColumnValue>) -> Self {
        RelationalFilter::Between {
            min: min.into(),
            max: max.into(),
        }
    }

    /// Shorthand for `Before`
    pub fn before(value: impl Into<ColumnValue>) -> Self {
        RelationalFilter::Before(value.into())
    }

    /// Shorthand for `TextContains`
    pub fn text_contains(needle: impl Into<String>) -> Self {
        RelationalFilter::TextContains(needle.into())
    }

    /// Whether a column value satisfies this filter
    ///
    /// Incomparable types never match.
    pub fn matches(&self, value: &ColumnValue) -> bool {
        match self {
            RelationalFilter::Equals(expected) => {
                value.compare(expected) == Some(Ordering::Equal)
            }
            RelationalFilter::Between { min, max } => {
                matches!(
                    value.compare(min),
                    Some(Ordering::Greater | Ordering::Equal)
                ) && matches!(value.compare(max), Some(Ordering::Less | Ordering::Equal))
            }
            RelationalFilter::Before(bound) => value.compare(bound) == Some(Ordering::Less),
            RelationalFilter::TextContains(needle) => value
                .as_text()
                .is_some_and(|text| text.contains(needle.as_str())),
        }
    }
}

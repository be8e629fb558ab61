//! Document values
//!
//! This module defines:
//! - DocumentValue: tagged variant for the contents of a document column
//! - Number: integer or floating point, compared by numeric value
//! - Shape: the top-level kind of a value
//!
//! ## Equality
//!
//! - Numbers compare by value, not representation: `Int(1) == Float(1.0)`
//! - Strings compare by exact character sequence (case-sensitive)
//! - Objects compare key-by-key; insertion order is irrelevant
//! - Arrays compare element-by-element in order
//!
//! ## Serialization
//!
//! DocumentValue serializes as plain JSON through `serde_json::Value`, so a
//! stored document has no variant tags in it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Object contents of a document value
pub type DocumentMap = BTreeMap<String, DocumentValue>;

/// Numeric leaf of a document
///
/// Integers that fit in `i64` stay integers; everything else is `f64`.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
}

impl Number {
    /// Numeric value as `f64`
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// Numeric value as `i64`, if it is integral and in range
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Number::Int(i) => Some(i),
            Number::Float(f) => float_as_exact_i64(f),
        }
    }
}

/// `f64` → `i64` only when no information is lost
fn float_as_exact_i64(f: f64) -> Option<i64> {
    // 2^63 is exactly representable; anything at or above it overflows i64
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
    if f.is_finite() && f.fract() == 0.0 && f >= -I64_BOUND && f < I64_BOUND {
        Some(f as i64)
    } else {
        None
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            // IEEE-754: NaN != NaN, -0.0 == 0.0
            (Number::Float(a), Number::Float(b)) => a == b,
            (Number::Int(i), Number::Float(f)) | (Number::Float(f), Number::Int(i)) => {
                float_as_exact_i64(f) == Some(i)
            }
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

/// Top-level kind of a document value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    /// `null`
    Null,
    /// `true` / `false`
    Bool,
    /// integer or float
    Number,
    /// string
    String,
    /// ordered array
    Array,
    /// object with unique string keys
    Object,
}

impl Shape {
    /// Null, bool, number and string are scalars
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Shape::Array | Shape::Object)
    }

    /// Lower-case name used in error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Null => "null",
            Shape::Bool => "bool",
            Shape::Number => "number",
            Shape::String => "string",
            Shape::Array => "array",
            Shape::Object => "object",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semi-structured value held by a document column
///
/// # Examples
///
/// ```
/// use docfield_core::DocumentValue;
///
/// let doc: DocumentValue = serde_json::json!({"cpu": "Apple M2 Max", "ram": 32}).into();
/// assert!(doc.is_object());
/// assert_eq!(doc.get("cpu").and_then(|v| v.as_str()), Some("Apple M2 Max"));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum DocumentValue {
    /// Null value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value
    Number(Number),
    /// UTF-8 string
    String(String),
    /// Ordered array
    Array(Vec<DocumentValue>),
    /// Object with unique keys
    Object(DocumentMap),
}

impl DocumentValue {
    /// Empty object `{}`
    pub fn object() -> Self {
        DocumentValue::Object(DocumentMap::new())
    }

    /// Empty array `[]`
    pub fn array() -> Self {
        DocumentValue::Array(Vec::new())
    }

    /// Object with exactly one entry, e.g. `{"city": "San Francisco"}`
    pub fn single_entry(key: impl Into<String>, value: impl Into<DocumentValue>) -> Self {
        let mut map = DocumentMap::new();
        map.insert(key.into(), value.into());
        DocumentValue::Object(map)
    }

    /// Convert any serializable value through its JSON form
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(DocumentValue::from)
    }

    /// Top-level kind
    pub fn shape(&self) -> Shape {
        match self {
            DocumentValue::Null => Shape::Null,
            DocumentValue::Bool(_) => Shape::Bool,
            DocumentValue::Number(_) => Shape::Number,
            DocumentValue::String(_) => Shape::String,
            DocumentValue::Array(_) => Shape::Array,
            DocumentValue::Object(_) => Shape::Object,
        }
    }

    /// Check if this is a scalar (null, bool, number or string)
    pub fn is_scalar(&self) -> bool {
        self.shape().is_scalar()
    }

    /// Check if this is null
    pub fn is_null(&self) -> bool {
        matches!(self, DocumentValue::Null)
    }

    /// Check if this is an array
    pub fn is_array(&self) -> bool {
        matches!(self, DocumentValue::Array(_))
    }

    /// Check if this is an object
    pub fn is_object(&self) -> bool {
        matches!(self, DocumentValue::Object(_))
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DocumentValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as number if this is a Number value
    pub fn as_number(&self) -> Option<Number> {
        match self {
            DocumentValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as `f64` if this is a Number value
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(|n| n.as_f64())
    }

    /// Get as `i64` if this is an integral Number value
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(|n| n.as_i64())
    }

    /// Get as string slice if this is a String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DocumentValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as slice if this is an Array value
    pub fn as_array(&self) -> Option<&[DocumentValue]> {
        match self {
            DocumentValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Get as map if this is an Object value
    pub fn as_object(&self) -> Option<&DocumentMap> {
        match self {
            DocumentValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key of an object; `None` for missing keys and non-objects
    pub fn get(&self, key: &str) -> Option<&DocumentValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Serialize to compact JSON
    pub fn to_json_string(&self) -> String {
        serde_json::Value::from(self.clone()).to_string()
    }

    /// Approximate serialized size in bytes
    pub fn size_bytes(&self) -> usize {
        self.to_json_string().len()
    }

    /// Maximum nesting depth; 0 for scalars
    pub fn nesting_depth(&self) -> usize {
        match self {
            DocumentValue::Array(items) => {
                1 + items.iter().map(|v| v.nesting_depth()).max().unwrap_or(0)
            }
            DocumentValue::Object(map) => {
                1 + map.values().map(|v| v.nesting_depth()).max().unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Largest array length anywhere in the value
    pub fn max_array_len(&self) -> usize {
        match self {
            DocumentValue::Array(items) => items
                .iter()
                .map(|v| v.max_array_len())
                .max()
                .unwrap_or(0)
                .max(items.len()),
            DocumentValue::Object(map) => {
                map.values().map(|v| v.max_array_len()).max().unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// True if any float in the value is NaN or infinite
    pub fn has_non_finite(&self) -> bool {
        match self {
            DocumentValue::Number(Number::Float(f)) => !f.is_finite(),
            DocumentValue::Array(items) => items.iter().any(|v| v.has_non_finite()),
            DocumentValue::Object(map) => map.values().any(|v| v.has_non_finite()),
            _ => false,
        }
    }
}

impl fmt::Display for DocumentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json_string())
    }
}

impl FromStr for DocumentValue {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str::<serde_json::Value>(s).map(DocumentValue::from)
    }
}

// =============================================================================
// serde_json interop
// =============================================================================

impl From<serde_json::Value> for DocumentValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => DocumentValue::Null,
            serde_json::Value::Bool(b) => DocumentValue::Bool(b),
            serde_json::Value::Number(n) => {
                let number = match n.as_i64() {
                    Some(i) => Number::Int(i),
                    // u64 above i64::MAX and all non-integers
                    None => Number::Float(n.as_f64().unwrap_or(f64::NAN)),
                };
                DocumentValue::Number(number)
            }
            serde_json::Value::String(s) => DocumentValue::String(s),
            serde_json::Value::Array(items) => {
                DocumentValue::Array(items.into_iter().map(DocumentValue::from).collect())
            }
            serde_json::Value::Object(map) => DocumentValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, DocumentValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<DocumentValue> for serde_json::Value {
    fn from(value: DocumentValue) -> Self {
        match value {
            DocumentValue::Null => serde_json::Value::Null,
            DocumentValue::Bool(b) => serde_json::Value::Bool(b),
            DocumentValue::Number(Number::Int(i)) => serde_json::Value::from(i),
            // JSON has no NaN/Infinity
            DocumentValue::Number(Number::Float(f)) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            DocumentValue::String(s) => serde_json::Value::String(s),
            DocumentValue::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            DocumentValue::Object(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

// =============================================================================
// Conversions from common types
// =============================================================================

impl From<bool> for DocumentValue {
    fn from(b: bool) -> Self {
        DocumentValue::Bool(b)
    }
}

impl From<i64> for DocumentValue {
    fn from(i: i64) -> Self {
        DocumentValue::Number(Number::Int(i))
    }
}

impl From<i32> for DocumentValue {
    fn from(i: i32) -> Self {
        DocumentValue::Number(Number::Int(i as i64))
    }
}

impl From<u32> for DocumentValue {
    fn from(i: u32) -> Self {
        DocumentValue::Number(Number::Int(i as i64))
    }
}

impl From<u64> for DocumentValue {
    fn from(i: u64) -> Self {
        match i64::try_from(i) {
            Ok(i) => DocumentValue::Number(Number::Int(i)),
            Err(_) => DocumentValue::Number(Number::Float(i as f64)),
        }
    }
}

impl From<f64> for DocumentValue {
    fn from(f: f64) -> Self {
        DocumentValue::Number(Number::Float(f))
    }
}

impl From<Number> for DocumentValue {
    fn from(n: Number) -> Self {
        DocumentValue::Number(n)
    }
}

impl From<&str> for DocumentValue {
    fn from(s: &str) -> Self {
        DocumentValue::String(s.to_string())
    }
}

impl From<String> for DocumentValue {
    fn from(s: String) -> Self {
        DocumentValue::String(s)
    }
}

impl<T: Into<DocumentValue>> From<Vec<T>> for DocumentValue {
    fn from(items: Vec<T>) -> Self {
        DocumentValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<DocumentValue>> From<Option<T>> for DocumentValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => DocumentValue::Null,
        }
    }
}

impl FromIterator<(String, DocumentValue)> for DocumentValue {
    fn from_iter<I: IntoIterator<Item = (String, DocumentValue)>>(iter: I) -> Self {
        DocumentValue::Object(iter.into_iter().collect())
    }
}

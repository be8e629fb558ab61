//! Key paths into documents and scalar extraction
//!
//! A [`FieldPath`] is a sequence of object keys, written with dots:
//! `age`, `address.city`, `camera.main`. Paths only walk objects; there is
//! no array indexing.
//!
//! [`extract`] returns the scalar at a path, or `None` when:
//! - a segment is missing
//! - a non-terminal value is not an object
//! - the terminal value is null, an array or an object
//!
//! Absence is never an error. Range predicates treat it as "no match".

use crate::limits;
use crate::value::{DocumentValue, Number};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for key path parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathParseError {
    /// Path has no segments
    #[error("path is empty")]
    Empty,
    /// Empty key in path
    #[error("empty key in path at position {0}")]
    EmptyKey(usize),
    /// Path too long
    #[error("path has {0} segments, maximum is {}", limits::MAX_PATH_LENGTH)]
    TooLong(usize),
}

/// Dotted path of object keys
///
/// # Examples
///
/// ```
/// use docfield_core::FieldPath;
///
/// let path: FieldPath = "address.city".parse().unwrap();
/// assert_eq!(path.segments(), ["address", "city"]);
/// assert_eq!(path, FieldPath::key("address").then("city"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Single-segment path
    pub fn key(key: impl Into<String>) -> Self {
        FieldPath {
            segments: vec![key.into()],
        }
    }

    /// Extend by one segment
    pub fn then(mut self, key: impl Into<String>) -> Self {
        self.segments.push(key.into());
        self
    }

    /// Build from segments, rejecting empty paths and empty keys
    pub fn from_segments<I, S>(segments: I) -> Result<Self, PathParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(PathParseError::Empty);
        }
        if let Some(pos) = segments.iter().position(|s| s.is_empty()) {
            return Err(PathParseError::EmptyKey(pos));
        }
        if limits::validate_path_length(segments.len()).is_err() {
            return Err(PathParseError::TooLong(segments.len()));
        }
        Ok(FieldPath { segments })
    }

    /// Path segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false for a constructed path; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl FromStr for FieldPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathParseError::Empty);
        }
        FieldPath::from_segments(s.split('.'))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Scalar found at the end of a path
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Boolean leaf
    Bool(bool),
    /// Numeric leaf
    Number(Number),
    /// String leaf
    String(String),
}

impl Scalar {
    /// Numeric view used by range comparisons
    ///
    /// Numbers pass through. Strings are parsed as decimals after trimming
    /// and must be finite. Booleans are never numeric.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(n.as_f64()).filter(|f| f.is_finite()),
            Scalar::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            Scalar::Bool(_) => None,
        }
    }

    /// Text view used by string range comparisons
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Scalar> for DocumentValue {
    fn from(s: Scalar) -> Self {
        match s {
            Scalar::Bool(b) => DocumentValue::Bool(b),
            Scalar::Number(n) => DocumentValue::Number(n),
            Scalar::String(s) => DocumentValue::String(s),
        }
    }
}

/// Value at `path`, whatever its kind
pub fn get_at_path<'a>(doc: &'a DocumentValue, path: &FieldPath) -> Option<&'a DocumentValue> {
    path.segments()
        .iter()
        .try_fold(doc, |current, segment| current.get(segment))
}

/// Scalar at `path`, or `None` when absent
///
/// # Examples
///
/// ```
/// use docfield_core::{extract, FieldPath, Scalar, DocumentValue};
/// use serde_json::json;
///
/// let profile: DocumentValue = json!({"age": 30, "interests": ["gaming"]}).into();
/// let age = extract(&profile, &FieldPath::key("age")).unwrap();
/// assert_eq!(age.to_number(), Some(30.0));
/// assert!(extract(&profile, &FieldPath::key("interests")).is_none());
/// ```
pub fn extract(doc: &DocumentValue, path: &FieldPath) -> Option<Scalar> {
    match get_at_path(doc, path)? {
        DocumentValue::Bool(b) => Some(Scalar::Bool(*b)),
        DocumentValue::Number(n) => Some(Scalar::Number(*n)),
        DocumentValue::String(s) => Some(Scalar::String(s.clone())),
        DocumentValue::Null | DocumentValue::Array(_) | DocumentValue::Object(_) => None,
    }
}

/// One end of a path-range probe
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    /// Compare numerically; string leaves are coerced
    Number(f64),
    /// Compare lexicographically against string leaves only
    Text(String),
}

impl Bound {
    fn compare(&self, scalar: &Scalar) -> Option<Ordering> {
        match self {
            Bound::Number(b) => scalar.to_number().and_then(|v| v.partial_cmp(b)),
            Bound::Text(b) => scalar.as_str().map(|v| v.cmp(b.as_str())),
        }
    }
}

impl From<f64> for Bound {
    fn from(f: f64) -> Self {
        Bound::Number(f)
    }
}

impl From<i64> for Bound {
    fn from(i: i64) -> Self {
        Bound::Number(i as f64)
    }
}

impl From<&str> for Bound {
    fn from(s: &str) -> Self {
        Bound::Text(s.to_string())
    }
}

/// Inclusive range over the scalar at a path
///
/// Either end may be open. A scalar that cannot be compared with a bound
/// (wrong kind, non-numeric string) is outside the range.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueRange {
    /// Lower bound, inclusive
    pub min: Option<Bound>,
    /// Upper bound, inclusive
    pub max: Option<Bound>,
}

impl ValueRange {
    /// Both ends inclusive
    pub fn between(min: impl Into<Bound>, max: impl Into<Bound>) -> Self {
        ValueRange {
            min: Some(min.into()),
            max: Some(max.into()),
        }
    }

    /// `value >= min`
    pub fn at_least(min: impl Into<Bound>) -> Self {
        ValueRange {
            min: Some(min.into()),
            max: None,
        }
    }

    /// `value <= max`
    pub fn at_most(max: impl Into<Bound>) -> Self {
        ValueRange {
            min: None,
            max: Some(max.into()),
        }
    }

    /// Whether `scalar` falls inside the range
    pub fn includes(&self, scalar: &Scalar) -> bool {
        let above_min = match &self.min {
            Some(b) => matches!(b.compare(scalar), Some(Ordering::Greater | Ordering::Equal)),
            None => true,
        };
        let below_max = match &self.max {
            Some(b) => matches!(b.compare(scalar), Some(Ordering::Less | Ordering::Equal)),
            None => true,
        };
        above_min && below_max
    }

    /// Extract at `path` and test; absent values never match
    pub fn matches(&self, doc: &DocumentValue, path: &FieldPath) -> bool {
        extract(doc, path).is_some_and(|s| self.includes(&s))
    }
}

//! Partial updates to a single document column
//!
//! A [`FieldPatch`] is one of a closed set of operations. [`apply`] is pure:
//! it borrows the current value and returns either a new value or
//! [`PatchOutcome::Unchanged`], so the caller can skip the write entirely
//! when nothing changed.
//!
//! | Operation | Requires | Effect |
//! |-----------|----------|--------|
//! | `Replace(v)` | `v` has the column's declared shape | whole value replaced |
//! | `AppendArrayElement(e)` | array | `e` pushed at the end |
//! | `InsertUniqueScalar(s)` | array of scalars, `s` scalar | `s` pushed unless an equal scalar exists |
//! | `RemoveScalar(s)` | array of scalars, `s` scalar | first equal element removed, if any |
//!
//! Any requirement not met is an error of kind `ErrorKind::ShapeMismatch`.

use crate::error::{Error, Result};
use crate::value::{DocumentValue, Shape};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Patch operation on one document column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum FieldPatch {
    /// Replace the whole column value
    Replace(DocumentValue),
    /// Append one element to an array column
    AppendArrayElement(DocumentValue),
    /// Insert a scalar into an array column used as a set
    InsertUniqueScalar(DocumentValue),
    /// Remove a scalar from an array column used as a set
    RemoveScalar(DocumentValue),
}

impl FieldPatch {
    /// Operation name for logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            FieldPatch::Replace(_) => "replace",
            FieldPatch::AppendArrayElement(_) => "append_array_element",
            FieldPatch::InsertUniqueScalar(_) => "insert_unique_scalar",
            FieldPatch::RemoveScalar(_) => "remove_scalar",
        }
    }

    /// Whether this is a whole-value replace
    pub fn is_replace(&self) -> bool {
        matches!(self, FieldPatch::Replace(_))
    }

    /// Operand carried by the patch
    pub fn value(&self) -> &DocumentValue {
        match self {
            FieldPatch::Replace(v)
            | FieldPatch::AppendArrayElement(v)
            | FieldPatch::InsertUniqueScalar(v)
            | FieldPatch::RemoveScalar(v) => v,
        }
    }
}

impl fmt::Display for FieldPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.value())
    }
}

/// Result of applying a patch
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOutcome {
    /// The column has a new value
    Changed(DocumentValue),
    /// The patch was a no-op; nothing should be written
    Unchanged,
}

impl PatchOutcome {
    /// Whether the patch changed the value
    pub fn is_changed(&self) -> bool {
        matches!(self, PatchOutcome::Changed(_))
    }

    /// New value, or a clone of `current` when unchanged
    pub fn into_value(self, current: &DocumentValue) -> DocumentValue {
        match self {
            PatchOutcome::Changed(v) => v,
            PatchOutcome::Unchanged => current.clone(),
        }
    }
}

/// Apply `patch` to `current`, a value of column `column` declared as `declared`
///
/// # Examples
///
/// ```
/// use docfield_core::{apply_patch, DocumentValue, FieldPatch, PatchOutcome, Shape};
///
/// let tags = DocumentValue::from(vec!["laptop"]);
/// let add = FieldPatch::InsertUniqueScalar("gaming".into());
///
/// let once = apply_patch("tags", Shape::Array, &tags, &add).unwrap().into_value(&tags);
/// assert_eq!(once, DocumentValue::from(vec!["laptop", "gaming"]));
///
/// let twice = apply_patch("tags", Shape::Array, &once, &add).unwrap();
/// assert_eq!(twice, PatchOutcome::Unchanged);
/// ```
pub fn apply(
    column: &str,
    declared: Shape,
    current: &DocumentValue,
    patch: &FieldPatch,
) -> Result<PatchOutcome> {
    match patch {
        FieldPatch::Replace(new_value) => {
            if new_value.shape() != declared {
                return Err(Error::shape_mismatch(column, declared, new_value.shape()));
            }
            if new_value == current {
                return Ok(PatchOutcome::Unchanged);
            }
            Ok(PatchOutcome::Changed(new_value.clone()))
        }
        FieldPatch::AppendArrayElement(element) => {
            let items = require_array(column, current)?;
            let mut next = Vec::with_capacity(items.len() + 1);
            next.extend_from_slice(items);
            next.push(element.clone());
            Ok(PatchOutcome::Changed(DocumentValue::Array(next)))
        }
        FieldPatch::InsertUniqueScalar(scalar) => {
            let items = require_scalar_set(column, current, scalar)?;
            if items.iter().any(|existing| existing == scalar) {
                return Ok(PatchOutcome::Unchanged);
            }
            let mut next = items.to_vec();
            next.push(scalar.clone());
            Ok(PatchOutcome::Changed(DocumentValue::Array(next)))
        }
        FieldPatch::RemoveScalar(scalar) => {
            let items = require_scalar_set(column, current, scalar)?;
            match items.iter().position(|existing| existing == scalar) {
                Some(pos) => {
                    let mut next = items.to_vec();
                    next.remove(pos);
                    Ok(PatchOutcome::Changed(DocumentValue::Array(next)))
                }
                None => Ok(PatchOutcome::Unchanged),
            }
        }
    }
}

fn require_array<'a>(column: &str, current: &'a DocumentValue) -> Result<&'a [DocumentValue]> {
    current
        .as_array()
        .ok_or_else(|| Error::shape_mismatch(column, Shape::Array, current.shape()))
}

fn require_scalar_set<'a>(
    column: &str,
    current: &'a DocumentValue,
    operand: &DocumentValue,
) -> Result<&'a [DocumentValue]> {
    let items = require_array(column, current)?;
    if !operand.is_scalar() {
        return Err(Error::not_scalar(column, "operand", operand.shape()));
    }
    if let Some((i, bad)) = items.iter().enumerate().find(|(_, v)| !v.is_scalar()) {
        return Err(Error::not_scalar(column, format!("element {i}"), bad.shape()));
    }
    Ok(items)
}

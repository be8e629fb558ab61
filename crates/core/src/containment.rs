//! Containment predicate
//!
//! `contains(container, probe)` holds when every piece of structure and
//! every scalar in `probe` is present in `container`:
//!
//! | Probe | Holds when |
//! |-------|------------|
//! | object | container is an object with each probe key, values contained recursively; extra keys ignored |
//! | array | container is an array and each probe element is contained by some container element |
//! | scalar | container equals it (numbers by value, strings exactly) |
//!
//! Array matching ignores order and multiplicity: one container element may
//! satisfy several probe elements. An empty object (array) probe matches any
//! object (array).
//!
//! This is the only definition of containment in the workspace. Index-backed
//! lookups use it to verify candidates and full scans use it directly, so the
//! two paths cannot disagree.

use crate::value::DocumentValue;

/// Whether `container` contains `contained`
///
/// # Examples
///
/// ```
/// use docfield_core::{contains, DocumentValue};
/// use serde_json::json;
///
/// let specs: DocumentValue = json!({"cpu": "Apple M2 Max", "ports": ["HDMI", "USB-C"]}).into();
/// assert!(contains(&specs, &json!({"cpu": "Apple M2 Max"}).into()));
/// assert!(contains(&specs, &json!({"ports": ["HDMI"]}).into()));
/// assert!(!contains(&specs, &json!({"cpu": "Intel"}).into()));
/// ```
pub fn contains(container: &DocumentValue, contained: &DocumentValue) -> bool {
    match (container, contained) {
        (DocumentValue::Object(outer), DocumentValue::Object(probe)) => {
            probe.iter().all(|(key, expected)| {
                outer
                    .get(key)
                    .is_some_and(|actual| contains(actual, expected))
            })
        }
        (DocumentValue::Array(outer), DocumentValue::Array(probe)) => probe
            .iter()
            .all(|expected| outer.iter().any(|actual| contains(actual, expected))),
        (_, DocumentValue::Object(_)) | (_, DocumentValue::Array(_)) => false,
        // Scalar probe: structural equality
        (_, scalar) => container == scalar,
    }
}

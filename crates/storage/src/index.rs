//! Secondary indices for table rows
//!
//! - [`ContainmentIndex`]: inverted index over one document column, used to
//!   narrow containment lookups to a candidate set
//! - [`UniqueIndex`]: unique key → row id (user emails)
//!
//! # Containment terms
//!
//! A document is reduced to a set of 64-bit terms. Each term hashes a key
//! path (array levels collapsed, so elements share their parent's path)
//! together with either "this key exists" or a scalar leaf. Numbers are
//! hashed by value: `1` and `1.0` give the same term.
//!
//! If `container` contains `probe`, every term of `probe` is also a term of
//! `container`. The index therefore never misses a match; hash collisions
//! and array-level collapsing only add false candidates, which the caller
//! removes by verifying each candidate with `contains`.

use docfield_core::{DocumentValue, Number, RecordId};
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use smallvec::SmallVec;
use std::hash::{Hash, Hasher};

/// Hashed (path, leaf) pair
pub type Term = u64;

#[derive(Hash)]
enum Leaf<'a> {
    Key,
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    Str(&'a str),
}

impl<'a> Leaf<'a> {
    fn number(n: &Number) -> Self {
        match n.as_i64() {
            Some(i) => Leaf::Int(i),
            None => Leaf::Float(n.as_f64().to_bits()),
        }
    }
}

fn term(path: &[&str], leaf: Leaf<'_>) -> Term {
    let mut hasher = FxHasher::default();
    path.len().hash(&mut hasher);
    for segment in path {
        segment.hash(&mut hasher);
    }
    leaf.hash(&mut hasher);
    hasher.finish()
}

/// All terms of a document
pub fn terms(value: &DocumentValue) -> FxHashSet<Term> {
    let mut out = FxHashSet::default();
    let mut path = Vec::new();
    collect(value, &mut path, &mut out);
    out
}

fn collect<'a>(value: &'a DocumentValue, path: &mut Vec<&'a str>, out: &mut FxHashSet<Term>) {
    match value {
        DocumentValue::Object(map) => {
            for (key, child) in map {
                path.push(key.as_str());
                out.insert(term(path, Leaf::Key));
                collect(child, path, out);
                path.pop();
            }
        }
        DocumentValue::Array(items) => {
            for item in items {
                collect(item, path, out);
            }
        }
        DocumentValue::Null => {
            out.insert(term(path, Leaf::Null));
        }
        DocumentValue::Bool(b) => {
            out.insert(term(path, Leaf::Bool(*b)));
        }
        DocumentValue::Number(n) => {
            out.insert(term(path, Leaf::number(n)));
        }
        DocumentValue::String(s) => {
            out.insert(term(path, Leaf::Str(s)));
        }
    }
}

/// Inverted index over one document column: term → row ids
#[derive(Debug, Default)]
pub struct ContainmentIndex {
    postings: FxHashMap<Term, FxHashSet<RecordId>>,
}

impl ContainmentIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a row's document
    pub fn insert(&mut self, id: RecordId, doc: &DocumentValue) {
        for t in terms(doc) {
            self.postings.entry(t).or_default().insert(id);
        }
    }

    /// Drop a row's document
    ///
    /// `doc` must be the value that was indexed for `id`. Empty posting
    /// lists are removed.
    pub fn remove(&mut self, id: RecordId, doc: &DocumentValue) {
        for t in terms(doc) {
            if let Some(ids) = self.postings.get_mut(&t) {
                ids.remove(&id);
                if ids.is_empty() {
                    self.postings.remove(&t);
                }
            }
        }
    }

    /// Rows that may contain `probe`
    ///
    /// Returns `None` when the probe has no terms (`{}`, `[]`, nested
    /// empties); every row is then a candidate. Otherwise the ids are a
    /// superset of the matching rows, in ascending order.
    pub fn candidates(&self, probe: &DocumentValue) -> Option<Vec<RecordId>> {
        let probe_terms = terms(probe);
        if probe_terms.is_empty() {
            return None;
        }

        let mut lists: SmallVec<[&FxHashSet<RecordId>; 8]> = SmallVec::new();
        for t in &probe_terms {
            match self.postings.get(t) {
                Some(ids) => lists.push(ids),
                None => return Some(Vec::new()),
            }
        }
        lists.sort_by_key(|ids| ids.len());

        let (smallest, rest) = lists.split_first()?;
        let mut out: Vec<RecordId> = smallest
            .iter()
            .copied()
            .filter(|id| rest.iter().all(|ids| ids.contains(id)))
            .collect();
        out.sort_unstable();
        Some(out)
    }

    /// Number of distinct terms
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}

/// Unique key → row id
#[derive(Debug, Default)]
pub struct UniqueIndex {
    index: FxHashMap<String, RecordId>,
}

impl UniqueIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Row currently holding `key`
    pub fn owner(&self, key: &str) -> Option<RecordId> {
        self.index.get(key).copied()
    }

    /// Whether `key` is free for row `id`
    pub fn is_available(&self, key: &str, id: RecordId) -> bool {
        self.owner(key).map_or(true, |owner| owner == id)
    }

    /// Claim `key` for `id`
    pub fn insert(&mut self, key: String, id: RecordId) {
        self.index.insert(key, id);
    }

    /// Release `key` if `id` holds it
    pub fn remove(&mut self, key: &str, id: RecordId) {
        if self.owner(key) == Some(id) {
            self.index.remove(key);
        }
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

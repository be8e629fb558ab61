//! In-memory row store
//!
//! Reference [`RecordStore`] used by the engine and tests.
//!
//! # Design
//!
//! - DashMap of encoded rows: lock-free reads, sharded writes
//! - One table-level write lock serializes the version check, the row write
//!   and index maintenance, so two writers can never both pass the check
//!   against the same version
//! - FxHashMap-backed containment and unique indices, guarded by that lock
//! - Ids come from an AtomicU64, starting at 1
//!
//! Rows are stored encoded (see [`StoredRow`]) and decoded on every read, so
//! callers always get an owned copy and can never alias stored state.

use crate::codec::StoredRow;
use crate::index::{ContainmentIndex, UniqueIndex};
use dashmap::DashMap;
use docfield_core::{
    contains, DocumentValue, Error, Record, RecordId, RecordStore, RelationalFilter, Result,
};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

/// Index state mutated only under the write lock
#[derive(Debug, Default)]
struct Indexes {
    containment: FxHashMap<&'static str, ContainmentIndex>,
    unique: UniqueIndex,
}

impl Indexes {
    fn add<R: Record>(&mut self, row: &R) {
        for (column, index) in self.containment.iter_mut() {
            if let Some(doc) = row.document(column) {
                index.insert(row.id(), doc);
            }
        }
        if let Some(key) = row.unique_key() {
            self.unique.insert(key, row.id());
        }
    }

    fn drop_row<R: Record>(&mut self, row: &R) {
        for (column, index) in self.containment.iter_mut() {
            if let Some(doc) = row.document(column) {
                index.remove(row.id(), doc);
            }
        }
        if let Some(key) = row.unique_key() {
            self.unique.remove(&key, row.id());
        }
    }

    fn check_unique<R: Record>(&self, row: &R) -> Result<()> {
        match row.unique_key() {
            Some(key) if !self.unique.is_available(&key, row.id()) => Err(Error::validation(
                format!("{} with key '{key}' already exists", R::KIND),
            )),
            _ => Ok(()),
        }
    }
}

/// In-memory table of `R` rows
pub struct MemoryStore<R: Record> {
    rows: DashMap<RecordId, StoredRow>,
    indexes: RwLock<Indexes>,
    next_id: AtomicU64,
    closed: AtomicBool,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Record> MemoryStore<R> {
    /// Store with no containment indices; every containment lookup scans
    pub fn new() -> Self {
        MemoryStore {
            rows: DashMap::new(),
            indexes: RwLock::new(Indexes::default()),
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
            _marker: PhantomData,
        }
    }

    /// Store with containment indices on the named document columns
    ///
    /// # Errors
    ///
    /// Returns `Validation` if a name is not a document column of `R`.
    pub fn with_indexed_columns<S: AsRef<str>>(columns: &[S]) -> Result<Self> {
        let store = Self::new();
        {
            let mut indexes = store.indexes.write();
            for column in columns {
                let field = R::document_field(column.as_ref()).ok_or_else(|| {
                    Error::validation(format!(
                        "cannot index '{}': not a document column of {}",
                        column.as_ref(),
                        R::KIND
                    ))
                })?;
                indexes
                    .containment
                    .entry(field.name)
                    .or_insert_with(ContainmentIndex::new);
            }
        }
        Ok(store)
    }

    /// Document columns with a containment index
    pub fn indexed_columns(&self) -> Vec<&'static str> {
        let mut columns: Vec<_> = self.indexes.read().containment.keys().copied().collect();
        columns.sort_unstable();
        columns
    }

    /// Refuse all further calls with `StoreUnavailable`
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        debug!(kind = %R::KIND, "store closed");
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::unavailable(format!(
                "{} store is closed",
                R::KIND.table_name()
            )));
        }
        Ok(())
    }

    fn decode_sorted(&self, mut ids: Vec<RecordId>) -> Result<Vec<R>> {
        ids.sort_unstable();
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            // Rows deleted since the id list was taken are skipped
            let stored = match self.rows.get(&id) {
                Some(entry) => entry.value().clone(),
                None => continue,
            };
            out.push(stored.decode()?);
        }
        Ok(out)
    }

    fn all_ids(&self) -> Vec<RecordId> {
        self.rows.iter().map(|entry| *entry.key()).collect()
    }
}

impl<R: Record> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> std::fmt::Debug for MemoryStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("kind", &R::KIND)
            .field("rows", &self.rows.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<R: Record> RecordStore<R> for MemoryStore<R> {
    fn get(&self, id: RecordId) -> Result<Option<R>> {
        self.ensure_open()?;
        let stored = match self.rows.get(&id) {
            Some(entry) => entry.value().clone(),
            None => return Ok(None),
        };
        stored.decode().map(Some)
    }

    fn insert(&self, mut row: R) -> Result<R> {
        self.ensure_open()?;
        let mut indexes = self.indexes.write();
        indexes.check_unique(&row)?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        row.set_id(id);
        row.set_version(1);
        let stored = StoredRow::encode(&row)?;

        self.rows.insert(id, stored);
        indexes.add(&row);
        debug!(kind = %R::KIND, id, "inserted row");
        Ok(row)
    }

    fn update(&self, mut row: R, expected_version: Option<u64>) -> Result<R> {
        self.ensure_open()?;
        let id = row.id();
        let mut indexes = self.indexes.write();

        let stored = match self.rows.get(&id) {
            Some(entry) => entry.value().clone(),
            None => return Err(Error::not_found(R::KIND, id)),
        };
        let previous: R = stored.decode()?;

        if let Some(expected) = expected_version {
            if expected != stored.version {
                debug!(kind = %R::KIND, id, expected, actual = stored.version, "version check failed");
                return Err(Error::ConcurrencyConflict {
                    kind: R::KIND,
                    id,
                    expected,
                    actual: stored.version,
                    current: Box::new(previous.snapshot()),
                });
            }
        }
        indexes.check_unique(&row)?;

        row.set_version(stored.version + 1);
        let encoded = StoredRow::encode(&row)?;
        self.rows.insert(id, encoded);
        indexes.drop_row(&previous);
        indexes.add(&row);
        debug!(kind = %R::KIND, id, version = row.version(), "updated row");
        Ok(row)
    }

    fn delete(&self, id: RecordId) -> Result<bool> {
        self.ensure_open()?;
        let mut indexes = self.indexes.write();
        let Some((_, stored)) = self.rows.remove(&id) else {
            return Ok(false);
        };
        let previous: R = stored.decode()?;
        indexes.drop_row(&previous);
        debug!(kind = %R::KIND, id, "deleted row");
        Ok(true)
    }

    fn scan_all(&self) -> Result<Vec<R>> {
        self.ensure_open()?;
        self.decode_sorted(self.all_ids())
    }

    fn find_by_containment(&self, column: &str, probe: &DocumentValue) -> Result<Vec<R>> {
        self.ensure_open()?;
        if R::document_field(column).is_none() {
            return Err(Error::validation(format!(
                "{} has no document column '{column}'",
                R::KIND
            )));
        }

        let candidates = {
            let indexes = self.indexes.read();
            indexes
                .containment
                .get(column)
                .and_then(|index| index.candidates(probe))
        };
        let ids = match candidates {
            Some(ids) => {
                debug!(kind = %R::KIND, column, candidates = ids.len(), "containment index lookup");
                ids
            }
            None => {
                debug!(kind = %R::KIND, column, "containment lookup without index, scanning");
                self.all_ids()
            }
        };

        let rows = self.decode_sorted(ids)?;
        Ok(rows
            .into_iter()
            .filter(|row| row.document(column).is_some_and(|doc| contains(doc, probe)))
            .collect())
    }

    fn find_by_relational_filter(&self, column: &str, filter: &RelationalFilter) -> Result<Vec<R>> {
        self.ensure_open()?;
        if R::relational_field(column).is_none() {
            return Err(Error::validation(format!(
                "{} has no relational column '{column}'",
                R::KIND
            )));
        }
        let rows = self.scan_all()?;
        Ok(rows
            .into_iter()
            .filter(|row| row.column(column).is_some_and(|value| filter.matches(&value)))
            .collect())
    }

    fn len(&self) -> Result<usize> {
        self.ensure_open()?;
        Ok(self.rows.len())
    }
}

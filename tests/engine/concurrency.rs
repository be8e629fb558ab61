//! Optimistic versioning under racing writers

use crate::common::*;
use docfield::{
    Database, DocumentValue, EngineConfig, ErrorKind, FieldPatch, MemoryStore, NewOrder,
    NewProduct, NewUser, Order, Product, RecordId, RecordStore, RelationalFilter, Result,
};
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

// ============================================================================
// Racing store double
// ============================================================================

/// Order store that lets another writer cancel the order just before the
/// next versioned update lands
struct RacingOrders {
    inner: MemoryStore<Order>,
    armed: AtomicBool,
}

impl RacingOrders {
    fn new() -> Self {
        RacingOrders {
            inner: MemoryStore::new(),
            armed: AtomicBool::new(false),
        }
    }

    fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

impl RecordStore<Order> for RacingOrders {
    fn get(&self, id: RecordId) -> Result<Option<Order>> {
        self.inner.get(id)
    }

    fn insert(&self, row: Order) -> Result<Order> {
        self.inner.insert(row)
    }

    fn update(&self, row: Order, expected_version: Option<u64>) -> Result<Order> {
        if self.armed.swap(false, Ordering::SeqCst) {
            if let Some(mut other) = self.inner.get(row.id)? {
                other.status = "cancelled".to_string();
                self.inner.update(other, None)?;
            }
        }
        self.inner.update(row, expected_version)
    }

    fn delete(&self, id: RecordId) -> Result<bool> {
        self.inner.delete(id)
    }

    fn scan_all(&self) -> Result<Vec<Order>> {
        self.inner.scan_all()
    }

    fn find_by_containment(&self, column: &str, probe: &DocumentValue) -> Result<Vec<Order>> {
        self.inner.find_by_containment(column, probe)
    }

    fn find_by_relational_filter(
        &self,
        column: &str,
        filter: &RelationalFilter,
    ) -> Result<Vec<Order>> {
        self.inner.find_by_relational_filter(column, filter)
    }

    fn len(&self) -> Result<usize> {
        self.inner.len()
    }
}

fn racing_db() -> (TestDb, Arc<RacingOrders>, RecordId) {
    let orders = Arc::new(RacingOrders::new());
    let db = Database::builder(EngineConfig::default())
        .orders(orders.clone())
        .build()
        .unwrap();
    let t = TestDb::from_db(db);
    let user = t.mutations.create(NewUser::new("race@example.com", "Racer")).unwrap();
    let order = t
        .mutations
        .create(NewOrder::new(user.id, 10.0).with_status("pending"))
        .unwrap();
    (t, orders, order.id)
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn lost_race_reports_conflict_with_current_state() {
    let (t, orders, id) = racing_db();
    orders.arm();

    let err = t.mutations.set_order_status(id, "shipped").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConcurrencyConflict);
    assert!(err.is_retryable());
    let current = err.current_state().unwrap();
    assert_eq!(current.get("status").and_then(|v| v.as_str()), Some("cancelled"));
}

#[test]
fn lost_race_writes_neither_status_nor_history() {
    let (t, orders, id) = racing_db();
    orders.arm();
    let _ = t.mutations.set_order_status(id, "shipped");

    let stored = t.queries.get::<Order>(id).unwrap();
    assert_eq!(stored.status, "cancelled");
    assert_eq!(stored.order_history, json!([]).into());
}

#[test]
fn retry_after_conflict_succeeds() {
    let (t, orders, id) = racing_db();
    orders.arm();
    assert!(t.mutations.set_order_status(id, "shipped").is_err());

    let order = t.mutations.set_order_status(id, "shipped").unwrap();
    assert_eq!(order.status, "shipped");
    let history = order.order_history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].get("from").and_then(|v| v.as_str()), Some("cancelled"));
}

#[test]
fn no_op_patch_never_writes() {
    let (t, orders, id) = racing_db();
    let before = t.queries.get::<Order>(id).unwrap();
    orders.arm();

    // An unchanged outcome returns before reaching the store's update.
    let same: Order = t
        .mutations
        .apply_patch(id, "items", FieldPatch::Replace(json!([]).into()))
        .unwrap();
    assert_eq!(same.version, before.version);
    assert_eq!(same.updated_at, before.updated_at);
}

#[test]
fn concurrent_tag_writers_each_land_once_with_retries() {
    let t = TestDb::new();
    let product = t.mutations.create(NewProduct::new("Widget", 5.0)).unwrap();

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let conflicts = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let mutations = t.mutations.clone();
            let barrier = barrier.clone();
            let conflicts = conflicts.clone();
            thread::spawn(move || {
                barrier.wait();
                let tag = format!("t{i}");
                loop {
                    match mutations.add_tag(product.id, &tag) {
                        Ok(_) => break,
                        Err(e) if e.kind() == ErrorKind::ConcurrencyConflict => {
                            conflicts.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let stored = t.queries.get::<Product>(product.id).unwrap();
    let mut tags = stored.tag_names();
    tags.sort_unstable();
    let mut expected: Vec<String> = (0..threads).map(|i| format!("t{i}")).collect();
    expected.sort_unstable();
    assert_eq!(tags, expected);
    assert_eq!(stored.version, 1 + threads as u64);
}

#[test]
fn racing_stale_version_writers_only_one_wins() {
    let t = TestDb::new();
    let product = t.mutations.create(NewProduct::new("Widget", 5.0)).unwrap();
    let threads = 6;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let mutations = t.mutations.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                mutations.apply_patch_at_version::<Product>(
                    product.id,
                    "tags",
                    FieldPatch::InsertUniqueScalar(format!("t{i}").into()),
                    product.version,
                )
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.kind(), ErrorKind::ConcurrencyConflict);
    }
    assert_eq!(t.queries.get::<Product>(product.id).unwrap().tag_names().len(), 1);
}

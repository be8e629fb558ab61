//! Worked examples and documented properties

use crate::common::*;
use docfield::{
    contains, DocumentValue, FieldPatch, NewProduct, Order, Predicate, Product,
};
use serde_json::json;

// ============================================================================
// Laptop specifications
// ============================================================================

fn laptop_db() -> (TestDb, Product) {
    let t = TestDb::new();
    let laptop = t
        .mutations
        .create(
            NewProduct::new("Laptop", 1999.0)
                .with_specifications(json!({"cpu": "Apple M2 Max", "ports": ["HDMI", "USB-C"]}))
                .with_tags(["laptop"]),
        )
        .unwrap();
    (t, laptop)
}

fn specs(t: &TestDb, probe: serde_json::Value) -> Vec<Product> {
    t.queries
        .search::<Product>(&Predicate::containment("specifications", probe))
        .unwrap()
}

#[test]
fn laptop_matches_by_cpu() {
    let (t, laptop) = laptop_db();
    let hits = specs(&t, json!({"cpu": "Apple M2 Max"}));
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, laptop.id);
}

#[test]
fn laptop_matches_by_port_subset() {
    let (t, laptop) = laptop_db();
    let hits = specs(&t, json!({"ports": ["HDMI"]}));
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, laptop.id);
}

#[test]
fn laptop_does_not_match_other_cpu() {
    let (t, _) = laptop_db();
    assert!(specs(&t, json!({"cpu": "Intel"})).is_empty());
}

// ============================================================================
// Tag idempotence
// ============================================================================

#[test]
fn add_gaming_tag_twice() {
    let (t, laptop) = laptop_db();

    let first = t.mutations.add_tag(laptop.id, "gaming").unwrap();
    assert_eq!(first.tag_names(), vec!["laptop", "gaming"]);
    assert_eq!(first.version, laptop.version + 1);

    let second = t.mutations.add_tag(laptop.id, "gaming").unwrap();
    assert_eq!(second.tag_names(), vec!["laptop", "gaming"]);
    assert_eq!(second.version, first.version);
    assert_eq!(second.updated_at, first.updated_at);

    let stored = t.queries.get::<Product>(laptop.id).unwrap();
    assert_eq!(stored.tags, first.tags);
    assert_eq!(stored.updated_at, first.updated_at);
}

// ============================================================================
// History is append-only
// ============================================================================

#[test]
fn status_transitions_preserve_history_prefix() {
    let t = TestDb::seeded();
    let order = t.queries.list::<Order>().unwrap().remove(0);
    let before: Vec<DocumentValue> = order.order_history.as_array().unwrap().to_vec();

    let transitions = ["out_for_delivery", "delivered", "returned"];
    for status in transitions {
        t.mutations.set_order_status(order.id, status).unwrap();
    }

    let after = t.queries.order_history(order.id).unwrap();
    let after = after.as_array().unwrap();
    assert_eq!(after.len(), before.len() + transitions.len());
    assert_eq!(&after[..before.len()], before.as_slice());

    let mut from = "shipped";
    for (entry, to) in after[before.len()..].iter().zip(transitions) {
        assert_eq!(entry.get("from").and_then(|v| v.as_str()), Some(from));
        assert_eq!(entry.get("to").and_then(|v| v.as_str()), Some(to));
        from = to;
    }
}

#[test]
fn history_cannot_be_replaced_through_generic_patch() {
    let t = TestDb::seeded();
    let order = t.queries.list::<Order>().unwrap().remove(0);
    let err = t
        .mutations
        .apply_patch::<Order>(order.id, "orderHistory", FieldPatch::Replace(json!([]).into()))
        .unwrap_err();
    assert_eq!(err.kind(), docfield::ErrorKind::Validation);
    assert_eq!(t.queries.order_history(order.id).unwrap().as_array().unwrap().len(), 3);
}

// ============================================================================
// Containment properties
// ============================================================================

#[test]
fn every_stored_document_contains_empty_probe_and_itself() {
    let t = TestDb::seeded();
    for product in t.queries.list::<Product>().unwrap() {
        assert!(contains(&product.specifications, &DocumentValue::object()));
        assert!(contains(&product.specifications, &product.specifications));
        assert!(contains(&product.tags, &DocumentValue::array()));
    }
}

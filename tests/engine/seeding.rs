//! Demo data seeding and clearing

use crate::common::*;
use docfield::{clear_all, seed_demo, ErrorKind, LogEntry, Order, Product, SeedSummary, User};

#[test]
fn seed_counts_and_refusal() {
    let t = TestDb::new();
    let summary = seed_demo(&t.db).unwrap();
    assert_eq!(
        summary,
        SeedSummary {
            users: 2,
            products: 3,
            orders: 1,
            logs: 3
        }
    );
    assert_eq!(t.queries.list::<User>().unwrap().len(), 2);
    assert_eq!(t.queries.list::<Product>().unwrap().len(), 3);
    assert_eq!(t.queries.list::<Order>().unwrap().len(), 1);
    assert_eq!(t.queries.list::<LogEntry>().unwrap().len(), 3);

    assert_eq!(seed_demo(&t.db).unwrap_err().kind(), ErrorKind::Validation);
}

#[test]
fn seeded_order_shape() {
    let t = TestDb::seeded();
    let john = t.queries.users_by_city("San Francisco").unwrap().remove(0);
    let order = t.queries.list::<Order>().unwrap().remove(0);
    assert_eq!(order.user_id, john.id);
    assert_eq!(order.status, "shipped");
    assert_eq!(order.total_amount, 2899.98);
    assert_eq!(order.items.as_array().unwrap().len(), 2);
    assert_eq!(order.order_history.as_array().unwrap().len(), 3);
    assert_eq!(
        order.payment_info.get("last4").and_then(|v| v.as_str()),
        Some("1234")
    );
}

#[test]
fn clear_then_seed_again() {
    let t = TestDb::seeded();
    let cleared = clear_all(&t.db).unwrap();
    assert_eq!(cleared.total(), 9);
    assert!(t.queries.list::<User>().unwrap().is_empty());
    assert!(t.queries.products_by_tag("apple").unwrap().is_empty());

    seed_demo(&t.db).unwrap();
    assert_eq!(t.queries.products_by_tag("apple").unwrap().len(), 1);
}

#[test]
fn seeding_only_checks_users_and_products() {
    let t = TestDb::new();
    t.logs.append(docfield::NewLogEntry::new("info", "boot")).unwrap();
    let summary = seed_demo(&t.db).unwrap();
    assert_eq!(summary.logs, 3);
    assert_eq!(t.queries.list::<LogEntry>().unwrap().len(), 4);
}

//! Log service over the demo data

use crate::common::*;
use chrono::{Duration, Utc};
use docfield::{ErrorKind, LogEntry, NewLogEntry, Predicate, RecordOrder};
use serde_json::json;

#[test]
fn demo_logs_are_searchable() {
    let t = TestDb::seeded();
    assert_eq!(t.logs.by_level("error").unwrap().len(), 1);
    assert_eq!(t.logs.by_level("warning").unwrap().len(), 1);

    let declined = t.logs.by_data("errorCode", "CARD_DECLINED").unwrap();
    assert_eq!(declined.len(), 1);
    assert_eq!(declined[0].message, "Payment processing failed");

    let auth = t.logs.by_context("source", "authentication-service").unwrap();
    assert_eq!(auth.len(), 1);
    assert_eq!(t.logs.search_message("memory").unwrap().len(), 1);
}

#[test]
fn error_log_references_seeded_order() {
    let t = TestDb::seeded();
    let order = t.queries.list::<docfield::Order>().unwrap().remove(0);
    let hits = t.logs.by_data("orderId", order.id).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].data.get("amount").and_then(|v| v.as_f64()), Some(2899.98));
}

#[test]
fn paging_walks_every_entry_once() {
    let t = TestDb::seeded();
    for i in 0..7 {
        t.logs
            .append(NewLogEntry::new("debug", format!("tick {i}")).with_data(json!({"i": i})))
            .unwrap();
    }
    let first = t.logs.page(1, 4).unwrap();
    assert_eq!(first.total, 10);
    assert_eq!(first.total_pages, 3);

    let mut seen = Vec::new();
    for page in 1..=first.total_pages {
        seen.extend(t.logs.page(page, 4).unwrap().entries.into_iter().map(|e| e.id));
    }
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 10);
}

#[test]
fn newest_first_default_for_log_searches() {
    let t = TestDb::seeded();
    let hits = t
        .queries
        .search_sorted::<LogEntry>(&Predicate::containment("context", json!({})), RecordOrder::NewestFirst)
        .unwrap();
    let ids: Vec<u64> = hits.iter().map(|e| e.id).collect();
    let page_ids: Vec<u64> = t.logs.page(1, 0).unwrap().entries.iter().map(|e| e.id).collect();
    assert_eq!(ids, page_ids);
}

#[test]
fn analytics_over_demo_data() {
    let t = TestDb::seeded();
    t.logs
        .append(NewLogEntry::new("error", "Inventory sync failed"))
        .unwrap();

    let analytics = t.logs.error_analytics().unwrap();
    assert_eq!(analytics.total_errors, 2);
    assert_eq!(analytics.by_hour.iter().map(|h| h.count).sum::<usize>(), 2);
    assert_eq!(analytics.recent.len(), 2);
    assert_eq!(analytics.recent[0].message, "Inventory sync failed");
}

#[test]
fn cleanup_keeps_recent_entries() {
    let t = TestDb::seeded();
    assert_eq!(t.logs.cleanup(None).unwrap(), 0);
    assert_eq!(t.logs.cleanup(Some(7)).unwrap(), 0);
    assert_eq!(t.logs.page(1, 0).unwrap().total, 3);
}

#[test]
fn cleanup_with_huge_age_is_a_validation_error() {
    let t = TestDb::seeded();
    for days in [200_000_000, u32::MAX] {
        let err = t.logs.cleanup(Some(days)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
    assert_eq!(t.logs.page(1, 0).unwrap().total, 3);
}

#[test]
fn between_covers_just_written_entries() {
    let t = TestDb::seeded();
    let now = Utc::now();
    let hits = t.logs.between(now - Duration::hours(1), now + Duration::hours(1)).unwrap();
    assert_eq!(hits.len(), 3);
    assert_eq!(
        t.logs.between(now, now - Duration::hours(1)).unwrap_err().kind(),
        ErrorKind::Validation
    );
}

#[test]
fn log_level_length_is_validated() {
    let t = TestDb::new();
    let err = t
        .logs
        .append(NewLogEntry::new("x".repeat(21), "too long a level"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

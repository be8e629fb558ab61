//! Query service against the demo data

use crate::common::*;
use docfield::{
    ErrorKind, NewProduct, NewUser, Order, Predicate, Product, RecordOrder, RelationalFilter,
    User, ValueRange,
};
use serde_json::json;

#[test]
fn users_by_city_and_profile() {
    let t = TestDb::seeded();

    let sf = t.queries.users_by_city("San Francisco").unwrap();
    assert_eq!(sf.len(), 1);
    assert_eq!(sf[0].email, "john.doe@example.com");

    let pms = t.queries.users_by_profile("occupation", "Product Manager").unwrap();
    assert_eq!(pms.len(), 1);
    assert_eq!(pms[0].name, "Jane Smith");

    assert!(t.queries.users_by_city("Paris").unwrap().is_empty());
}

#[test]
fn users_by_age_range_includes_both_seeded_users() {
    let t = TestDb::seeded();
    let hits = t.queries.users_by_age_range(25, 35).unwrap();
    assert_eq!(hits.len(), 2);
    assert!(t.queries.users_by_age_range(29, 35).unwrap().len() == 1);
}

#[test]
fn interests_array_containment() {
    let t = TestDb::seeded();
    let gamers = t
        .queries
        .search::<User>(&Predicate::containment("profile", json!({"interests": ["gaming"]})))
        .unwrap();
    assert_eq!(gamers.len(), 1);
    assert_eq!(gamers[0].name, "John Doe");
}

#[test]
fn products_by_tag_and_nested_spec() {
    let t = TestDb::seeded();
    let android = t.queries.products_by_tag("android").unwrap();
    assert_eq!(android.len(), 1);
    assert_eq!(android[0].name, GALAXY);

    let hits = t
        .queries
        .search::<Product>(&Predicate::containment(
            "specifications",
            json!({"camera": {"telephoto": ["10MP"]}}),
        ))
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, GALAXY);
}

#[test]
fn products_price_range_reads_specifications() {
    let t = TestDb::seeded();
    // Seeded products keep their price in the relational column only.
    assert!(t.queries.products_by_price_range(0.0, 10_000.0).unwrap().is_empty());

    t.mutations
        .create(NewProduct::new("Cable", 9.5).with_specifications(json!({"price": 9.5})))
        .unwrap();
    let hits = t.queries.products_by_price_range(5.0, 10.0).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Cable");
}

#[test]
fn orders_by_item_city_status_and_total() {
    let t = TestDb::seeded();
    assert_eq!(t.queries.orders_by_product_name(HEADPHONES).unwrap().len(), 1);
    assert!(t.queries.orders_by_product_name(GALAXY).unwrap().is_empty());
    assert_eq!(t.queries.orders_by_shipping_city("San Francisco").unwrap().len(), 1);
    assert_eq!(t.queries.orders_by_status("shipped").unwrap().len(), 1);
    assert!(t.queries.orders_by_status("pending").unwrap().is_empty());
    assert_eq!(t.queries.orders_by_total_range(2899.98, 2899.98).unwrap().len(), 1);
    assert!(t.queries.orders_by_total_range(0.0, 100.0).unwrap().is_empty());
}

#[test]
fn order_items_reference_product_ids() {
    let t = TestDb::seeded();
    let macbook = t.product_named(MACBOOK);
    let orders = t
        .queries
        .search::<Order>(&Predicate::containment("items", json!([{"productId": macbook.id}])))
        .unwrap();
    assert_eq!(orders.len(), 1);
}

#[test]
fn indexed_and_unindexed_agree() {
    let indexed = TestDb::seeded();
    let plain = TestDb::unindexed();
    docfield::seed_demo(&plain.db).unwrap();

    let probes = [
        json!({"cpu": "Apple M2 Max"}),
        json!({"ports": ["HDMI"]}),
        json!({"camera": {"main": "200MP"}}),
        json!({}),
        json!({"color": "Beige"}),
    ];
    for probe in probes {
        let predicate = Predicate::containment("specifications", probe.clone());
        let a: Vec<String> = indexed
            .queries
            .search::<Product>(&predicate)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        let b: Vec<String> = plain
            .queries
            .search::<Product>(&predicate)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(a, b, "probe {probe}");
    }
}

#[test]
fn empty_probe_matches_every_row() {
    let t = TestDb::seeded();
    let all = t
        .queries
        .search::<User>(&Predicate::containment("preferences", json!({})))
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn wrong_column_category_is_rejected() {
    let t = TestDb::seeded();
    let err = t
        .queries
        .search::<Product>(&Predicate::relational("tags", RelationalFilter::equals("x")))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = t
        .queries
        .search::<Product>(&Predicate::containment("name", json!("x")))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = Predicate::path_range("profile", "a..b", ValueRange::at_least(1i64)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn text_contains_is_case_sensitive() {
    let t = TestDb::new();
    t.mutations.create(NewUser::new("a@x.io", "Alice Smith")).unwrap();
    t.mutations.create(NewUser::new("b@x.io", "bob smith")).unwrap();
    let hits = t
        .queries
        .search::<User>(&Predicate::relational("name", RelationalFilter::text_contains("Smith")))
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Alice Smith");
}

#[test]
fn search_sorted_orders_results() {
    let t = TestDb::seeded();
    let by_id: Vec<u64> = t
        .queries
        .search_sorted::<Product>(&Predicate::containment("metadata", json!({})), RecordOrder::ById)
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    let mut sorted = by_id.clone();
    sorted.sort_unstable();
    assert_eq!(by_id, sorted);
    assert_eq!(by_id.len(), 3);
}

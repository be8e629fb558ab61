//! Mutation service: patches, tags, order status

use crate::common::*;
use docfield::{
    ColumnValue, DocumentValue, ErrorKind, FieldPatch, NewProduct, NewUser, Order, Product, User,
};
use serde_json::json;

fn seeded_order(t: &TestDb) -> Order {
    t.queries.list::<Order>().unwrap().remove(0)
}

#[test]
fn replace_profile_bumps_version_and_updated_at() {
    let t = TestDb::seeded();
    let jane = t.queries.users_by_city("New York").unwrap().remove(0);

    let updated: User = t
        .mutations
        .apply_patch(
            jane.id,
            "profile",
            FieldPatch::Replace(json!({"age": 29, "occupation": "Director"}).into()),
        )
        .unwrap();
    assert_eq!(updated.version, jane.version + 1);
    assert!(updated.updated_at >= jane.updated_at);
    assert_eq!(updated.created_at, jane.created_at);
    assert_eq!(t.queries.users_by_profile("occupation", "Director").unwrap().len(), 1);
    assert!(t.queries.users_by_profile("occupation", "Product Manager").unwrap().is_empty());
}

#[test]
fn replace_with_wrong_shape_is_rejected() {
    let t = TestDb::seeded();
    let jane = t.queries.users_by_city("New York").unwrap().remove(0);
    let err = t
        .mutations
        .apply_patch::<User>(jane.id, "profile", FieldPatch::Replace(json!(["x"]).into()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    assert_eq!(t.queries.get::<User>(jane.id).unwrap().version, jane.version);
}

#[test]
fn set_operations_on_object_column_are_shape_errors() {
    let t = TestDb::seeded();
    let p = t.product_named(MACBOOK);
    let err = t
        .mutations
        .apply_patch::<Product>(p.id, "metadata", FieldPatch::InsertUniqueScalar("x".into()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
}

#[test]
fn generic_patches_cannot_break_the_tag_set() {
    let t = TestDb::seeded();
    let p = t.product_named(MACBOOK);

    let duplicate = FieldPatch::AppendArrayElement("laptop".into());
    let err = t.mutations.apply_patch::<Product>(p.id, "tags", duplicate).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let mixed = FieldPatch::Replace(json!(["a", "a", 1, {"x": 1}]).into());
    let err = t.mutations.apply_patch::<Product>(p.id, "tags", mixed).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = t
        .mutations
        .apply_patch::<Product>(p.id, "tags", FieldPatch::AppendArrayElement(json!({"x": 1}).into()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let stored = t.queries.get::<Product>(p.id).unwrap();
    assert_eq!(stored.version, p.version);
    assert_eq!(stored.tags, p.tags);

    let appended: Product = t
        .mutations
        .apply_patch(p.id, "tags", FieldPatch::AppendArrayElement("new".into()))
        .unwrap();
    assert_eq!(appended.tag_names().last(), Some(&"new"));
}

#[test]
fn draft_with_repeated_tags_is_rejected() {
    let t = TestDb::new();
    let mut draft = NewProduct::new("Cable", 9.99);
    draft.tags = json!(["usb", "usb"]).into();
    let err = t.mutations.create(draft).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(t.queries.list::<Product>().unwrap().is_empty());
}

#[test]
fn non_scalar_tag_operand_names_the_operand() {
    let t = TestDb::seeded();
    let p = t.product_named(MACBOOK);
    let err = t
        .mutations
        .apply_patch::<Product>(p.id, "tags", FieldPatch::InsertUniqueScalar(json!(["x"]).into()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    assert!(err.to_string().contains("operand must be a scalar, found array"));
}

#[test]
fn remove_tag_then_remove_again() {
    let t = TestDb::seeded();
    let p = t.product_named(HEADPHONES);

    let removed = t.mutations.remove_tag(p.id, "sony").unwrap();
    assert_eq!(removed.tag_names(), vec!["headphones", "wireless", "noise-cancelling"]);
    assert_eq!(removed.version, p.version + 1);

    let again = t.mutations.remove_tag(p.id, "sony").unwrap();
    assert_eq!(again.version, removed.version);
    assert_eq!(again.updated_at, removed.updated_at);
    assert!(t.queries.products_by_tag("sony").unwrap().is_empty());
}

#[test]
fn append_to_order_history_through_patch() {
    let t = TestDb::seeded();
    let order = seeded_order(&t);
    let note: DocumentValue = json!({"note": "left at door"}).into();
    let updated: Order = t
        .mutations
        .apply_patch(order.id, "orderHistory", FieldPatch::AppendArrayElement(note.clone()))
        .unwrap();
    let history = updated.order_history.as_array().unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[3], note);
}

#[test]
fn set_order_status_records_transition() {
    let t = TestDb::seeded();
    let order = seeded_order(&t);

    let delivered = t.mutations.set_order_status(order.id, "delivered").unwrap();
    assert_eq!(delivered.status, "delivered");
    assert_eq!(delivered.version, order.version + 1);

    let history = t.queries.order_history(order.id).unwrap();
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 4);
    let last = &entries[3];
    assert_eq!(last.get("from").and_then(|v| v.as_str()), Some("shipped"));
    assert_eq!(last.get("to").and_then(|v| v.as_str()), Some("delivered"));
    let ts = last.get("timestamp").and_then(|v| v.as_str()).unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    assert!(ts.ends_with('Z'));

    assert_eq!(t.queries.orders_by_status("delivered").unwrap().len(), 1);
}

#[test]
fn set_order_status_on_missing_order() {
    let t = TestDb::seeded();
    let err = t.mutations.set_order_status(9_999, "delivered").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn email_must_stay_unique() {
    let t = TestDb::seeded();
    let err = t
        .mutations
        .create(NewUser::new("john.doe@example.com", "Another John"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let jane = t.queries.users_by_city("New York").unwrap().remove(0);
    let err = t
        .mutations
        .set_column::<User>(jane.id, "email", ColumnValue::from("john.doe@example.com"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let renamed: User = t
        .mutations
        .set_column(jane.id, "email", ColumnValue::from("jane@example.org"))
        .unwrap();
    assert_eq!(renamed.email, "jane@example.org");
    t.mutations
        .create(NewUser::new("jane.smith@example.com", "Jane Again"))
        .unwrap();
}

#[test]
fn fixed_columns_cannot_be_set() {
    let t = TestDb::seeded();
    let order = seeded_order(&t);
    for column in ["id", "userId", "createdAt", "updatedAt"] {
        let err = t
            .mutations
            .set_column::<Order>(order.id, column, ColumnValue::Int(1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "column {column}");
    }
}

#[test]
fn order_status_cannot_bypass_history() {
    let t = TestDb::seeded();
    let order = seeded_order(&t);
    let err = t
        .mutations
        .set_column::<Order>(order.id, "status", ColumnValue::from("delivered"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let stored = t.queries.get::<Order>(order.id).unwrap();
    assert_eq!(stored.status, "shipped");
    assert_eq!(stored.version, order.version);
    assert_eq!(t.queries.order_history(order.id).unwrap().as_array().map(|h| h.len()), Some(3));
}

#[test]
fn non_finite_numbers_are_rejected() {
    let t = TestDb::seeded();
    let p = t.product_named(GALAXY);
    let nan = DocumentValue::single_entry("rating", f64::NAN);
    let err = t
        .mutations
        .apply_patch::<Product>(p.id, "metadata", FieldPatch::Replace(nan))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(t.queries.get::<Product>(p.id).unwrap().metadata, p.metadata);

    let draft = NewProduct::new("Cable", 1.0)
        .with_specifications(DocumentValue::single_entry("length", f64::INFINITY));
    assert_eq!(t.mutations.create(draft).unwrap_err().kind(), ErrorKind::Validation);
}

#[test]
fn oversized_documents_are_rejected() {
    let t = TestDb::seeded();
    let p = t.product_named(GALAXY);
    let mut deep = json!(1);
    for _ in 0..150 {
        deep = json!({ "n": deep });
    }
    let err = t
        .mutations
        .apply_patch::<Product>(p.id, "metadata", FieldPatch::Replace(deep.into()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn calls_after_shutdown_fail() {
    let t = TestDb::seeded();
    let p = t.product_named(GALAXY);
    t.db.shutdown().unwrap();
    assert_eq!(t.mutations.add_tag(p.id, "x").unwrap_err().kind(), ErrorKind::StoreUnavailable);
    assert_eq!(
        t.queries.products_by_tag("android").unwrap_err().kind(),
        ErrorKind::StoreUnavailable
    );
}

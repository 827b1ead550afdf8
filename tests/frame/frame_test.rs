//! Tests for the mutation API: notices, hard errors and persisted edits.

#[path = "../common/mod.rs"]
mod common;

use common::{orders, raw_frame, sales};
use qframe::prelude::*;
use qframe::validation::ValidationError;
use serde_json::json;

// =============================================================================
// Notices
// =============================================================================

#[test]
fn test_remove_unknown_field_is_a_notice() {
    let frame = raw_frame(orders()).remove(&["Part", "Nope"]);

    assert_eq!(
        frame.notices(),
        &[Notice::UnknownField {
            operation: "remove",
            field: "Nope".into()
        }]
    );
    assert!(!frame.document().unwrap().fields.contains_key("Part"));
}

#[test]
fn test_select_skips_unknown_and_hidden_fields() {
    let value = json!({
        "select": {
            "fields": {
                "customer": {"type": "dim"},
                "secret": {"type": "dim", "select": 0}
            },
            "table": "accounts"
        }
    });
    let mut frame = raw_frame(value).select(&["customer", "secret", "ghost"]);

    assert_eq!(
        frame.notices(),
        &[
            Notice::HiddenField {
                operation: "select",
                field: "secret".into()
            },
            Notice::UnknownField {
                operation: "select",
                field: "ghost".into()
            },
        ]
    );
    assert_eq!(
        frame.get_sql(),
        "SELECT sq.customer as customer FROM (SELECT customer FROM accounts) sq"
    );
}

#[test]
fn test_agg_unknown_field_is_a_notice() {
    let frame = raw_frame(orders())
        .fields(&["Value", "Missing"])
        .agg(Aggregation::Count)
        .unwrap();

    assert_eq!(frame.notices().len(), 1);
    assert_eq!(frame.notices()[0].operation(), "agg");
    assert_eq!(
        frame.document().unwrap().fields["Value"].aggregation(),
        Some(Aggregation::Count)
    );
}

#[test]
fn test_where_on_union_is_a_notice() {
    let frame = union(
        vec![raw_frame(sales()), raw_frame(sales())],
        &[UnionType::Union],
    )
    .unwrap()
    .filter("amount > 0")
    .distinct();

    let ops: Vec<_> = frame.notices().iter().map(Notice::operation).collect();
    assert_eq!(ops, vec!["where", "distinct"]);
    let doc = frame.document().unwrap();
    assert_eq!(doc.filter, None);
    assert!(!doc.distinct);
}

#[test]
fn test_notices_render_readably() {
    let notice = Notice::UnknownField {
        operation: "remove",
        field: "Nope".into(),
    };
    assert_eq!(notice.to_string(), "remove: field 'Nope' not found, skipped");
}

// =============================================================================
// Hard errors
// =============================================================================

#[test]
fn test_group_by_on_union_fails() {
    let frame = union(
        vec![raw_frame(sales()), raw_frame(sales())],
        &[UnionType::Union],
    )
    .unwrap();

    let err = frame.group_by(&["customer"]).unwrap_err();
    assert!(matches!(
        err,
        FrameError::UnionSourced {
            operation: "group_by"
        }
    ));
}

#[test]
fn test_agg_on_dimension_leaves_frame_unchanged() {
    let frame = raw_frame(orders()).fields(&["Value", "Customer"]);
    let before = frame.document().cloned();

    let err = frame.clone().agg(Aggregation::Sum).unwrap_err();
    match err {
        FrameError::Validation(ValidationError::AggregationTypeMismatch { field, aggregation }) => {
            assert_eq!(field, "Customer");
            assert_eq!(aggregation, "sum");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(frame.document().cloned(), before);
}

#[test]
fn test_assign_aggregated_dimension_fails() {
    let result = raw_frame(orders()).assign(
        FieldType::Dimension,
        Some(GroupBy::Aggregate(Aggregation::Sum)),
        &[("Label", "'x'")],
    );
    assert!(matches!(
        result,
        Err(FrameError::Validation(
            ValidationError::AggregationTypeMismatch { .. }
        ))
    ));
}

#[test]
fn test_order_by_arity() {
    let err = raw_frame(orders())
        .order_by(&["Order", "Part"], &[true])
        .unwrap_err();
    assert!(matches!(
        err,
        FrameError::OrderArity {
            keys: 2,
            ascending: 1
        }
    ));
}

#[test]
fn test_join_arity_checked_first() {
    let err = join(
        vec![raw_frame(sales()), QFrame::new()],
        &[JoinType::Inner, JoinType::Left],
        &["sq1.customer = sq2.customer"],
        false,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        FrameError::JoinArity {
            documents: 2,
            join_types: 2,
            conditions: 1
        }
    ));
}

#[test]
fn test_union_arity() {
    let err = union(vec![raw_frame(sales())], &[UnionType::Union]).unwrap_err();
    assert!(matches!(
        err,
        FrameError::UnionArity {
            documents: 1,
            union_types: 1
        }
    ));
}

#[test]
fn test_join_with_empty_frame_fails() {
    let err = join(
        vec![raw_frame(sales()), QFrame::new()],
        &[JoinType::Inner],
        &["0"],
        false,
    )
    .unwrap_err();
    assert!(matches!(err, FrameError::EmptyFrame { operation: "join" }));
}

#[test]
fn test_invalid_json_rejected() {
    let err = QFrame::from_json(r#"{"select": {"fields": {}, "table": 5}}"#).unwrap_err();
    assert!(matches!(
        err,
        FrameError::Validation(ValidationError::InvalidClause { .. })
    ));
}

// =============================================================================
// Round trips
// =============================================================================

#[test]
fn test_edited_frame_round_trips_through_json() {
    let mut frame = raw_frame(orders())
        .rename(&[("Part", "Part Number")])
        .group_by(&["Customer"])
        .unwrap()
        .fields(&["Value"])
        .agg(Aggregation::Min)
        .unwrap()
        .limit(20);

    let json = frame.to_json().unwrap();
    let mut reloaded = QFrame::from_json(&json)
        .unwrap()
        .with_settings(Settings::raw());

    assert_eq!(reloaded.get_sql(), frame.get_sql());
    assert_eq!(reloaded.document(), frame.document());
}

#[test]
fn test_empty_frame() {
    let mut frame = QFrame::new();
    assert!(frame.is_empty());
    assert_eq!(frame.get_sql(), "");
    assert_eq!(frame.to_value().unwrap(), json!({}));
    assert!(frame.sql_blocks().is_none());
}

#[test]
fn test_sql_blocks_follow_rendered_node() {
    let mut frame = raw_frame(orders()).select(&["Order", "Value"]);
    let blocks = frame.sql_blocks().unwrap();

    assert_eq!(blocks.select_aliases, vec!["Bookings", "Value"]);
    assert_eq!(blocks.types, vec!["VARCHAR(500)", "FLOAT(53)"]);
}

#[test]
fn test_create_table_and_insert_from_frame() {
    let mut frame = raw_frame(sales())
        .group_by(&["customer"])
        .unwrap()
        .fields(&["amount"])
        .agg(Aggregation::Sum)
        .unwrap()
        .remove(&["region"]);

    assert_eq!(
        frame.create_table_sql("summary", Some("reporting")).unwrap(),
        "CREATE TABLE reporting.summary (customer VARCHAR(500), amount FLOAT(53))"
    );
    assert_eq!(
        frame.insert_into_sql("summary", None).unwrap(),
        "INSERT INTO summary (customer, amount) \
         SELECT customer, SUM(amount) as amount FROM dbo.sales GROUP BY customer"
    );
}

#[test]
fn test_create_table_needs_a_query() {
    let err = QFrame::new().create_table_sql("t", None).unwrap_err();
    assert!(matches!(
        err,
        FrameError::EmptyFrame {
            operation: "create_table"
        }
    ));
}

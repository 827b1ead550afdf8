//! Tests for document conversion and persisted layout.

#[path = "../common/mod.rs"]
mod common;

use qframe::model::{Document, JoinType, Source, UnionType};
use serde_json::json;

#[test]
fn test_table_document() {
    let doc = Document::from_value(common::sales()).unwrap();

    match &doc.source {
        Source::Table(table) => {
            assert_eq!(table.schema.as_deref(), Some("dbo"));
            assert_eq!(table.table, "sales");
        }
        other => panic!("expected table source, got {}", other.kind()),
    }
    let keys: Vec<_> = doc.fields.keys().cloned().collect();
    assert_eq!(keys, vec!["customer", "region", "amount"]);
}

#[test]
fn test_flat_block_accepted() {
    let doc = Document::from_value(json!({
        "fields": {"customer": {"type": "dim"}},
        "table": "sales",
        "limit": "10"
    }))
    .unwrap();

    assert_eq!(doc.limit, Some(10));
    assert!(matches!(doc.source, Source::Table(_)));
}

#[test]
fn test_nested_join_and_union() {
    let value = json!({
        "select": {
            "fields": {"sq1.id": {"type": "dim", "as": "id"}},
            "join": {"join_type": ["left join", "cross join"], "on": ["sq1.id = sq2.id", 0]}
        },
        "sq1": {"select": {"fields": {"id": {"type": "dim"}}, "table": "a"}},
        "sq2": {
            "select": {
                "fields": {"id": {"type": "dim"}},
                "union": {"union_type": ["union all"]}
            },
            "sq1": {"select": {"fields": {"id": {"type": "dim"}}, "table": "b1"}},
            "sq2": {"select": {"fields": {"id": {"type": "dim"}}, "table": "b2"}}
        },
        "sq3": {"select": {"fields": {"id": {"type": "dim"}}, "table": "c"}}
    });

    let doc = Document::from_value(value).unwrap();
    let Source::Join(join) = &doc.source else {
        panic!("expected join source");
    };
    assert_eq!(join.joins.len(), 2);
    assert_eq!(join.joins[0].join_type, JoinType::Left);
    assert_eq!(join.joins[0].on.as_deref(), Some("sq1.id = sq2.id"));
    assert_eq!(join.joins[1].join_type, JoinType::Cross);
    assert_eq!(join.joins[1].on, None);

    let Source::Union(union) = &join.joins[0].query.source else {
        panic!("expected union source");
    };
    assert_eq!(union.members[0].union_type, UnionType::UnionAll);
    assert_eq!(doc.node_count(), 6);
}

#[test]
fn test_value_round_trip_preserves_rendering() {
    let value = json!({
        "select": {
            "fields": {
                "sq.customer": {"type": "dim", "as": "customer", "group_by": "group"},
                "sq.amount": {"type": "num", "as": "amount", "group_by": "sum", "order_by": "DESC"}
            },
            "where": "sq.amount > 0",
            "having": "SUM(sq.amount) > 100",
            "distinct": 1,
            "limit": "5"
        },
        "sq": common::sales()
    });

    let doc = Document::from_value(value).unwrap();
    let again = Document::from_value(doc.to_value().unwrap()).unwrap();

    assert_eq!(again, doc);
    assert_eq!(again.to_sql(), doc.to_sql());
}

#[test]
fn test_to_value_layout() {
    let doc = Document::from_value(common::sales()).unwrap();
    assert_eq!(
        doc.to_value().unwrap(),
        json!({
            "select": {
                "fields": {
                    "customer": {"type": "dim"},
                    "region": {"type": "dim", "as": "sales_region"},
                    "amount": {"type": "num"}
                },
                "schema": "dbo",
                "table": "sales"
            }
        })
    );
}

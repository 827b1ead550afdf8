//! Tests for the SQL compiler, reformat pass and DDL/DML statements.

use qframe::config::FormatSettings;
use qframe::model::{
    Document, Field, Fields, Join, JoinSource, JoinType, Source, TableRef, UnionMember,
    UnionSource, UnionType,
};
use qframe::sql::{delete_where_sql, format_sql, CreateTable, ColumnDef, Insert};

fn table(name: &str, columns: &[&str]) -> Document {
    let mut fields = Fields::new();
    for column in columns {
        fields.insert(column.to_string(), Field::dim());
    }
    Document::from_table(TableRef::new(name), fields)
}

fn squash(sql: &str) -> String {
    sql.split_whitespace().collect::<String>().to_lowercase()
}

#[test]
fn test_join_compiles_with_numbered_aliases() {
    let mut fields = Fields::new();
    fields.insert("sq1.id".into(), Field::dim().with_alias("id"));
    fields.insert("sq2.name".into(), Field::dim().with_alias("name"));

    let doc = Document::new(
        fields,
        Source::Join(JoinSource {
            left: Box::new(table("a", &["id"])),
            joins: vec![Join {
                join_type: JoinType::Inner,
                on: Some("sq1.id = sq2.id".into()),
                query: table("b", &["id", "name"]),
            }],
        }),
    );

    insta::assert_snapshot!(doc.to_sql(), @"SELECT sq1.id as id, sq2.name as name FROM (SELECT id FROM a) sq1 JOIN (SELECT id, name FROM b) sq2 ON sq1.id = sq2.id");
}

#[test]
fn test_union_compiles_members_in_order() {
    let doc = Document::new(
        Fields::new(),
        Source::Union(UnionSource {
            first: Box::new(table("a", &["id"])),
            members: vec![
                UnionMember {
                    union_type: UnionType::Union,
                    query: table("b", &["id"]),
                },
                UnionMember {
                    union_type: UnionType::UnionAll,
                    query: table("c", &["id"]),
                },
            ],
        }),
    );

    assert_eq!(
        doc.to_sql(),
        "SELECT id FROM a UNION SELECT id FROM b UNION ALL SELECT id FROM c"
    );
}

#[test]
fn test_nested_subqueries() {
    let inner = table("events", &["kind"]);
    let mut middle_fields = Fields::new();
    middle_fields.insert("sq.kind".into(), Field::dim().with_alias("kind"));
    let middle = Document::new(middle_fields, Source::Subquery(Box::new(inner)));
    let mut outer_fields = Fields::new();
    outer_fields.insert("sq.kind".into(), Field::dim().with_alias("kind"));
    let outer = Document::new(outer_fields, Source::Subquery(Box::new(middle)));

    assert_eq!(
        outer.to_sql(),
        "SELECT sq.kind as kind FROM (SELECT sq.kind as kind FROM (SELECT kind FROM events) sq) sq"
    );
    assert_eq!(outer.node_count(), 3);
}

#[test]
fn test_format_preserves_tokens() {
    let sql = "SELECT customer, SUM(amount) as amount FROM dbo.sales WHERE amount > 0 GROUP BY customer";
    let formatted = format_sql(sql, &FormatSettings::default());

    assert!(formatted.lines().count() > 1, "{}", formatted);
    assert_eq!(squash(&formatted), squash(sql));
}

#[test]
fn test_format_disabled_is_identity() {
    let settings = FormatSettings {
        enabled: false,
        ..FormatSettings::default()
    };
    let sql = "select a from t";
    assert_eq!(format_sql(sql, &settings), sql);
    assert_eq!(format_sql("", &FormatSettings::default()), "");
}

#[test]
fn test_create_table_and_insert() {
    let create = CreateTable::new("summary")
        .schema("reporting")
        .columns([
            ColumnDef::new("customer", "VARCHAR(500)"),
            ColumnDef::new("amount", "FLOAT(53)"),
        ])
        .to_sql();
    assert_eq!(
        create,
        "CREATE TABLE reporting.summary (customer VARCHAR(500), amount FLOAT(53))"
    );

    let insert = Insert::into("summary")
        .columns(["customer", "amount"])
        .from_select("SELECT customer, amount FROM dbo.sales")
        .to_sql();
    assert_eq!(
        insert,
        "INSERT INTO summary (customer, amount) SELECT customer, amount FROM dbo.sales"
    );
}

#[test]
fn test_delete_where_per_condition() {
    let statements = delete_where_sql("sales", Some("dbo"), &["year = 2019", "year = 2020"]);
    assert_eq!(
        statements,
        vec![
            "DELETE FROM dbo.sales WHERE year = 2019",
            "DELETE FROM dbo.sales WHERE year = 2020"
        ]
    );
}

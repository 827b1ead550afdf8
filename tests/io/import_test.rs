//! Tests for building documents from column spreadsheets.

use qframe::config::Settings;
use qframe::import::{self, ImportError};
use qframe::model::{Aggregation, FieldType, Source};
use qframe::QFrame;
use std::io::Write;
use tempfile::NamedTempFile;

const COLUMNS: &str = "\
column,column_as,column_type,group_by,expression,select,custom_type,schema,table
Order,Order Number,dim,group,,,,sales,Orders
Customer,,dim,group,,,,,
Value,,num,sum,,,DECIMAL(18 2),,
Internal,,dim,,,0,,,
";

#[test]
fn test_read_columns() {
    let doc = import::read_columns(COLUMNS.as_bytes()).unwrap();

    let Source::Table(table) = &doc.source else {
        panic!("expected table source");
    };
    assert_eq!(table.to_string(), "sales.Orders");

    let order = &doc.fields["Order"];
    assert_eq!(order.alias.as_deref(), Some("Order_Number"));
    assert_eq!(order.field_type, FieldType::Dimension);
    assert_eq!(doc.fields["Value"].aggregation(), Some(Aggregation::Sum));
    assert_eq!(
        doc.fields["Value"].custom_type.as_deref(),
        Some("DECIMAL(18 2)")
    );
    assert!(!doc.fields["Internal"].is_visible());
}

#[test]
fn test_imported_document_renders() {
    let doc = import::read_columns(COLUMNS.as_bytes()).unwrap();
    let mut frame = QFrame::from_document(doc)
        .unwrap()
        .with_settings(Settings::raw());

    assert_eq!(
        frame.get_sql(),
        "SELECT Order as Order_Number, Customer, SUM(Value) as Value FROM sales.Orders \
         GROUP BY Order_Number, Customer"
    );
}

#[test]
fn test_read_columns_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(COLUMNS.as_bytes()).unwrap();

    let doc = import::read_columns_csv(file.path()).unwrap();
    assert_eq!(doc.fields.len(), 4);
}

#[test]
fn test_empty_file() {
    let header = "column,column_as,column_type,group_by,expression,select,custom_type,schema,table\n";
    let err = import::read_columns(header.as_bytes()).unwrap_err();
    assert!(matches!(err, ImportError::Empty));
}

#[test]
fn test_row_without_column_name() {
    let csv = "column,column_type,table\nOrder,dim,Orders\n,num,\n";
    let err = import::read_columns(csv.as_bytes()).unwrap_err();
    assert!(matches!(err, ImportError::MissingColumn { row: 2 }));
}

#[test]
fn test_invalid_row_fails_validation() {
    let csv = "column,column_type,group_by,table\nOrder,dim,sum,Orders\n";
    let err = import::read_columns(csv.as_bytes()).unwrap_err();
    assert!(matches!(err, ImportError::Validation(_)));
}

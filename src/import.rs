//! Import of column metadata exported from a spreadsheet.
//!
//! One row per field:
//!
//! | column | column_as | column_type | group_by | expression | select | custom_type | schema | table |
//! |--------|-----------|-------------|----------|------------|--------|-------------|--------|-------|
//!
//! `schema` and `table` are read from the first row only. Empty cells mean
//! "attribute not set".

use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::io::Read;
use std::path::Path;

use crate::model::Document;
use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Failed to read column file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column file has no rows")]
    Empty,

    #[error("Row {row} has no column name")]
    MissingColumn { row: usize },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type ImportResult<T> = Result<T, ImportError>;

/// One spreadsheet row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnRow {
    pub column: String,
    pub column_as: String,
    pub column_type: String,
    pub group_by: String,
    pub expression: String,
    pub select: String,
    pub custom_type: String,
    pub schema: String,
    pub table: String,
}

impl ColumnRow {
    fn attributes(&self) -> Map<String, Value> {
        let mut attrs = Map::new();
        let pairs = [
            ("type", &self.column_type),
            ("as", &self.column_as),
            ("group_by", &self.group_by),
            ("expression", &self.expression),
            ("select", &self.select),
            ("custom_type", &self.custom_type),
        ];
        for (key, value) in pairs {
            let value = value.trim();
            if !value.is_empty() {
                attrs.insert(key.to_string(), Value::String(value.to_string()));
            }
        }
        attrs
    }
}

/// Build a `fields` mapping from parsed rows, in row order.
pub fn fields_from_rows(rows: &[ColumnRow]) -> ImportResult<Map<String, Value>> {
    let mut fields = Map::new();
    for (i, row) in rows.iter().enumerate() {
        let column = row.column.trim();
        if column.is_empty() {
            return Err(ImportError::MissingColumn { row: i + 1 });
        }
        fields.insert(column.to_string(), Value::Object(row.attributes()));
    }
    Ok(fields)
}

/// Build and validate a table-sourced document from parsed rows.
pub fn document_from_rows(rows: &[ColumnRow]) -> ImportResult<Document> {
    let first = rows.first().ok_or(ImportError::Empty)?;
    let mut block = Map::new();
    block.insert("fields".into(), Value::Object(fields_from_rows(rows)?));
    block.insert("table".into(), Value::String(first.table.trim().to_string()));
    if !first.schema.trim().is_empty() {
        block.insert("schema".into(), Value::String(first.schema.trim().to_string()));
    }
    Ok(Document::from_value(json!({ "select": block }))?)
}

/// Read rows from CSV text with a header line.
pub fn read_columns<R: Read>(reader: R) -> ImportResult<Document> {
    let csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    document_from_csv(csv_reader)
}

pub fn read_columns_csv(path: impl AsRef<Path>) -> ImportResult<Document> {
    let csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    document_from_csv(csv_reader)
}

fn document_from_csv<R: Read>(mut csv_reader: csv::Reader<R>) -> ImportResult<Document> {
    let rows = csv_reader
        .deserialize::<ColumnRow>()
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!("read {} column row(s)", rows.len());
    document_from_rows(&rows)
}

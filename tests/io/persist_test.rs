//! Tests for saving and loading query documents.

#[path = "../common/mod.rs"]
mod common;

use common::{orders, raw_frame, sales};
use qframe::persist::{self, PersistError};
use qframe::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

#[test]
fn test_save_and_load_unlabelled() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("query.json");

    let mut frame = raw_frame(orders())
        .group_by(&["Customer"])
        .unwrap()
        .fields(&["Value"])
        .agg(Aggregation::Sum)
        .unwrap();
    frame.save(&path, None).unwrap();

    let mut loaded = QFrame::load(&path, None)
        .unwrap()
        .with_settings(Settings::raw());
    assert_eq!(loaded.get_sql(), frame.get_sql());
}

#[test]
fn test_labels_share_one_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("queries.json");

    raw_frame(orders()).save(&path, Some("orders")).unwrap();
    raw_frame(sales()).save(&path, Some("sales")).unwrap();

    let stored: Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let labels: Vec<_> = stored.as_object().unwrap().keys().cloned().collect();
    assert_eq!(labels, vec!["orders", "sales"]);

    let doc = persist::load(&path, Some("sales")).unwrap();
    assert_eq!(doc.fields.len(), 3);
    assert_eq!(doc.source.kind(), "table");
}

#[test]
fn test_resaving_a_label_replaces_it() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("queries.json");

    raw_frame(sales()).save(&path, Some("q")).unwrap();
    raw_frame(sales())
        .remove(&["region"])
        .save(&path, Some("q"))
        .unwrap();

    let doc = persist::load(&path, Some("q")).unwrap();
    assert!(!doc.fields.contains_key("region"));
}

#[test]
fn test_missing_label() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("queries.json");
    raw_frame(sales()).save(&path, Some("sales")).unwrap();

    let err = persist::load(&path, Some("orders")).unwrap_err();
    assert!(matches!(err, PersistError::LabelNotFound { ref label, .. } if label == "orders"));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = QFrame::load(dir.path().join("nope.json"), None).unwrap_err();
    assert!(matches!(
        err,
        FrameError::Persist(PersistError::FileNotFound(_))
    ));
}

#[test]
fn test_stored_document_is_validated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(
        &path,
        json!({"select": {"fields": {"a": {"type": "dim", "group_by": "sum"}}, "table": "t"}})
            .to_string(),
    )
    .unwrap();

    let err = persist::load(&path, None).unwrap_err();
    assert!(matches!(err, PersistError::Validation(_)));
}

#[test]
fn test_label_into_non_object_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("list.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    let err = persist::save_value(&path, &json!({}), Some("q")).unwrap_err();
    assert!(matches!(err, PersistError::NotAnObject(_)));
}

//! JSON file persistence for query documents.
//!
//! Without a label a file holds one document. With a label the file is an
//! object of `label -> document`; saving one label keeps the others.

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::Document;
use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Query file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to access query file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse query file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Label '{label}' not found in {path}")]
    LabelNotFound { path: PathBuf, label: String },

    #[error("Query file {0} does not hold a JSON object")]
    NotAnObject(PathBuf),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type PersistResult<T> = Result<T, PersistError>;

/// Write a document's JSON layout, optionally under `label`.
pub fn save(path: impl AsRef<Path>, document: &Document, label: Option<&str>) -> PersistResult<()> {
    save_value(path, &document.to_value()?, label)
}

/// Read and validate a document, optionally by `label`.
pub fn load(path: impl AsRef<Path>, label: Option<&str>) -> PersistResult<Document> {
    let value = load_value(path, label)?;
    Ok(Document::from_value(value)?)
}

pub fn save_value(path: impl AsRef<Path>, value: &Value, label: Option<&str>) -> PersistResult<()> {
    let path = path.as_ref();
    let out = match label {
        None => value.clone(),
        Some(label) => {
            let mut store = if path.exists() {
                match read_json(path)? {
                    Value::Object(map) => map,
                    _ => return Err(PersistError::NotAnObject(path.to_path_buf())),
                }
            } else {
                Map::new()
            };
            store.insert(label.to_string(), value.clone());
            Value::Object(store)
        }
    };

    fs::write(path, serde_json::to_string_pretty(&out)?)?;
    log::debug!(
        "saved query to {}{}",
        path.display(),
        label.map(|l| format!(" [{}]", l)).unwrap_or_default()
    );
    Ok(())
}

/// Read a stored JSON layout without validating it.
pub fn load_value(path: impl AsRef<Path>, label: Option<&str>) -> PersistResult<Value> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PersistError::FileNotFound(path.to_path_buf()));
    }
    let value = read_json(path)?;
    match label {
        None => Ok(value),
        Some(label) => match value {
            Value::Object(mut map) => map.remove(label).ok_or_else(|| PersistError::LabelNotFound {
                path: path.to_path_buf(),
                label: label.to_string(),
            }),
            _ => Err(PersistError::NotAnObject(path.to_path_buf())),
        },
    }
}

fn read_json(path: &Path) -> PersistResult<Value> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

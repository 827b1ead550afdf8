//! Conversion between the persisted JSON layout and typed documents.
//!
//! The persisted layout keeps each query block under `select` and its
//! children as sibling keys:
//!
//! ```json
//! {
//!   "select": {"fields": {...}, "join": {"join_type": ["LEFT JOIN"], "on": ["..."]}},
//!   "sq1": {"select": {...}},
//!   "sq2": {"select": {...}}
//! }
//! ```
//!
//! A single-level query may also be given flat, without the `select` wrapper.

use serde_json::{Map, Value};

use super::document::{
    Document, Fields, Join, JoinSource, JoinType, Source, TableRef, UnionMember, UnionSource,
    UnionType,
};
use super::field::Field;
use crate::validation::{self, ValidationError, ValidationResult};

impl Document {
    /// Validate and convert a JSON document.
    pub fn from_value(mut value: Value) -> ValidationResult<Self> {
        validation::validate(&mut value)?;
        if validation::is_wrapped(&value) {
            node_from_value(&value, "select")
        } else {
            let block = value
                .as_object()
                .ok_or_else(|| ValidationError::NotAnObject { path: "$".into() })?;
            let table = table_from_block(block).ok_or_else(|| ValidationError::MissingSource {
                path: "$".into(),
            })?;
            block_into_document(block, Source::Table(table), "$")
        }
    }

    /// The wrapped JSON layout of this document.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        let mut node = Map::new();
        write_node(self, &mut node)?;
        Ok(Value::Object(node))
    }
}

// =============================================================================
// JSON -> Document
// =============================================================================

fn node_from_value(node: &Value, path: &str) -> ValidationResult<Document> {
    let obj = node
        .as_object()
        .ok_or_else(|| ValidationError::NotAnObject { path: path.into() })?;
    let block = obj
        .get("select")
        .and_then(Value::as_object)
        .ok_or_else(|| ValidationError::NotAnObject {
            path: format!("{}.select", path),
        })?;

    let child = |key: String| -> ValidationResult<Document> {
        let value = obj.get(&key).ok_or_else(|| ValidationError::MissingSubquery {
            path: path.into(),
            key: key.clone(),
        })?;
        node_from_value(value, &format!("{}.{}", path, key))
    };
    let malformed = |message: String| ValidationError::Malformed {
        path: path.into(),
        message,
    };

    let source = if let Some(union) = block.get("union") {
        let types = parse_list::<UnionType>(union, "union_type").map_err(malformed)?;
        let first = child("sq1".into())?;
        let members = types
            .into_iter()
            .enumerate()
            .map(|(i, union_type)| {
                Ok(UnionMember {
                    union_type,
                    query: child(format!("sq{}", i + 2))?,
                })
            })
            .collect::<ValidationResult<Vec<_>>>()?;
        Source::Union(UnionSource {
            first: Box::new(first),
            members,
        })
    } else if let Some(join) = block.get("join") {
        let types = parse_list::<JoinType>(join, "join_type").map_err(malformed)?;
        let conditions = join
            .get("on")
            .and_then(Value::as_array)
            .ok_or_else(|| malformed("join has no 'on' list".into()))?;
        let left = child("sq1".into())?;
        let joins = types
            .into_iter()
            .zip(conditions)
            .enumerate()
            .map(|(i, (join_type, on))| {
                Ok(Join {
                    join_type,
                    on: join_condition(on),
                    query: child(format!("sq{}", i + 2))?,
                })
            })
            .collect::<ValidationResult<Vec<_>>>()?;
        Source::Join(JoinSource {
            left: Box::new(left),
            joins,
        })
    } else if let Some(table) = table_from_block(block) {
        Source::Table(table)
    } else {
        Source::Subquery(Box::new(child("sq".into())?))
    };

    block_into_document(block, source, path)
}

fn block_into_document(
    block: &Map<String, Value>,
    source: Source,
    path: &str,
) -> ValidationResult<Document> {
    let fields = match block.get("fields") {
        Some(Value::Object(fields)) => fields_from_map(fields, path)?,
        Some(_) => {
            return Err(ValidationError::NotAnObject {
                path: format!("{}.fields", path),
            })
        }
        None => return Err(ValidationError::MissingFields { path: path.into() }),
    };

    let limit = match block.get("limit") {
        Some(value) => validation::parse_limit(value).map_err(|_| ValidationError::InvalidLimit {
            value: value.to_string(),
        })?,
        None => None,
    };

    Ok(Document {
        fields,
        source,
        filter: text(block, "where"),
        having: text(block, "having"),
        distinct: validation::is_distinct(block.get("distinct")),
        limit,
    })
}

/// Convert a validated field map. Empty-string attributes mean "absent".
pub(crate) fn fields_from_map(map: &Map<String, Value>, path: &str) -> ValidationResult<Fields> {
    let mut fields = Fields::with_capacity(map.len());
    for (name, value) in map {
        let mut attrs = value.as_object().cloned().ok_or_else(|| ValidationError::NotAnObject {
            path: format!("{}.fields.{}", path, name),
        })?;
        attrs.retain(|_, v| !is_blank(v));
        let field: Field =
            serde_json::from_value(Value::Object(attrs)).map_err(|e| ValidationError::Malformed {
                path: format!("{}.fields.{}", path, name),
                message: e.to_string(),
            })?;
        fields.insert(name.clone(), field);
    }
    Ok(fields)
}

fn table_from_block(block: &Map<String, Value>) -> Option<TableRef> {
    let table = text(block, "table")?;
    let table = TableRef::new(table);
    Some(match text(block, "schema") {
        Some(schema) => table.with_schema(schema),
        None => table,
    })
}

fn parse_list<T: std::str::FromStr>(block: &Value, key: &str) -> Result<Vec<T>, String>
where
    T::Err: std::fmt::Display,
{
    block
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| format!("'{}' must be a list", key))?
        .iter()
        .map(|v| {
            v.as_str()
                .ok_or_else(|| format!("'{}' entries must be strings", key))?
                .parse::<T>()
                .map_err(|e| e.to_string())
        })
        .collect()
}

/// `0`, `"0"` and empty conditions mean "no ON clause".
fn join_condition(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.trim().is_empty() || s.trim() == "0" => None,
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn text(block: &Map<String, Value>, key: &str) -> Option<String> {
    match block.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

// =============================================================================
// Document -> JSON
// =============================================================================

fn write_node(doc: &Document, node: &mut Map<String, Value>) -> serde_json::Result<()> {
    let mut block = Map::new();
    block.insert("fields".into(), serde_json::to_value(&doc.fields)?);

    match &doc.source {
        Source::Table(table) => {
            if let Some(schema) = &table.schema {
                block.insert("schema".into(), Value::String(schema.clone()));
            }
            block.insert("table".into(), Value::String(table.table.clone()));
        }
        Source::Subquery(inner) => {
            node.insert("sq".into(), inner.to_value()?);
        }
        Source::Join(join) => {
            let join_types: Vec<Value> = join
                .joins
                .iter()
                .map(|j| Value::String(j.join_type.to_string()))
                .collect();
            let on: Vec<Value> = join
                .joins
                .iter()
                .map(|j| Value::String(j.on.clone().unwrap_or_else(|| "0".into())))
                .collect();
            block.insert(
                "join".into(),
                serde_json::json!({"join_type": join_types, "on": on}),
            );
            node.insert("sq1".into(), join.left.to_value()?);
            for (i, j) in join.joins.iter().enumerate() {
                node.insert(format!("sq{}", i + 2), j.query.to_value()?);
            }
        }
        Source::Union(union) => {
            let union_types: Vec<Value> = union
                .members
                .iter()
                .map(|m| Value::String(m.union_type.to_string()))
                .collect();
            block.insert(
                "union".into(),
                serde_json::json!({ "union_type": union_types }),
            );
            node.insert("sq1".into(), union.first.to_value()?);
            for (i, m) in union.members.iter().enumerate() {
                node.insert(format!("sq{}", i + 2), m.query.to_value()?);
            }
        }
    }

    if let Some(filter) = &doc.filter {
        block.insert("where".into(), Value::String(filter.clone()));
    }
    if let Some(having) = &doc.having {
        block.insert("having".into(), Value::String(having.clone()));
    }
    if doc.distinct {
        block.insert("distinct".into(), Value::from(1));
    }
    if let Some(limit) = doc.limit {
        block.insert("limit".into(), Value::String(limit.to_string()));
    }

    node.insert("select".into(), Value::Object(block));
    Ok(())
}

//! Validation of query documents.
//!
//! Runs on the raw JSON form before it is converted into typed
//! [`crate::model::Document`]s. The only rewrite performed is alias
//! whitespace normalization; every other problem is reported as the first
//! failing check.

use serde_json::{Map, Value};

use crate::model::field::normalize_alias;
use crate::model::{Aggregation, FieldType, GroupBy, JoinType, SortOrder, UnionType};

/// Attributes a field descriptor may carry.
pub const FIELD_ATTRIBUTES: &[&str] = &[
    "type",
    "as",
    "group_by",
    "expression",
    "select",
    "custom_type",
    "order_by",
];

/// Validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A query block without a `fields` mapping.
    MissingFields { path: String },
    /// No table, join, union or subquery to read from.
    MissingSource { path: String },
    /// A child query (`sq`, `sqN`) the row source refers to is absent.
    MissingSubquery { path: String, key: String },
    /// Something that should be a JSON object is not.
    NotAnObject { path: String },
    UnknownAttribute { field: String, attribute: String },
    MissingType { field: String },
    InvalidType { field: String, value: String },
    InvalidAggregation { field: String, value: String },
    /// An aggregate on a non-numeric field.
    AggregationTypeMismatch { field: String, aggregation: String },
    InvalidOrder { field: String, value: String },
    InvalidVisibility { field: String, value: String },
    /// A string attribute (`as`, `expression`, ...) holding a non-string.
    InvalidAttributeValue { field: String, attribute: String },
    InvalidDistinct { value: String },
    InvalidLimit { value: String },
    /// A block-level text entry (`where`, `table`, ...) holding a non-string.
    InvalidClause { clause: String, value: String },
    InvalidJoin { path: String, reason: String },
    InvalidUnion { path: String, reason: String },
    /// Well-formed JSON that still failed typed conversion.
    Malformed { path: String, message: String },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingFields { path } => {
                write!(f, "Query '{}' has no fields", path)
            }
            ValidationError::MissingSource { path } => {
                write!(
                    f,
                    "Query '{}' has no table, join, union or subquery to select from",
                    path
                )
            }
            ValidationError::MissingSubquery { path, key } => {
                write!(f, "Query '{}' references missing subquery '{}'", path, key)
            }
            ValidationError::NotAnObject { path } => {
                write!(f, "Expected an object at '{}'", path)
            }
            ValidationError::UnknownAttribute { field, attribute } => {
                write!(
                    f,
                    "Field '{}' has unknown attribute '{}' (allowed: {})",
                    field,
                    attribute,
                    FIELD_ATTRIBUTES.join(", ")
                )
            }
            ValidationError::MissingType { field } => {
                write!(f, "Field '{}' has no type", field)
            }
            ValidationError::InvalidType { field, value } => {
                write!(
                    f,
                    "Field '{}' has invalid type '{}' (expected 'dim' or 'num')",
                    field, value
                )
            }
            ValidationError::InvalidAggregation { field, value } => {
                write!(
                    f,
                    "Field '{}' has invalid group_by '{}' (expected group, sum, count, min, max or avg)",
                    field, value
                )
            }
            ValidationError::AggregationTypeMismatch { field, aggregation } => {
                write!(
                    f,
                    "Field '{}' is not numeric and cannot be aggregated with '{}'",
                    field, aggregation
                )
            }
            ValidationError::InvalidOrder { field, value } => {
                write!(
                    f,
                    "Field '{}' has invalid order_by '{}' (expected ASC or DESC)",
                    field, value
                )
            }
            ValidationError::InvalidVisibility { field, value } => {
                write!(
                    f,
                    "Field '{}' has invalid select '{}' (expected empty or 0)",
                    field, value
                )
            }
            ValidationError::InvalidAttributeValue { field, attribute } => {
                write!(f, "Field '{}' attribute '{}' must be a string", field, attribute)
            }
            ValidationError::InvalidDistinct { value } => {
                write!(f, "Invalid distinct '{}' (expected empty or 1)", value)
            }
            ValidationError::InvalidLimit { value } => {
                write!(f, "Invalid limit '{}' (expected a non-negative integer)", value)
            }
            ValidationError::InvalidClause { clause, value } => {
                write!(f, "Invalid {} '{}' (expected a string)", clause, value)
            }
            ValidationError::InvalidJoin { path, reason } => {
                write!(f, "Invalid join in '{}': {}", path, reason)
            }
            ValidationError::InvalidUnion { path, reason } => {
                write!(f, "Invalid union in '{}': {}", path, reason)
            }
            ValidationError::Malformed { path, message } => {
                write!(f, "Malformed query '{}': {}", path, message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Entry points
// =============================================================================

/// Validate a whole document tree, normalizing aliases in place.
///
/// Accepts either the wrapped form (`{"select": {...}, "sq": {...}}`) or a
/// single flat query block (`{"fields": {...}, "table": ...}`).
pub fn validate(document: &mut Value) -> ValidationResult<()> {
    if is_wrapped(document) {
        validate_node(document, "select")
    } else {
        let block = document
            .as_object_mut()
            .ok_or_else(|| ValidationError::NotAnObject { path: "$".into() })?;
        validate_block(block, "$")?;
        match source_of(block, "$", false)? {
            SourceKind::Table => Ok(()),
            _ => Err(ValidationError::MissingSource { path: "$".into() }),
        }
    }
}

/// Validate only a field map, normalizing aliases in place.
pub fn validate_fields(fields: &mut Map<String, Value>) -> ValidationResult<()> {
    for (name, field) in fields.iter_mut() {
        validate_field(name, field)?;
    }
    Ok(())
}

/// Whether a document uses the wrapped `{"select": ...}` layout.
pub fn is_wrapped(document: &Value) -> bool {
    document
        .as_object()
        .map(|obj| obj.contains_key("select"))
        .unwrap_or(false)
}

// =============================================================================
// Tree walk
// =============================================================================

enum SourceKind {
    Table,
    Subquery,
    Join(usize),
    Union(usize),
}

fn validate_node(node: &mut Value, path: &str) -> ValidationResult<()> {
    let obj = node
        .as_object_mut()
        .ok_or_else(|| ValidationError::NotAnObject { path: path.into() })?;

    let has_subquery = obj.contains_key("sq");
    let kind = {
        let block = obj
            .get_mut("select")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| ValidationError::NotAnObject {
                path: format!("{}.select", path),
            })?;
        validate_block(block, path)?;
        source_of(block, path, has_subquery)?
    };

    let children: Vec<String> = match kind {
        SourceKind::Table => vec![],
        SourceKind::Subquery => vec!["sq".into()],
        SourceKind::Join(n) | SourceKind::Union(n) => (1..=n).map(|i| format!("sq{}", i)).collect(),
    };

    for key in children {
        let child = obj
            .get_mut(&key)
            .ok_or_else(|| ValidationError::MissingSubquery {
                path: path.into(),
                key: key.clone(),
            })?;
        validate_node(child, &format!("{}.{}", path, key))?;
    }

    Ok(())
}

/// Work out which row source a block declares, checking join/union arity.
///
/// Precedence: union, join, table, subquery.
fn source_of(
    block: &Map<String, Value>,
    path: &str,
    has_subquery: bool,
) -> ValidationResult<SourceKind> {
    if let Some(union) = block.get("union") {
        let types = string_list(union, "union_type").map_err(|reason| {
            ValidationError::InvalidUnion {
                path: path.into(),
                reason,
            }
        })?;
        if types.is_empty() {
            return Err(ValidationError::InvalidUnion {
                path: path.into(),
                reason: "union_type is empty".into(),
            });
        }
        for t in &types {
            t.parse::<UnionType>()
                .map_err(|e| ValidationError::InvalidUnion {
                    path: path.into(),
                    reason: e.to_string(),
                })?;
        }
        return Ok(SourceKind::Union(types.len() + 1));
    }

    if let Some(join) = block.get("join") {
        let invalid = |reason: String| ValidationError::InvalidJoin {
            path: path.into(),
            reason,
        };
        let types = string_list(join, "join_type").map_err(invalid)?;
        let on = join
            .get("on")
            .and_then(Value::as_array)
            .ok_or_else(|| invalid("on must be a list".into()))?;
        if types.is_empty() {
            return Err(invalid("join_type is empty".into()));
        }
        if types.len() != on.len() {
            return Err(invalid(format!(
                "{} join types but {} conditions",
                types.len(),
                on.len()
            )));
        }
        for t in &types {
            t.parse::<JoinType>().map_err(|e| invalid(e.to_string()))?;
        }
        for cond in on {
            if !(cond.is_string() || cond.as_u64() == Some(0)) {
                return Err(invalid(format!("invalid join condition {}", cond)));
            }
        }
        return Ok(SourceKind::Join(types.len() + 1));
    }

    match block.get("table") {
        Some(Value::String(t)) if !t.is_empty() => return Ok(SourceKind::Table),
        Some(Value::String(_)) | None => {}
        Some(other) => {
            return Err(ValidationError::InvalidClause {
                clause: "table".into(),
                value: other.to_string(),
            })
        }
    }

    if has_subquery {
        return Ok(SourceKind::Subquery);
    }
    Err(ValidationError::MissingSource { path: path.into() })
}

fn string_list(block: &Value, key: &str) -> Result<Vec<String>, String> {
    block
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| format!("{} must be a list", key))?
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| format!("{} entries must be strings", key))
        })
        .collect()
}

// =============================================================================
// Block checks
// =============================================================================

fn validate_block(block: &mut Map<String, Value>, path: &str) -> ValidationResult<()> {
    let fields = block
        .get_mut("fields")
        .ok_or_else(|| ValidationError::MissingFields { path: path.into() })?
        .as_object_mut()
        .ok_or_else(|| ValidationError::NotAnObject {
            path: format!("{}.fields", path),
        })?;
    validate_fields(fields)?;

    for clause in ["where", "having", "schema"] {
        if let Some(value) = block.get(clause) {
            if !value.is_string() && !value.is_null() {
                return Err(ValidationError::InvalidClause {
                    clause: clause.into(),
                    value: value.to_string(),
                });
            }
        }
    }

    if let Some(distinct) = block.get("distinct") {
        if !is_distinct_flag(distinct) {
            return Err(ValidationError::InvalidDistinct {
                value: display(distinct),
            });
        }
    }

    if let Some(limit) = block.get("limit") {
        if parse_limit(limit).is_err() {
            return Err(ValidationError::InvalidLimit {
                value: display(limit),
            });
        }
    }

    Ok(())
}

fn validate_field(name: &str, field: &mut Value) -> ValidationResult<()> {
    let attrs = field
        .as_object_mut()
        .ok_or_else(|| ValidationError::NotAnObject {
            path: format!("fields.{}", name),
        })?;

    if let Some(attribute) = attrs
        .keys()
        .find(|k| !FIELD_ATTRIBUTES.contains(&k.as_str()))
    {
        return Err(ValidationError::UnknownAttribute {
            field: name.into(),
            attribute: attribute.clone(),
        });
    }

    let field_type = match attrs.get("type") {
        None => return Err(ValidationError::MissingType { field: name.into() }),
        Some(value) => value
            .as_str()
            .and_then(|s| s.parse::<FieldType>().ok())
            .ok_or_else(|| ValidationError::InvalidType {
                field: name.into(),
                value: display(value),
            })?,
    };

    for attribute in ["as", "expression", "custom_type"] {
        if let Some(value) = attrs.get(attribute) {
            if !value.is_string() && !value.is_null() {
                return Err(ValidationError::InvalidAttributeValue {
                    field: name.into(),
                    attribute: attribute.into(),
                });
            }
        }
    }

    if let Some(value) = attrs.get("group_by") {
        let text = value.as_str().ok_or_else(|| ValidationError::InvalidAggregation {
            field: name.into(),
            value: display(value),
        })?;
        if !text.is_empty() {
            let group_by = text
                .parse::<GroupBy>()
                .map_err(|_| ValidationError::InvalidAggregation {
                    field: name.into(),
                    value: text.into(),
                })?;
            if let Some(agg) = group_by.aggregation() {
                check_aggregable(name, field_type, agg)?;
            }
        }
    }

    if let Some(value) = attrs.get("order_by") {
        let valid = match value.as_str() {
            Some("") => true,
            Some(text) => text.parse::<SortOrder>().is_ok(),
            None => false,
        };
        if !valid {
            return Err(ValidationError::InvalidOrder {
                field: name.into(),
                value: display(value),
            });
        }
    }

    if let Some(value) = attrs.get("select") {
        let valid = match value {
            Value::String(s) => s.is_empty() || s == "0",
            Value::Number(n) => n.as_u64() == Some(0),
            _ => false,
        };
        if !valid {
            return Err(ValidationError::InvalidVisibility {
                field: name.into(),
                value: display(value),
            });
        }
    }

    if let Some(Value::String(alias)) = attrs.get_mut("as") {
        let normalized = normalize_alias(alias);
        if normalized != *alias {
            *alias = normalized;
        }
    }

    Ok(())
}

/// Aggregates are only valid on numeric fields.
pub fn check_aggregable(
    field: &str,
    field_type: FieldType,
    aggregation: Aggregation,
) -> ValidationResult<()> {
    if field_type == FieldType::Numeric {
        Ok(())
    } else {
        Err(ValidationError::AggregationTypeMismatch {
            field: field.into(),
            aggregation: aggregation.as_str().into(),
        })
    }
}

fn is_distinct_flag(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty() || s == "1",
        Value::Number(n) => n.as_u64() == Some(1),
        Value::Bool(b) => *b,
        _ => false,
    }
}

/// Parse a `limit` entry: empty means no limit.
pub(crate) fn parse_limit(value: &Value) -> Result<Option<u64>, ()> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s.trim().parse::<u64>().map(Some).map_err(|_| ()),
        Value::Number(n) => n.as_u64().map(Some).ok_or(()),
        _ => Err(()),
    }
}

pub(crate) fn is_distinct(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => s == "1",
        Some(Value::Number(n)) => n.as_u64() == Some(1),
        Some(Value::Bool(b)) => *b,
        _ => false,
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

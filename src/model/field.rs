//! Field descriptors - per-column metadata of a query document.
//!
//! A [`Field`] is a plain record. It never validates itself: documents are
//! checked once at the boundary by [`crate::validation`] and converted into
//! these types afterwards.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::config::TypeSettings;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Replace whitespace runs in an alias with a single underscore.
///
/// Leading and trailing whitespace is dropped first, so `" Order Number "`
/// becomes `"Order_Number"`.
pub fn normalize_alias(alias: &str) -> String {
    WHITESPACE.replace_all(alias.trim(), "_").into_owned()
}

/// Error returned when a string does not name a known enum value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

// =============================================================================
// Field type
// =============================================================================

/// Logical type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Categorical field, never aggregated.
    #[serde(rename = "dim")]
    Dimension,
    /// Numeric field, may be aggregated.
    #[serde(rename = "num")]
    Numeric,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Dimension => "dim",
            FieldType::Numeric => "num",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dim" => Ok(FieldType::Dimension),
            "num" => Ok(FieldType::Numeric),
            other => Err(ParseEnumError::new("field type", other)),
        }
    }
}

// =============================================================================
// Grouping
// =============================================================================

/// Aggregate function applied to a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregation {
    Sum,
    Count,
    Min,
    Max,
    Avg,
}

impl Aggregation {
    /// Lowercase name, as stored in documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Count => "count",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::Avg => "avg",
        }
    }

    /// SQL function name.
    pub fn function_name(&self) -> &'static str {
        match self {
            Aggregation::Sum => "SUM",
            Aggregation::Count => "COUNT",
            Aggregation::Min => "MIN",
            Aggregation::Max => "MAX",
            Aggregation::Avg => "AVG",
        }
    }

    /// Wrap an expression in this aggregate.
    pub fn apply(&self, expr: &str) -> String {
        format!("{}({})", self.function_name(), expr)
    }
}

impl FromStr for Aggregation {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(Aggregation::Sum),
            "count" => Ok(Aggregation::Count),
            "min" => Ok(Aggregation::Min),
            "max" => Ok(Aggregation::Max),
            "avg" => Ok(Aggregation::Avg),
            _ => Err(ParseEnumError::new("aggregation", s)),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role a field plays in GROUP BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupBy {
    /// A grouping dimension.
    Group,
    /// An aggregated value.
    Aggregate(Aggregation),
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Group => "group",
            GroupBy::Aggregate(agg) => agg.as_str(),
        }
    }

    pub fn aggregation(&self) -> Option<Aggregation> {
        match self {
            GroupBy::Group => None,
            GroupBy::Aggregate(agg) => Some(*agg),
        }
    }
}

impl From<Aggregation> for GroupBy {
    fn from(agg: Aggregation) -> Self {
        GroupBy::Aggregate(agg)
    }
}

impl FromStr for GroupBy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("group") {
            return Ok(GroupBy::Group);
        }
        s.parse::<Aggregation>()
            .map(GroupBy::Aggregate)
            .map_err(|_| ParseEnumError::new("group_by", s))
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for GroupBy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for GroupBy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Ordering
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }
}

impl FromStr for SortOrder {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ParseEnumError::new("order_by", s)),
        }
    }
}

impl Serialize for SortOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SortOrder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Visibility
// =============================================================================

/// Whether a field appears in the rendered SELECT list.
///
/// Stored in documents as the `select` attribute: absent or `""` means
/// visible, `0` means hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

impl Visibility {
    pub fn is_visible(&self) -> bool {
        matches!(self, Visibility::Visible)
    }
}

impl Serialize for Visibility {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Visibility::Visible => serializer.serialize_str(""),
            Visibility::Hidden => serializer.serialize_u8(0),
        }
    }
}

impl<'de> Deserialize<'de> for Visibility {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde_json::Value;

        match Value::deserialize(deserializer)? {
            Value::Null => Ok(Visibility::Visible),
            Value::String(s) if s.is_empty() => Ok(Visibility::Visible),
            Value::String(s) if s == "0" => Ok(Visibility::Hidden),
            Value::Number(n) if n.as_u64() == Some(0) => Ok(Visibility::Hidden),
            other => Err(serde::de::Error::custom(format!(
                "invalid select value: {}",
                other
            ))),
        }
    }
}

// =============================================================================
// Field
// =============================================================================

/// One output column of a query document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[must_use = "builders have no effect until used"]
pub struct Field {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<GroupBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<SortOrder>,
    #[serde(
        rename = "select",
        default,
        skip_serializing_if = "Visibility::is_visible"
    )]
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_type: Option<String>,
}

impl Field {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            alias: None,
            group_by: None,
            expression: None,
            order_by: None,
            visibility: Visibility::Visible,
            custom_type: None,
        }
    }

    /// A dimension field.
    pub fn dim() -> Self {
        Self::new(FieldType::Dimension)
    }

    /// A numeric field.
    pub fn num() -> Self {
        Self::new(FieldType::Numeric)
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(normalize_alias(alias));
        self
    }

    pub fn with_group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = Some(group_by);
        self
    }

    pub fn with_expression(mut self, expression: &str) -> Self {
        self.expression = Some(expression.into());
        self
    }

    pub fn with_order_by(mut self, order: SortOrder) -> Self {
        self.order_by = Some(order);
        self
    }

    pub fn with_custom_type(mut self, custom_type: &str) -> Self {
        self.custom_type = Some(custom_type.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visibility = Visibility::Hidden;
        self
    }

    pub fn is_visible(&self) -> bool {
        self.visibility.is_visible()
    }

    /// The output name: the alias when set and non-empty, else `key`.
    pub fn alias_or<'a>(&'a self, key: &'a str) -> &'a str {
        match self.alias.as_deref() {
            Some(alias) if !alias.is_empty() => alias,
            _ => key,
        }
    }

    /// The select expression: `expression` when set and non-empty, else `key`.
    pub fn expr_or<'a>(&'a self, key: &'a str) -> &'a str {
        match self.expression.as_deref() {
            Some(expr) if !expr.is_empty() => expr,
            _ => key,
        }
    }

    pub fn aggregation(&self) -> Option<Aggregation> {
        self.group_by.and_then(|g| g.aggregation())
    }

    /// Cast type used when the field is materialized into a table.
    pub fn sql_type(&self, types: &TypeSettings) -> String {
        match self.custom_type.as_deref() {
            Some(custom) if !custom.is_empty() => custom.to_string(),
            _ => types.for_type(self.field_type).to_string(),
        }
    }
}

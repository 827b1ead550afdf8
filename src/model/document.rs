//! Query documents - one query node and the row source it reads from.
//!
//! A document is a tree: every non-table source owns its child documents.
//! The persisted JSON form (see [`super::convert`]) flattens that tree into
//! sibling `sq`/`sqN` keys; in memory the tree is explicit.

use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

use super::field::{Field, ParseEnumError};

/// Ordered field map. Key order is SELECT order.
pub type Fields = IndexMap<String, Field>;

/// A single query node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub fields: Fields,
    pub source: Source,
    /// WHERE clause text.
    pub filter: Option<String>,
    /// HAVING clause text.
    pub having: Option<String>,
    pub distinct: bool,
    pub limit: Option<u64>,
}

impl Document {
    pub fn new(fields: Fields, source: Source) -> Self {
        Self {
            fields,
            source,
            filter: None,
            having: None,
            distinct: false,
            limit: None,
        }
    }

    /// A document reading directly from `table`.
    pub fn from_table(table: TableRef, fields: Fields) -> Self {
        Self::new(fields, Source::Table(table))
    }

    pub fn is_union(&self) -> bool {
        matches!(self.source, Source::Union(_))
    }

    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    /// Keys and fields that appear in the SELECT list.
    pub fn visible_fields(&self) -> impl Iterator<Item = (&String, &Field)> {
        self.fields.iter().filter(|(_, f)| f.is_visible())
    }

    /// Direct children, in render order.
    pub fn children(&self) -> Vec<&Document> {
        match &self.source {
            Source::Table(_) => vec![],
            Source::Subquery(inner) => vec![inner.as_ref()],
            Source::Join(join) => {
                let mut out = vec![join.left.as_ref()];
                out.extend(join.joins.iter().map(|j| &j.query));
                out
            }
            Source::Union(union) => {
                let mut out = vec![union.first.as_ref()];
                out.extend(union.members.iter().map(|m| &m.query));
                out
            }
        }
    }

    /// Number of nodes in this tree, this one included.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|c| c.node_count())
            .sum::<usize>()
    }
}

// =============================================================================
// Row sources
// =============================================================================

/// Where a document's rows come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Table(TableRef),
    /// `FROM (<inner>) sq`
    Subquery(Box<Document>),
    Join(JoinSource),
    Union(UnionSource),
}

impl Source {
    pub fn kind(&self) -> &'static str {
        match self {
            Source::Table(_) => "table",
            Source::Subquery(_) => "subquery",
            Source::Join(_) => "join",
            Source::Union(_) => "union",
        }
    }
}

/// Table reference with optional schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub schema: Option<String>,
    pub table: String,
}

impl TableRef {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: table.into(),
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        let schema = schema.into();
        self.schema = if schema.is_empty() { None } else { Some(schema) };
        self
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.table),
            None => f.write_str(&self.table),
        }
    }
}

/// `FROM (<left>) sq1 <join> (<q>) sq2 ON ... <join> (<q>) sq3 ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSource {
    pub left: Box<Document>,
    pub joins: Vec<Join>,
}

/// One right-hand side of a join chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub join_type: JoinType,
    /// `None` renders no ON clause (e.g. CROSS JOIN).
    pub on: Option<String>,
    pub query: Document,
}

/// `<first> UNION <q> UNION ALL <q> ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionSource {
    pub first: Box<Document>,
    pub members: Vec<UnionMember>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionMember {
    pub union_type: UnionType,
    pub query: Document,
}

// =============================================================================
// Join / union kinds
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL JOIN",
            JoinType::Cross => "CROSS JOIN",
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for JoinType {
    type Err = ParseEnumError;

    /// Accepts `"left join"`, `"LEFT"`, `"left outer join"`, `"join"` and so on.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        let mut words: Vec<&str> = lowered.split_whitespace().collect();
        let bare_join = words.last() == Some(&"join");
        if bare_join {
            words.pop();
        }
        if words.len() == 2 && words[1] == "outer" {
            words.pop();
        }
        match words.as_slice() {
            [] if bare_join => Ok(JoinType::Inner),
            ["inner"] => Ok(JoinType::Inner),
            ["left"] => Ok(JoinType::Left),
            ["right"] => Ok(JoinType::Right),
            ["full"] => Ok(JoinType::Full),
            ["cross"] => Ok(JoinType::Cross),
            _ => Err(ParseEnumError::new("join type", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnionType {
    Union,
    UnionAll,
}

impl UnionType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            UnionType::Union => "UNION",
            UnionType::UnionAll => "UNION ALL",
        }
    }
}

impl fmt::Display for UnionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for UnionType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        let words: Vec<&str> = lowered.split_whitespace().collect();
        match words.as_slice() {
            ["union"] => Ok(UnionType::Union),
            ["union", "all"] => Ok(UnionType::UnionAll),
            _ => Err(ParseEnumError::new("union type", s)),
        }
    }
}

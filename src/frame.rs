//! The fluent query-frame builder.
//!
//! A [`QFrame`] owns one query document and exposes the mutation API over
//! it. Editing operations take `self` and return it, so frames chain:
//!
//! ```ignore
//! let mut frame = QFrame::from_json(json)?
//!     .rename(&[("Order", "Bookings")])
//!     .group_by(&["Order"])?
//!     .fields(&["Value"])
//!     .agg(Aggregation::Sum)?;
//! println!("{}", frame.get_sql());
//! ```
//!
//! Misuse that leaves the document meaningful (a missing field, a filter on
//! a union) is skipped and recorded as a [`Notice`]. Contract violations
//! (arity mismatches, aggregating a dimension) are returned as
//! [`FrameError`].
//!
//! [`select`](QFrame::select), [`join`] and [`union`] create a new node
//! that owns the previous document(s) as children. Composing takes frames
//! by value; clone a frame first to keep using it on its own.

use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

use crate::config::Settings;
use crate::model::{
    normalize_alias, Aggregation, Document, Field, FieldType, Fields, GroupBy, Join, JoinSource,
    JoinType, ParseEnumError, SortOrder, Source, UnionMember, UnionSource, UnionType,
};
use crate::notice::Notice;
use crate::persist::{self, PersistError};
use crate::sql::{child_alias, format_sql, CreateTable, Insert, SqlBlocks, SUBQUERY_ALIAS};
use crate::validation::{self, ValidationError};

/// Hard failures of the mutation API.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(
        "join arity mismatch: {documents} documents, {join_types} join types, {conditions} conditions \
         (expected documents = join types + 1 = conditions + 1)"
    )]
    JoinArity {
        documents: usize,
        join_types: usize,
        conditions: usize,
    },

    #[error(
        "union arity mismatch: {documents} documents, {union_types} union types \
         (expected documents = union types + 1)"
    )]
    UnionArity {
        documents: usize,
        union_types: usize,
    },

    #[error("order_by got {keys} fields but {ascending} ascending flags")]
    OrderArity { keys: usize, ascending: usize },

    #[error("{operation} is not allowed on a union query")]
    UnionSourced { operation: &'static str },

    #[error("{operation} needs a frame with a query")]
    EmptyFrame { operation: &'static str },

    #[error(transparent)]
    Parse(#[from] ParseEnumError),

    #[error("Failed to serialize query: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

pub type FrameResult<T> = Result<T, FrameError>;

/// What to do when a WHERE/HAVING clause already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IfExists {
    #[default]
    Append,
    Replace,
}

/// Connective used when appending to an existing clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    #[default]
    And,
    Or,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::And => "and",
            Operator::Or => "or",
        }
    }
}

// =============================================================================
// QFrame
// =============================================================================

#[derive(Debug, Clone, Default)]
#[must_use = "frame operations return the updated frame"]
pub struct QFrame {
    document: Option<Document>,
    /// Fields targeted by the next [`agg`](QFrame::agg).
    getfields: Vec<String>,
    settings: Settings,
    sql: String,
    sql_blocks: Option<SqlBlocks>,
    notices: Vec<Notice>,
}

impl QFrame {
    /// An empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt a typed document after checking it like any external input.
    pub fn from_document(document: Document) -> FrameResult<Self> {
        Self::from_value(document.to_value()?)
    }

    /// Validate and adopt a JSON document.
    pub fn from_value(value: Value) -> FrameResult<Self> {
        let document = Document::from_value(value)?;
        Ok(Self {
            document: Some(document),
            ..Self::default()
        })
    }

    pub fn from_json(json: &str) -> FrameResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Load a stored document, optionally by label.
    pub fn load(path: impl AsRef<Path>, label: Option<&str>) -> FrameResult<Self> {
        let value = persist::load_value(path, label)?;
        Self::from_value(value)
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn into_document(self) -> Option<Document> {
        self.document
    }

    pub fn is_empty(&self) -> bool {
        self.document.is_none()
    }

    /// The persisted JSON layout; `{}` for an empty frame.
    pub fn to_value(&self) -> FrameResult<Value> {
        match &self.document {
            Some(doc) => Ok(doc.to_value()?),
            None => Ok(Value::Object(Default::default())),
        }
    }

    pub fn to_json(&self) -> FrameResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_value()?)?)
    }

    /// Store the document, optionally under a label shared with others.
    pub fn save(&self, path: impl AsRef<Path>, label: Option<&str>) -> FrameResult<()> {
        persist::save_value(path, &self.to_value()?, label)?;
        Ok(())
    }

    /// Notices recorded since construction or the last [`take_notices`](Self::take_notices).
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notice(&mut self, notice: Notice) {
        log::warn!("{}", notice);
        self.notices.push(notice);
    }

    /// Whether `operation` may edit the current node; records why not.
    fn editable(&mut self, operation: &'static str, allow_union: bool) -> bool {
        match self.document.as_ref().map(Document::is_union) {
            None => {
                self.notice(Notice::EmptyFrame { operation });
                false
            }
            Some(true) if !allow_union => {
                self.notice(Notice::UnionSourced { operation });
                false
            }
            Some(_) => true,
        }
    }

    // =========================================================================
    // Field edits
    // =========================================================================

    /// Set the output name of existing fields. Unknown keys are ignored.
    pub fn rename(mut self, names: &[(&str, &str)]) -> Self {
        if !self.editable("rename", true) {
            return self;
        }
        if let Some(doc) = self.document.as_mut() {
            for (key, alias) in names {
                if let Some(field) = doc.fields.get_mut(*key) {
                    field.alias = Some(normalize_alias(alias));
                }
            }
        }
        self
    }

    /// Drop fields from the current node.
    pub fn remove(mut self, keys: &[&str]) -> Self {
        if !self.editable("remove", true) {
            return self;
        }
        let mut missing = Vec::new();
        if let Some(doc) = self.document.as_mut() {
            for key in keys {
                if doc.fields.shift_remove(*key).is_none() {
                    missing.push(key.to_string());
                }
            }
        }
        for field in missing {
            self.notice(Notice::UnknownField {
                operation: "remove",
                field,
            });
        }
        self
    }

    /// Add computed fields, one per `(name, expression)` pair.
    pub fn assign(
        mut self,
        field_type: FieldType,
        group_by: Option<GroupBy>,
        fields: &[(&str, &str)],
    ) -> FrameResult<Self> {
        if let Some(agg) = group_by.and_then(|g| g.aggregation()) {
            for (name, _) in fields {
                validation::check_aggregable(name, field_type, agg)?;
            }
        }
        if !self.editable("assign", false) {
            return Ok(self);
        }
        if let Some(doc) = self.document.as_mut() {
            for (name, expression) in fields {
                let mut field = Field::new(field_type)
                    .with_alias(name)
                    .with_expression(expression);
                field.group_by = group_by;
                doc.fields.insert(name.to_string(), field);
            }
        }
        Ok(self)
    }

    /// Mark fields as grouping dimensions.
    pub fn group_by(mut self, keys: &[&str]) -> FrameResult<Self> {
        if self.document.as_ref().is_some_and(Document::is_union) {
            return Err(FrameError::UnionSourced {
                operation: "group_by",
            });
        }
        if !self.editable("group_by", false) {
            return Ok(self);
        }
        let mut missing = Vec::new();
        if let Some(doc) = self.document.as_mut() {
            for key in keys {
                match doc.fields.get_mut(*key) {
                    Some(field) => field.group_by = Some(GroupBy::Group),
                    None => missing.push(key.to_string()),
                }
            }
        }
        for field in missing {
            self.notice(Notice::UnknownField {
                operation: "group_by",
                field,
            });
        }
        Ok(self)
    }

    /// Pick the fields the next [`agg`](Self::agg) applies to.
    pub fn fields(mut self, keys: &[&str]) -> Self {
        self.getfields = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    /// Aggregate the fields picked with [`fields`](Self::fields).
    ///
    /// Fails without changing anything if a picked field is a dimension.
    pub fn agg(mut self, aggregation: Aggregation) -> FrameResult<Self> {
        if !self.editable("agg", false) {
            return Ok(self);
        }
        let keys = self.getfields.clone();
        let mut missing = Vec::new();
        if let Some(doc) = self.document.as_mut() {
            for key in &keys {
                if let Some(field) = doc.fields.get(key) {
                    validation::check_aggregable(key, field.field_type, aggregation)?;
                }
            }
            for key in &keys {
                match doc.fields.get_mut(key) {
                    Some(field) => field.group_by = Some(GroupBy::Aggregate(aggregation)),
                    None => missing.push(key.clone()),
                }
            }
        }
        for field in missing {
            self.notice(Notice::UnknownField {
                operation: "agg",
                field,
            });
        }
        Ok(self)
    }

    /// Sort by fields, one ascending flag per field.
    pub fn order_by(mut self, keys: &[&str], ascending: &[bool]) -> FrameResult<Self> {
        if keys.len() != ascending.len() {
            return Err(FrameError::OrderArity {
                keys: keys.len(),
                ascending: ascending.len(),
            });
        }
        if !self.editable("order_by", true) {
            return Ok(self);
        }
        let mut missing = Vec::new();
        if let Some(doc) = self.document.as_mut() {
            for (key, asc) in keys.iter().zip(ascending) {
                match doc.fields.get_mut(*key) {
                    Some(field) => field.order_by = Some(SortOrder::from_ascending(*asc)),
                    None => missing.push(key.to_string()),
                }
            }
        }
        for field in missing {
            self.notice(Notice::UnknownField {
                operation: "order_by",
                field,
            });
        }
        Ok(self)
    }

    // =========================================================================
    // Node edits
    // =========================================================================

    pub fn distinct(mut self) -> Self {
        if self.editable("distinct", false) {
            if let Some(doc) = self.document.as_mut() {
                doc.distinct = true;
            }
        }
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        if self.editable("limit", true) {
            if let Some(doc) = self.document.as_mut() {
                doc.limit = Some(limit);
            }
        }
        self
    }

    /// AND another condition onto WHERE.
    pub fn filter(self, expr: &str) -> Self {
        self.query(expr, IfExists::Append, Operator::And)
    }

    /// Set or extend the WHERE clause.
    pub fn query(mut self, expr: &str, if_exists: IfExists, operator: Operator) -> Self {
        if self.editable("where", false) {
            if let Some(doc) = self.document.as_mut() {
                combine(&mut doc.filter, expr, if_exists, operator);
            }
        }
        self
    }

    /// Set or extend the HAVING clause.
    pub fn having(mut self, expr: &str, if_exists: IfExists, operator: Operator) -> Self {
        if self.editable("having", false) {
            if let Some(doc) = self.document.as_mut() {
                combine(&mut doc.having, expr, if_exists, operator);
            }
        }
        self
    }

    /// Wrap the current query as subquery `sq` and select `keys` from it.
    ///
    /// New fields are keyed `sq.<alias>` and keep the old type and custom type.
    pub fn select(mut self, keys: &[&str]) -> Self {
        if !self.editable("select", true) {
            return self;
        }
        let Some(inner) = self.document.take() else {
            return self;
        };

        let mut fields = Fields::new();
        let mut skipped = Vec::new();
        for key in keys {
            match inner.fields.get(*key) {
                None => skipped.push(Notice::UnknownField {
                    operation: "select",
                    field: key.to_string(),
                }),
                Some(field) if !field.is_visible() => skipped.push(Notice::HiddenField {
                    operation: "select",
                    field: key.to_string(),
                }),
                Some(field) => {
                    let alias = field.alias_or(key);
                    fields.insert(
                        format!("{}.{}", SUBQUERY_ALIAS, alias),
                        projected(field, alias),
                    );
                }
            }
        }
        for notice in skipped {
            self.notice(notice);
        }

        log::debug!("select: wrapping query as subquery, {} field(s)", fields.len());
        self.document = Some(Document::new(fields, Source::Subquery(Box::new(inner))));
        self.getfields.clear();
        self
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Render the SQL and cache it together with its column blocks.
    ///
    /// An empty frame renders as an empty string.
    pub fn get_sql(&mut self) -> &str {
        match &self.document {
            None => {
                self.sql.clear();
                self.sql_blocks = None;
            }
            Some(doc) => {
                let blocks = SqlBlocks::build_with_types(&doc.fields, &self.settings.types);
                self.sql = format_sql(&doc.to_sql(), &self.settings.format);
                self.sql_blocks = Some(blocks);
                log::debug!("rendered {} query node(s):\n{}", doc.node_count(), self.sql);
            }
        }
        &self.sql
    }

    /// SQL from the last [`get_sql`](Self::get_sql) call.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Column blocks of the top-level node, rendering first.
    pub fn sql_blocks(&mut self) -> Option<&SqlBlocks> {
        self.get_sql();
        self.sql_blocks.as_ref()
    }

    /// `CREATE TABLE` matching the query's visible output columns.
    pub fn create_table_sql(&mut self, table: &str, schema: Option<&str>) -> FrameResult<String> {
        self.get_sql();
        let blocks = self.sql_blocks.as_ref().ok_or(FrameError::EmptyFrame {
            operation: "create_table",
        })?;
        Ok(CreateTable::from_blocks(table, blocks)
            .schema(schema.unwrap_or_default())
            .to_sql())
    }

    /// `INSERT INTO ... SELECT` loading the query's output into `table`.
    pub fn insert_into_sql(&mut self, table: &str, schema: Option<&str>) -> FrameResult<String> {
        self.get_sql();
        let blocks = self.sql_blocks.as_ref().ok_or(FrameError::EmptyFrame {
            operation: "insert_into",
        })?;
        Ok(Insert::into(table)
            .schema(schema.unwrap_or_default())
            .columns(blocks.select_aliases.iter().cloned())
            .from_select(self.sql.clone())
            .to_sql())
    }
}

fn combine(slot: &mut Option<String>, expr: &str, if_exists: IfExists, operator: Operator) {
    *slot = match (slot.take(), if_exists) {
        (Some(existing), IfExists::Append) if !existing.is_empty() => {
            Some(format!("{} {} {}", existing, operator.as_str(), expr))
        }
        _ => Some(expr.to_string()),
    };
}

/// A field re-exposed by a parent node under `alias`.
fn projected(field: &Field, alias: &str) -> Field {
    let mut out = Field::new(field.field_type).with_alias(alias);
    out.custom_type = field.custom_type.clone();
    out
}

// =============================================================================
// Composition
// =============================================================================

/// Join frames left to right.
///
/// `join_types[i]` and `on[i]` join `frames[i + 1]` onto the chain; an `on`
/// of `"0"` or `""` emits no ON clause. Output fields are `sq<n>.<alias>` for
/// every visible field of every frame; with `unique_col`, an alias already
/// taken by an earlier frame is skipped.
pub fn join(
    frames: Vec<QFrame>,
    join_types: &[JoinType],
    on: &[&str],
    unique_col: bool,
) -> FrameResult<QFrame> {
    if frames.len() != join_types.len() + 1 || join_types.len() != on.len() {
        return Err(FrameError::JoinArity {
            documents: frames.len(),
            join_types: join_types.len(),
            conditions: on.len(),
        });
    }
    let (settings, documents) = take_documents(frames, "join")?;

    let mut fields = Fields::new();
    let mut seen = HashSet::new();
    for (i, doc) in documents.iter().enumerate() {
        let prefix = child_alias(i + 1);
        for (key, field) in doc.visible_fields() {
            let alias = field.alias_or(key);
            if unique_col && !seen.insert(alias.to_string()) {
                continue;
            }
            fields.insert(format!("{}.{}", prefix, alias), projected(field, alias));
        }
    }

    let mut documents = documents.into_iter();
    let left = documents
        .next()
        .ok_or(FrameError::EmptyFrame { operation: "join" })?;
    let joins = documents
        .zip(join_types)
        .zip(on)
        .map(|((query, join_type), on)| Join {
            join_type: *join_type,
            on: join_condition(on),
            query,
        })
        .collect::<Vec<_>>();

    log::debug!("join: {} document(s), {} field(s)", joins.len() + 1, fields.len());
    let document = Document::new(
        fields,
        Source::Join(JoinSource {
            left: Box::new(left),
            joins,
        }),
    );
    Ok(QFrame {
        document: Some(document),
        settings,
        ..QFrame::default()
    })
}

/// Combine frames with UNION / UNION ALL.
///
/// Output fields are the first frame's visible fields, keyed by alias.
pub fn union(frames: Vec<QFrame>, union_types: &[UnionType]) -> FrameResult<QFrame> {
    if frames.len() != union_types.len() + 1 {
        return Err(FrameError::UnionArity {
            documents: frames.len(),
            union_types: union_types.len(),
        });
    }
    let (settings, documents) = take_documents(frames, "union")?;

    let mut documents = documents.into_iter();
    let first = documents
        .next()
        .ok_or(FrameError::EmptyFrame { operation: "union" })?;

    let mut fields = Fields::new();
    for (key, field) in first.visible_fields() {
        let alias = field.alias_or(key);
        let mut out = Field::new(field.field_type);
        out.custom_type = field.custom_type.clone();
        fields.insert(alias.to_string(), out);
    }

    let members = documents
        .zip(union_types)
        .map(|(query, union_type)| UnionMember {
            union_type: *union_type,
            query,
        })
        .collect::<Vec<_>>();

    log::debug!("union: {} document(s)", members.len() + 1);
    let document = Document::new(
        fields,
        Source::Union(UnionSource {
            first: Box::new(first),
            members,
        }),
    );
    Ok(QFrame {
        document: Some(document),
        settings,
        ..QFrame::default()
    })
}

/// Settings of the first frame plus every frame's document.
fn take_documents(
    frames: Vec<QFrame>,
    operation: &'static str,
) -> FrameResult<(Settings, Vec<Document>)> {
    let settings = frames
        .first()
        .map(|f| f.settings.clone())
        .unwrap_or_default();
    let documents = frames
        .into_iter()
        .map(|f| f.document.ok_or(FrameError::EmptyFrame { operation }))
        .collect::<FrameResult<Vec<_>>>()?;
    Ok((settings, documents))
}

fn join_condition(on: &str) -> Option<String> {
    let on = on.trim();
    if on.is_empty() || on == "0" {
        None
    } else {
        Some(on.to_string())
    }
}

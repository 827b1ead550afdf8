//! DDL generation for materializing a query's output.

use super::columns::SqlBlocks;
use super::token::{Token, TokenStream};

// ============================================================================
// CREATE TABLE
// ============================================================================

/// CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "DDL statements have no effect until converted to SQL with to_sql()"]
pub struct CreateTable {
    pub schema: Option<String>,
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

impl CreateTable {
    /// Create a new CREATE TABLE statement.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// A table whose columns mirror a query's visible output.
    pub fn from_blocks(name: impl Into<String>, blocks: &SqlBlocks) -> Self {
        Self::new(name).columns(
            blocks
                .select_aliases
                .iter()
                .zip(&blocks.types)
                .map(|(alias, data_type)| ColumnDef::new(alias.clone(), data_type.clone())),
        )
    }

    /// Set the schema. An empty schema is ignored.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        let schema = schema.into();
        if !schema.is_empty() {
            self.schema = Some(schema);
        }
        self
    }

    /// Add a column definition.
    pub fn column(mut self, col: ColumnDef) -> Self {
        self.columns.push(col);
        self
    }

    /// Add multiple column definitions.
    pub fn columns(mut self, cols: impl IntoIterator<Item = ColumnDef>) -> Self {
        self.columns.extend(cols);
        self
    }

    pub fn to_sql(&self) -> String {
        self.to_tokens().serialize()
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Create).space().push(Token::Table).space();
        ts.push(Token::QualifiedIdent {
            schema: self.schema.clone(),
            name: self.name.clone(),
        });

        ts.space().lparen();
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                ts.comma().space();
            }
            ts.append(&col.to_tokens());
        }
        ts.rparen();

        ts
    }
}

// ============================================================================
// Column Definition
// ============================================================================

/// Column definition for CREATE TABLE.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    /// Cast type text, e.g. `VARCHAR(500)`.
    pub data_type: String,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Ident(self.name.clone()))
            .space()
            .push(Token::Raw(self.data_type.clone()));
        ts
    }
}

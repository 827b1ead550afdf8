//! DML generation: loading a query's output into a table and
//! clearing rows ahead of a reload.

use super::token::{Token, TokenStream};

// ============================================================================
// INSERT
// ============================================================================

/// `INSERT INTO <table> (<cols>) <select>`
#[derive(Debug, Clone, PartialEq)]
#[must_use = "DML statements have no effect until converted to SQL with to_sql()"]
pub struct Insert {
    pub schema: Option<String>,
    pub table: String,
    pub columns: Vec<String>,
    /// Rendered SELECT the rows come from.
    pub from_query: Option<String>,
}

impl Insert {
    /// Create a new INSERT statement.
    pub fn into(table: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: table.into(),
            columns: Vec::new(),
            from_query: None,
        }
    }

    /// Set the schema. An empty schema is ignored.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        let schema = schema.into();
        if !schema.is_empty() {
            self.schema = Some(schema);
        }
        self
    }

    /// Set the columns to insert.
    pub fn columns(mut self, cols: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns = cols.into_iter().map(|c| c.into()).collect();
        self
    }

    /// Insert from rendered SELECT text.
    pub fn from_select(mut self, sql: impl Into<String>) -> Self {
        self.from_query = Some(sql.into());
        self
    }

    pub fn to_sql(&self) -> String {
        self.to_tokens().serialize()
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Insert).space().push(Token::Into).space();
        ts.push(Token::QualifiedIdent {
            schema: self.schema.clone(),
            name: self.table.clone(),
        });

        if !self.columns.is_empty() {
            ts.space().lparen().comma_separated(
                self.columns.iter().map(|c| Token::Ident(c.clone())),
            );
            ts.rparen();
        }

        if let Some(query) = &self.from_query {
            ts.space().push(Token::Raw(query.clone()));
        }

        ts
    }
}

// ============================================================================
// DELETE
// ============================================================================

/// `DELETE FROM <table> [WHERE <condition>]`
#[derive(Debug, Clone, PartialEq)]
#[must_use = "DML statements have no effect until converted to SQL with to_sql()"]
pub struct Delete {
    pub schema: Option<String>,
    pub table: String,
    pub filter: Option<String>,
}

impl Delete {
    /// Create a new DELETE statement.
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: table.into(),
            filter: None,
        }
    }

    /// Set the schema. An empty schema is ignored.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        let schema = schema.into();
        if !schema.is_empty() {
            self.schema = Some(schema);
        }
        self
    }

    /// Set the WHERE condition.
    pub fn filter(mut self, condition: impl Into<String>) -> Self {
        self.filter = Some(condition.into());
        self
    }

    pub fn to_sql(&self) -> String {
        self.to_tokens().serialize()
    }

    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Delete).space().push(Token::From).space();
        ts.push(Token::QualifiedIdent {
            schema: self.schema.clone(),
            name: self.table.clone(),
        });

        if let Some(filter) = &self.filter {
            ts.clause(Token::Where, Token::Raw(filter.clone()));
        }

        ts
    }
}

/// One `DELETE ... WHERE` statement per condition, in order.
pub fn delete_where_sql(table: &str, schema: Option<&str>, conditions: &[&str]) -> Vec<String> {
    conditions
        .iter()
        .map(|condition| {
            Delete::from(table)
                .schema(schema.unwrap_or_default())
                .filter(*condition)
                .to_sql()
        })
        .collect()
}

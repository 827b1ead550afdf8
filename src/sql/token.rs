//! SQL Tokens - the atomic units of SQL output.
//!
//! Document text (expressions, filters, join conditions) is opaque to the
//! builder and travels through as [`Token::Raw`]; everything structural is
//! a keyword or punctuation token.

use crate::model::{JoinType, UnionType};

/// SQL Token - every element the builder emits.
///
/// Adding a new variant here will cause compile errors everywhere
/// it needs to be handled (exhaustive matching).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Keywords ===
    Select,
    Distinct,
    From,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Limit,
    On,
    Join(JoinType),
    Union(UnionType),

    // === DDL / DML Keywords ===
    Create,
    Table,
    Insert,
    Into,
    Delete,

    // === Punctuation ===
    Comma,
    LParen,
    RParen,

    // === Whitespace ===
    Space,

    // === Dynamic Content ===
    /// Simple identifier, emitted unquoted.
    Ident(String),
    /// Qualified identifier: schema.table or just table
    QualifiedIdent {
        schema: Option<String>,
        name: String,
    },
    /// Integer literal
    LitInt(u64),

    // === Escape Hatch ===
    /// Caller-supplied SQL text, emitted verbatim.
    Raw(String),
}

impl Token {
    pub fn serialize(&self) -> String {
        match self {
            Token::Select => "SELECT".into(),
            Token::Distinct => "DISTINCT".into(),
            Token::From => "FROM".into(),
            Token::Where => "WHERE".into(),
            Token::GroupBy => "GROUP BY".into(),
            Token::Having => "HAVING".into(),
            Token::OrderBy => "ORDER BY".into(),
            Token::Limit => "LIMIT".into(),
            Token::On => "ON".into(),
            Token::Join(join_type) => join_type.as_sql().into(),
            Token::Union(union_type) => union_type.as_sql().into(),

            Token::Create => "CREATE".into(),
            Token::Table => "TABLE".into(),
            Token::Insert => "INSERT".into(),
            Token::Into => "INTO".into(),
            Token::Delete => "DELETE".into(),

            Token::Comma => ",".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),

            Token::Space => " ".into(),

            Token::Ident(name) => name.clone(),
            Token::QualifiedIdent { schema, name } => match schema {
                Some(s) => format!("{}.{}", s, name),
                None => name.clone(),
            },
            Token::LitInt(n) => n.to_string(),

            Token::Raw(s) => s.clone(),
        }
    }
}

/// A stream of tokens that can be serialized to SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty token stream.
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    /// Push a single token.
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Append another token stream.
    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens.iter().cloned());
        self
    }

    /// Push `items` separated by `", "`.
    pub fn comma_separated(&mut self, items: impl IntoIterator<Item = Token>) -> &mut Self {
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.comma().space();
            }
            self.push(item);
        }
        self
    }

    /// Push ` <keyword> <text>`; used for the trailing clauses.
    pub fn clause(&mut self, keyword: Token, text: Token) -> &mut Self {
        self.space().push(keyword).space().push(text)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Serialize all tokens to a SQL string.
    pub fn serialize(&self) -> String {
        self.tokens.iter().map(Token::serialize).collect()
    }

    // Convenience methods for common tokens
    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }
    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }
    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
}

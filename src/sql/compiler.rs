//! Recursive SQL compiler for query documents.
//!
//! Produces single-line SQL: each child is rendered by the same routine and
//! wrapped in parentheses with an `sq`/`sqN` alias. Cosmetic reformatting is
//! a separate pass ([`super::format`]) applied once to the final text.

use super::columns::SqlBlocks;
use super::token::{Token, TokenStream};
use crate::model::{Document, Source, TableRef};

/// Alias of a plain subquery source.
pub const SUBQUERY_ALIAS: &str = "sq";

/// Alias of the n-th (1-based) child of a join or union.
pub fn child_alias(n: usize) -> String {
    format!("{}{}", SUBQUERY_ALIAS, n)
}

impl TableRef {
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::QualifiedIdent {
            schema: self.schema.clone(),
            name: self.table.clone(),
        });
        ts
    }
}

impl Document {
    /// Render this document as single-line SQL.
    pub fn to_sql(&self) -> String {
        self.to_tokens().serialize()
    }

    /// Column fragments for this node, with default cast types.
    pub fn sql_blocks(&self) -> SqlBlocks {
        SqlBlocks::build(&self.fields)
    }

    pub fn to_tokens(&self) -> TokenStream {
        let blocks = self.sql_blocks();
        let mut ts = TokenStream::new();

        match &self.source {
            Source::Union(union) => {
                ts.append(&union.first.to_tokens());
                for member in &union.members {
                    ts.space()
                        .push(Token::Union(member.union_type))
                        .space()
                        .append(&member.query.to_tokens());
                }
            }
            source => {
                ts.push(Token::Select);
                if self.distinct {
                    ts.space().push(Token::Distinct);
                }
                ts.space().comma_separated(
                    blocks
                        .select_names
                        .iter()
                        .map(|name| Token::Raw(name.clone())),
                );

                ts.space().push(Token::From).space();
                ts.append(&source_tokens(source));

                if let Some(filter) = &self.filter {
                    ts.clause(Token::Where, Token::Raw(filter.clone()));
                }
                if blocks.is_grouped() {
                    ts.space().push(Token::GroupBy).space().comma_separated(
                        blocks
                            .group_dimensions
                            .iter()
                            .map(|dim| Token::Ident(dim.clone())),
                    );
                }
                if let Some(having) = &self.having {
                    ts.clause(Token::Having, Token::Raw(having.clone()));
                }
            }
        }

        if !blocks.order_by.is_empty() {
            ts.space().push(Token::OrderBy).space().comma_separated(
                blocks
                    .order_by
                    .iter()
                    .map(|entry| Token::Raw(entry.clone())),
            );
        }
        if let Some(limit) = self.limit {
            ts.clause(Token::Limit, Token::LitInt(limit));
        }

        ts
    }
}

/// Everything after `FROM `.
fn source_tokens(source: &Source) -> TokenStream {
    let mut ts = TokenStream::new();
    match source {
        Source::Table(table) => {
            ts.append(&table.to_tokens());
        }
        Source::Subquery(inner) => {
            ts.append(&wrapped(inner, SUBQUERY_ALIAS));
        }
        Source::Join(join) => {
            ts.append(&wrapped(&join.left, &child_alias(1)));
            for (i, j) in join.joins.iter().enumerate() {
                ts.space()
                    .push(Token::Join(j.join_type))
                    .space()
                    .append(&wrapped(&j.query, &child_alias(i + 2)));
                if let Some(on) = &j.on {
                    ts.clause(Token::On, Token::Raw(on.clone()));
                }
            }
        }
        Source::Union(_) => {
            // unions render without a FROM; handled by the caller
        }
    }
    ts
}

/// `(<child>) <alias>`
fn wrapped(child: &Document, alias: &str) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.lparen()
        .append(&child.to_tokens())
        .rparen()
        .space()
        .push(Token::Ident(alias.into()));
    ts
}

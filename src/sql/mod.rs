//! SQL generation module.
//!
//! - [`columns`] - per-node column fragments
//! - [`compiler`] - recursive document-to-SQL rendering
//! - [`format`] - cosmetic reformat pass
//! - [`ddl`] - CREATE TABLE for a query's output
//! - [`dml`] - INSERT ... SELECT and DELETE
//! - [`token`] - Token types for SQL generation

pub mod columns;
pub mod compiler;
pub mod ddl;
pub mod dml;
pub mod format;
pub mod token;

#[cfg(test)]
pub mod test_utils;

pub use columns::SqlBlocks;
pub use compiler::{child_alias, SUBQUERY_ALIAS};
pub use ddl::{ColumnDef, CreateTable};
pub use dml::{delete_where_sql, Delete, Insert};
pub use format::format_sql;
pub use token::{Token, TokenStream};

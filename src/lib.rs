//! # qframe
//!
//! A query-frame builder: declarative query documents, composed with a
//! fluent API and compiled to SQL text.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │         Query Document (JSON / spreadsheet rows)         │
//! │      fields + table | subquery | join | union            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [validation + convert]
//! ┌─────────────────────────────────────────────────────────┐
//! │               Document tree (Rust types)                 │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [QFrame: rename, group_by, agg, select, join, ...]
//! ┌─────────────────────────────────────────────────────────┐
//! │                  Composed document tree                  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [columns + compiler]
//! ┌─────────────────────────────────────────────────────────┐
//! │             Single-line SQL + column blocks              │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [format]
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Formatted SQL                         │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod frame;
pub mod import;
pub mod model;
pub mod notice;
pub mod persist;
pub mod sql;
pub mod validation;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::frame::{join, union, FrameError, FrameResult, IfExists, Operator, QFrame};
    pub use crate::model::{
        Aggregation, Document, Field, FieldType, GroupBy, JoinType, SortOrder, TableRef,
        UnionType,
    };
    pub use crate::notice::Notice;
    pub use crate::sql::SqlBlocks;
    pub use crate::validation::ValidationError;
}

// Also export at crate root for convenience
pub use frame::{join, union, FrameError, QFrame};
pub use model::Document;
pub use notice::Notice;

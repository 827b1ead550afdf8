//! Query document model.
//!
//! - [`field`] - per-column descriptors
//! - [`document`] - query nodes and their row sources
//! - [`convert`] - JSON layout in and out

pub mod convert;
pub mod document;
pub mod field;

pub use document::{
    Document, Fields, Join, JoinSource, JoinType, Source, TableRef, UnionMember, UnionSource,
    UnionType,
};
pub use field::{
    normalize_alias, Aggregation, Field, FieldType, GroupBy, ParseEnumError, SortOrder, Visibility,
};

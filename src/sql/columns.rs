//! Column-string builder.
//!
//! Derives the text fragments one query node needs (select list, grouping,
//! ordering, cast types) from its field map. The fragments are also handed
//! to callers as [`SqlBlocks`] so they can build DDL around a query.

use serde::Serialize;

use crate::config::TypeSettings;
use crate::model::{Fields, GroupBy, SortOrder};

/// Text fragments derived from a field map, all in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SqlBlocks {
    /// `expr` or `expr as alias`, visible fields only.
    pub select_names: Vec<String>,
    /// Output names of the visible fields.
    pub select_aliases: Vec<String>,
    /// Aliases of fields grouped on, visible or not.
    pub group_dimensions: Vec<String>,
    /// Aliases of aggregated fields, visible or not.
    pub group_values: Vec<String>,
    /// `alias DESC` or a bare `alias`, visible fields only.
    pub order_by: Vec<String>,
    /// Cast type per visible field.
    pub types: Vec<String>,
}

impl SqlBlocks {
    /// Build with the default cast types.
    pub fn build(fields: &Fields) -> Self {
        Self::build_with_types(fields, &TypeSettings::default())
    }

    pub fn build_with_types(fields: &Fields, types: &TypeSettings) -> Self {
        let mut blocks = SqlBlocks::default();

        for (key, field) in fields {
            let alias = field.alias_or(key);
            let mut expr = field.expr_or(key).to_string();

            match field.group_by {
                Some(GroupBy::Group) => blocks.group_dimensions.push(alias.to_string()),
                Some(GroupBy::Aggregate(agg)) => {
                    expr = agg.apply(&expr);
                    blocks.group_values.push(alias.to_string());
                }
                None => {}
            }

            if !field.is_visible() {
                continue;
            }

            if expr == alias {
                blocks.select_names.push(expr);
            } else {
                blocks.select_names.push(format!("{} as {}", expr, alias));
            }
            blocks.select_aliases.push(alias.to_string());
            blocks.types.push(field.sql_type(types));

            match field.order_by {
                Some(SortOrder::Desc) => blocks.order_by.push(format!("{} DESC", alias)),
                Some(SortOrder::Asc) => blocks.order_by.push(alias.to_string()),
                None => {}
            }
        }

        blocks
    }

    /// Whether the node groups on anything.
    pub fn is_grouped(&self) -> bool {
        !self.group_dimensions.is_empty()
    }
}

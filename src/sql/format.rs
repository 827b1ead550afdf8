//! Cosmetic reformat pass.
//!
//! Only whitespace and keyword case change; the statement itself is left
//! alone. Callers that need byte-stable output disable the pass in
//! [`FormatSettings`].

use sqlformat::{FormatOptions, Indent, QueryParams};

use crate::config::FormatSettings;

/// Reindent `sql` per `settings`, or return it unchanged when disabled.
pub fn format_sql(sql: &str, settings: &FormatSettings) -> String {
    if !settings.enabled || sql.is_empty() {
        return sql.to_string();
    }

    let options = FormatOptions {
        joins_as_top_level: true,
        indent: Indent::Spaces(settings.indent),
        uppercase: settings.uppercase.then_some(true),
        lines_between_queries: 1,
        ..Default::default()
    };

    sqlformat::format(sql, &QueryParams::None, &options)
}

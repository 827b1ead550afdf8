//! Shared fixtures for integration tests.
#![allow(dead_code)]

use qframe::config::Settings;
use qframe::QFrame;
use serde_json::{json, Value};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

/// Strip all whitespace and lowercase, for comparing formatted output.
pub fn squash(sql: &str) -> String {
    sql.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Check that SQL parses with the generic dialect.
pub fn validate_sql(sql: &str) -> Result<(), String> {
    Parser::parse_sql(&GenericDialect {}, sql)
        .map(|_| ())
        .map_err(|e| format!("Invalid SQL: {}\nSQL: {}", e, sql))
}

/// Orders with an aliased `Order` column.
pub fn orders() -> Value {
    json!({
        "select": {
            "fields": {
                "Order": {"type": "dim", "as": "Bookings"},
                "Part": {"type": "dim"},
                "Customer": {"type": "dim"},
                "Value": {"type": "num"}
            },
            "table": "Orders"
        }
    })
}

/// A sales table without reserved words, so output parses.
pub fn sales() -> Value {
    json!({
        "select": {
            "fields": {
                "customer": {"type": "dim"},
                "region": {"type": "dim", "as": "sales_region"},
                "amount": {"type": "num"}
            },
            "schema": "dbo",
            "table": "sales"
        }
    })
}

pub fn playlists() -> Value {
    json!({
        "select": {
            "fields": {
                "PlaylistId": {"type": "dim"},
                "Name": {"type": "dim"}
            },
            "table": "playlists"
        }
    })
}

pub fn playlist_track() -> Value {
    json!({
        "select": {
            "fields": {
                "PlaylistId": {"type": "dim"},
                "TrackId": {"type": "dim"}
            },
            "table": "playlist_track"
        }
    })
}

/// A frame that renders single-line SQL.
pub fn raw_frame(value: Value) -> QFrame {
    QFrame::from_value(value)
        .unwrap()
        .with_settings(Settings::raw())
}

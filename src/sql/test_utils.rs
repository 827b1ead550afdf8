//! Test utilities for SQL emission validation.
//!
//! Provides helpers for validating that emitted SQL is syntactically correct
//! using sqlparser-rs.

use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

/// Validates that a SQL string parses with the generic dialect.
///
/// # Example
///
/// ```ignore
/// use crate::sql::test_utils::validate_sql;
///
/// validate_sql("SELECT customer FROM orders").unwrap();
/// ```
pub fn validate_sql(sql: &str) -> Result<(), String> {
    Parser::parse_sql(&GenericDialect {}, sql)
        .map(|_| ())
        .map_err(|e| format!("Invalid SQL: {}\nSQL: {}", e, sql))
}

/// Strip all whitespace and lowercase, for comparing formatted output.
pub fn squash(sql: &str) -> String {
    sql.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_sql() {
        validate_sql("SELECT customer FROM orders").unwrap();
    }

    #[test]
    fn test_validate_invalid_sql() {
        let result = validate_sql("SELEC * FORM users");
        assert!(result.is_err());
    }

    #[test]
    fn test_squash() {
        assert_eq!(squash("SELECT a,\n    b FROM t"), "selecta,bfromt");
    }
}

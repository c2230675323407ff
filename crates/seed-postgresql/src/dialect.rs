//! PostgreSQL SQL dialect.

use seed_core::{ColumnType, SqlDialect};

#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn column_type(&self, column_type: ColumnType) -> String {
        match column_type {
            ColumnType::Serial => "SERIAL PRIMARY KEY".to_string(),
            ColumnType::Int => "INT".to_string(),
            ColumnType::VarChar(length) => format!("VARCHAR({length})"),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Decimal { precision, scale } => format!("DECIMAL({precision},{scale})"),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::DateTime => "TIMESTAMP WITHOUT TIME ZONE".to_string(),
        }
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn subtract_seconds(&self, expr: &str, seconds: i64) -> String {
        format!("{expr} - INTERVAL '{seconds} seconds'")
    }
}

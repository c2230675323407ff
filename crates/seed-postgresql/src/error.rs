//! Error types for the PostgreSQL adapter.

use seed_core::{EngineError, EngineKind};
use thiserror::Error;
use tokio_postgres::error::SqlState;

/// Errors that can occur inside the PostgreSQL adapter.
#[derive(Error, Debug)]
pub enum PostgresAdapterError {
    /// PostgreSQL connection or query error.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// Result column of a type the adapter does not decode.
    #[error("Unsupported result type '{type_name}' in column {index}")]
    UnsupportedType { index: usize, type_name: String },

    /// Connection task ended abnormally.
    #[error("Connection task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<PostgresAdapterError> for EngineError {
    fn from(err: PostgresAdapterError) -> Self {
        match err {
            PostgresAdapterError::Postgres(e) if is_constraint_violation(&e) => {
                let message = e
                    .as_db_error()
                    .map(|db| db.message().to_string())
                    .unwrap_or_else(|| e.to_string());
                EngineError::Constraint(message)
            }
            PostgresAdapterError::Postgres(e) => EngineError::driver(EngineKind::PostgreSql, e),
            other => EngineError::Other(other.to_string()),
        }
    }
}

fn is_constraint_violation(e: &tokio_postgres::Error) -> bool {
    e.code().is_some_and(|code| {
        *code == SqlState::UNIQUE_VIOLATION
            || *code == SqlState::FOREIGN_KEY_VIOLATION
            || *code == SqlState::NOT_NULL_VIOLATION
    })
}

/// Double-quote an identifier.
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("negocio"), "\"negocio\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_unsupported_type_maps_to_other() {
        let err: EngineError = PostgresAdapterError::UnsupportedType {
            index: 2,
            type_name: "jsonb".into(),
        }
        .into();
        assert!(matches!(err, EngineError::Other(msg) if msg.contains("jsonb")));
    }
}

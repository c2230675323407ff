//! Error types for the MySQL adapter.

use seed_core::{EngineError, EngineKind};
use thiserror::Error;

/// MySQL server error codes reported as constraint violations.
const ER_DUP_ENTRY: u16 = 1062;
const ER_NO_REFERENCED_ROW_2: u16 = 1452;
const ER_BAD_NULL_ERROR: u16 = 1048;

/// Errors that can occur inside the MySQL adapter.
#[derive(Error, Debug)]
pub enum MySqlAdapterError {
    /// MySQL connection or query error.
    #[error("MySQL error: {0}")]
    MySql(#[from] mysql_async::Error),

    /// Database name that cannot be used as a bare identifier.
    #[error("Invalid database name '{0}'")]
    InvalidIdentifier(String),
}

impl MySqlAdapterError {
    /// Map into the engine-neutral error, tagging the flavour that failed.
    pub fn into_engine_error(self, kind: EngineKind) -> EngineError {
        match self {
            MySqlAdapterError::MySql(mysql_async::Error::Server(server))
                if matches!(
                    server.code,
                    ER_DUP_ENTRY | ER_NO_REFERENCED_ROW_2 | ER_BAD_NULL_ERROR
                ) =>
            {
                EngineError::Constraint(format!("{} ({})", server.message, server.code))
            }
            MySqlAdapterError::MySql(e) => EngineError::driver(kind, e),
            MySqlAdapterError::InvalidIdentifier(name) => {
                EngineError::Other(format!("invalid database name '{name}'"))
            }
        }
    }
}

/// Accept only plain identifiers for database names.
pub(crate) fn check_identifier(name: &str) -> Result<&str, MySqlAdapterError> {
    let valid = !name.is_empty()
        && name.len() <= 64
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if valid {
        Ok(name)
    } else {
        Err(MySqlAdapterError::InvalidIdentifier(name.to_string()))
    }
}

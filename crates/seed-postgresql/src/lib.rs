//! PostgreSQL adapter for the negocio seeder.
//!
//! Unquoted identifiers fold to lower case in PostgreSQL, so tables created
//! here appear as `usuario`, `registrosensor` and so on in the catalog.
//! Queries are written unquoted as well and resolve the same way.

pub mod dialect;
pub mod engine;
pub mod error;

pub use dialect::PostgresDialect;
pub use engine::{connect, PostgresEngine};
pub use error::PostgresAdapterError;

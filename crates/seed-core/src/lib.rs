//! Core types for the negocio seeder.
//!
//! This crate provides the foundational types shared by the generator,
//! the engine adapters and the CLI:
//!
//! - [`Table`] - The ten-table logical schema and its foreign-key DAG
//! - [`Category`] - Closed categorical enumerations used by generated rows
//! - [`SqlValue`] / [`EntityRow`] / [`ResultRow`] - Engine-neutral values
//! - [`IdPools`] - Primary keys available to later seeding phases
//! - [`Engine`] / [`ConnectionProvider`] - The adapter seam
//! - [`SqlDialect`] / [`AnalyticsQuery`] - Shared SQL rendering
//!
//! # Architecture
//!
//! ```text
//! seed-core (this crate)
//!    │
//!    ├─── seed-generator   (fills EntityRows from IdPools)
//!    ├─── seed-mysql       (Engine + SqlDialect for MySQL/MariaDB)
//!    └─── seed-postgresql  (Engine + SqlDialect for PostgreSQL)
//! ```

pub mod category;
pub mod dialect;
pub mod engine;
pub mod pool;
pub mod schema;
pub mod values;

// Re-exports for convenience
pub use category::Category;
pub use dialect::{sql_literal, AnalyticsQuery, SqlDialect};
pub use engine::{ConnectTarget, ConnectionProvider, Engine, EngineConfig, EngineError, EngineKind};
pub use pool::IdPools;
pub use schema::{ColumnDefault, MAX_BIND_PARAMETERS, ColumnDefinition, ColumnType, SchemaShape, Table};
pub use values::{DecodeError, EntityRow, ResultRow, SqlValue};

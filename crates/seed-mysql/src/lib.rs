//! MySQL and MariaDB adapter for the negocio seeder.
//!
//! Both flavours speak the same wire protocol and accept the same DDL, so a
//! single [`MySqlEngine`] serves both; the [`seed_core::EngineKind`] it
//! carries only labels logs and errors.

pub mod dialect;
pub mod engine;
pub mod error;

pub use dialect::MySqlDialect;
pub use engine::{connect, MySqlEngine};
pub use error::MySqlAdapterError;

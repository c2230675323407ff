//! Error taxonomy for provisioning, seeding and reporting.
//!
//! Every error that can end an engine run carries enough context to be
//! logged on its own: the engine, and for seeding the phase and table.

use seed_core::{DecodeError, EngineError, EngineKind, Table};
use seed_generator::GeneratorError;
use std::path::PathBuf;
use thiserror::Error;

/// A connection could not be opened.
#[derive(Debug, Error)]
#[error("cannot connect to {engine} on port {port}: {source}")]
pub struct ConnectionError {
    pub engine: EngineKind,
    pub port: u16,
    #[source]
    pub source: EngineError,
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("dropping and creating database {database} failed: {source}")]
    Database {
        database: String,
        #[source]
        source: EngineError,
    },

    #[error("creating table {table} failed: {source}")]
    Ddl {
        table: Table,
        #[source]
        source: EngineError,
    },

    #[error("applying schema failed: {0}")]
    Schema(#[source] EngineError),

    #[error("reading schema failed: {0}")]
    Describe(#[source] EngineError),
}

impl ProvisionError {
    /// Split a schema error into the failing table where the adapter knows it.
    pub(crate) fn from_schema(err: EngineError) -> Self {
        match err {
            EngineError::Ddl { table, source } => ProvisionError::Ddl {
                table,
                source: *source,
            },
            other => ProvisionError::Schema(other),
        }
    }

    pub fn table(&self) -> Option<Table> {
        match self {
            ProvisionError::Ddl { table, .. } => Some(*table),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("phase {phase}: inserting into {table} failed: {source}")]
    Insert {
        phase: &'static str,
        table: Table,
        #[source]
        source: EngineError,
    },

    #[error("phase {phase}: fetching {table} ids failed: {source}")]
    FetchIds {
        phase: &'static str,
        table: Table,
        #[source]
        source: EngineError,
    },

    #[error("phase {phase}: transaction failed: {source}")]
    Transaction {
        phase: &'static str,
        #[source]
        source: EngineError,
    },

    #[error("phase {phase}: generating {table} rows failed: {source}")]
    Generate {
        phase: &'static str,
        table: Table,
        #[source]
        source: GeneratorError,
    },

    #[error("phase {phase}: query failed: {source}")]
    Query {
        phase: &'static str,
        #[source]
        source: EngineError,
    },

    #[error("phase {phase}: unexpected query result: {source}")]
    Decode {
        phase: &'static str,
        #[source]
        source: DecodeError,
    },
}

impl SeedError {
    /// Phase the failure happened in. `None` for connection failures.
    pub fn phase(&self) -> Option<&'static str> {
        match self {
            SeedError::Connection(_) => None,
            SeedError::Insert { phase, .. }
            | SeedError::FetchIds { phase, .. }
            | SeedError::Transaction { phase, .. }
            | SeedError::Generate { phase, .. }
            | SeedError::Query { phase, .. }
            | SeedError::Decode { phase, .. } => Some(*phase),
        }
    }

    pub fn table(&self) -> Option<Table> {
        match self {
            SeedError::Insert { table, .. }
            | SeedError::FetchIds { table, .. }
            | SeedError::Generate { table, .. } => Some(*table),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("report {report}: query failed: {source}")]
    Query {
        report: &'static str,
        #[source]
        source: EngineError,
    },

    #[error("report {report}: unexpected result: {source}")]
    Decode {
        report: &'static str,
        #[source]
        source: DecodeError,
    },

    #[error("writing {path:?} failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

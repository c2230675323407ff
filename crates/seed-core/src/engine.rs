//! Engine adapter seam.
//!
//! The provisioner, seeder and reporter only talk to [`Engine`] and
//! [`ConnectionProvider`]. Everything dialect- or driver-specific lives in
//! the adapter crates (`seed-mysql`, `seed-postgresql`).

use crate::dialect::AnalyticsQuery;
use crate::schema::{SchemaShape, Table};
use crate::values::{EntityRow, ResultRow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Engine Kinds and Connection Settings
// ============================================================================

/// The three relational targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[serde(alias = "postgres")]
    PostgreSql,
    MySql,
    MariaDb,
}

impl EngineKind {
    pub const ALL: [EngineKind; 3] = [EngineKind::PostgreSql, EngineKind::MySql, EngineKind::MariaDb];

    pub fn name(self) -> &'static str {
        match self {
            EngineKind::PostgreSql => "PostgreSQL",
            EngineKind::MySql => "MySQL",
            EngineKind::MariaDb => "MariaDB",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            EngineKind::PostgreSql => 5432,
            EngineKind::MySql => 3306,
            EngineKind::MariaDb => 3308,
        }
    }

    /// MySQL and MariaDB share a dialect and a driver.
    pub fn is_mysql_family(self) -> bool {
        matches!(self, EngineKind::MySql | EngineKind::MariaDb)
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(EngineKind::PostgreSql),
            "mysql" => Ok(EngineKind::MySql),
            "mariadb" => Ok(EngineKind::MariaDb),
            other => Err(format!("unknown engine '{other}'")),
        }
    }
}

/// Which database a connection should be opened against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectTarget {
    /// Server-level connection used to drop and create the target database.
    Server,
    /// Connection to the target database itself.
    Database,
}

/// Connection parameters for one engine run.
#[derive(Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub kind: EngineKind,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Target database, dropped and recreated by provisioning.
    pub database: String,
    /// Database used for server connections. PostgreSQL needs one,
    /// MySQL connects without a default database.
    pub maintenance_database: Option<String>,
}

impl EngineConfig {
    pub fn new(
        kind: EngineKind,
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        let maintenance_database = match kind {
            EngineKind::PostgreSql => Some("postgres".to_string()),
            EngineKind::MySql | EngineKind::MariaDb => None,
        };
        Self {
            kind,
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
            database: database.into(),
            maintenance_database,
        }
    }

    pub fn with_maintenance_database(mut self, database: Option<String>) -> Self {
        self.maintenance_database = database;
        self
    }

    /// Database name to select for the given target, if any.
    pub fn database_for(&self, target: ConnectTarget) -> Option<&str> {
        match target {
            ConnectTarget::Server => self.maintenance_database.as_deref(),
            ConnectTarget::Database => Some(&self.database),
        }
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("kind", &self.kind)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("maintenance_database", &self.maintenance_database)
            .finish()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors raised by engine adapters.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Error reported by the underlying driver.
    #[error("{engine} error: {source}")]
    Driver {
        engine: EngineKind,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A CREATE TABLE statement failed.
    #[error("creating table {table} failed: {source}")]
    Ddl {
        table: Table,
        #[source]
        source: Box<EngineError>,
    },

    /// A value could not be bound to its column.
    #[error("cannot bind {found} value to {table}.{column}")]
    Bind {
        table: Table,
        column: &'static str,
        found: &'static str,
    },

    /// A constraint rejected the statement.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// The connection was already closed.
    #[error("connection closed")]
    Closed,

    /// Anything else the adapter could not do.
    #[error("{0}")]
    Other(String),
}

impl EngineError {
    pub fn driver(
        engine: EngineKind,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Driver {
            engine,
            source: source.into(),
        }
    }
}

// ============================================================================
// Adapter Traits
// ============================================================================

/// An open connection to one engine.
///
/// Implementations issue one statement per call and never retry.
/// `close` must be called on every exit path; the caller owns that.
#[async_trait::async_trait]
pub trait Engine: Send {
    fn kind(&self) -> EngineKind;

    /// Drop `database` if present (ending other sessions where the engine
    /// requires it) and create it empty. Requires a server connection.
    async fn drop_and_create_database(&mut self, database: &str) -> Result<(), EngineError>;

    /// Create the given tables, in order, in the connected database.
    async fn apply_schema(&mut self, tables: &[Table]) -> Result<(), EngineError>;

    async fn begin(&mut self) -> Result<(), EngineError>;

    async fn commit(&mut self) -> Result<(), EngineError>;

    /// Insert rows with one multi-row INSERT. Returns the number of rows.
    async fn insert_batch(&mut self, table: Table, rows: &[EntityRow]) -> Result<u64, EngineError>;

    /// All primary keys of `table`, ascending.
    async fn fetch_ids(&mut self, table: Table) -> Result<Vec<i64>, EngineError>;

    async fn run_query(&mut self, query: &AnalyticsQuery) -> Result<Vec<ResultRow>, EngineError>;

    /// Tables and columns of the connected database.
    async fn describe_schema(&mut self) -> Result<SchemaShape, EngineError>;

    /// Release the connection. An open transaction is rolled back.
    async fn close(&mut self) -> Result<(), EngineError>;
}

/// Opens engine connections from explicit configuration.
#[async_trait::async_trait]
pub trait ConnectionProvider: Send + Sync {
    async fn connect(
        &self,
        config: &EngineConfig,
        target: ConnectTarget,
    ) -> Result<Box<dyn Engine>, EngineError>;
}

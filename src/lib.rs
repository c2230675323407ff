//! negocio-seed library
//!
//! Provisions the ten-table `negocio` schema on PostgreSQL, MySQL and
//! MariaDB, fills it with dependency-ordered synthetic data and exports
//! analytical reports as JSON.
//!
//! # Features
//!
//! - Provisioning: drop, recreate and apply the same logical schema on every engine
//! - Seeding: five phases by foreign-key level, ids read back after each commit
//! - Reports: three analytical JSON reports plus a cross-engine extract
//! - Failure isolation: one engine failing never stops the others
//!
//! # Crates
//!
//! - `seed_core` - schema, categories, values and the engine seam
//! - `seed_generator` - synthetic row generation
//! - `seed_postgresql` - PostgreSQL adapter over `tokio-postgres`
//! - `seed_mysql` - MySQL/MariaDB adapter over `mysql_async`
//!
//! # CLI Usage
//!
//! ```bash
//! # Recreate the schema on all three engines
//! negocio-seed provision
//!
//! # Seed with a larger base and verify foreign keys afterwards
//! negocio-seed seed --base-multiplier 50 --verify
//!
//! # One report from one engine
//! negocio-seed report --report top-risk-zones --engine mysql --output zonas.json
//!
//! # Everything: provision, seed, export
//! negocio-seed --config negocio.yaml run
//! ```

use clap::Args;
use seed_core::EngineKind;

pub mod config;
pub mod connect;
pub mod error;
pub mod provision;
pub mod report;
pub mod seed;
pub mod testing;

pub use config::{Overrides, RunConfig};
pub use connect::DriverProvider;
pub use error::{ConnectionError, ProvisionError, ReportError, SeedError};

/// Connection options shared by every subcommand. Values given here win
/// over the config file.
#[derive(Args, Clone, Debug, Default)]
pub struct ConnectionOpts {
    /// Database host
    #[arg(long, env = "NEGOCIO_HOST", global = true)]
    pub host: Option<String>,

    /// Database user
    #[arg(long, env = "NEGOCIO_USER", global = true)]
    pub user: Option<String>,

    /// Database password
    #[arg(long, env = "NEGOCIO_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Target database name
    #[arg(long, env = "NEGOCIO_DATABASE", global = true)]
    pub database: Option<String>,

    /// Engines to operate on, comma separated (postgresql,mysql,mariadb)
    #[arg(long, env = "NEGOCIO_ENGINES", value_delimiter = ',', global = true)]
    pub engines: Option<Vec<EngineKind>>,
}

impl From<ConnectionOpts> for Overrides {
    fn from(opts: ConnectionOpts) -> Self {
        Self {
            host: opts.host,
            user: opts.user,
            password: opts.password,
            database: opts.database,
            engines: opts.engines,
        }
    }
}

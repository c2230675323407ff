//! Run configuration: YAML file values, overridden by CLI flags.
//!
//! ```yaml
//! connection:
//!   host: localhost
//!   user: user
//!   password: user123
//!   database: negocio
//! engines:
//!   - kind: postgresql
//!     port: 5432
//!   - kind: mariadb
//!     port: 3308
//! seed:
//!   base: 15
//!   batch_size: 100
//!   rng_seed: 42
//!   multipliers:
//!     reporte: 3
//! report:
//!   output_dir: reports
//!   correlation_window: 2d
//!   limit: 5
//! ```
//!
//! Every section and field is optional; missing values take the defaults
//! shown above.

pub mod duration;

use crate::report::{ExportPlan, ReportId, ReportOptions, DEFAULT_LIMIT};
use crate::seed::{
    Multipliers, SeedCounts, SeedPlan, DEFAULT_BASE, DEFAULT_BATCH_SIZE, DEFAULT_RNG_SEED,
};
use anyhow::Context;
use seed_core::{EngineConfig, EngineKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub connection: ConnectionSettings,
    pub engines: Vec<EngineEntry>,
    pub seed: SeedSettings,
    pub report: ReportSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            user: "user".to_string(),
            password: "user123".to_string(),
            database: "negocio".to_string(),
        }
    }
}

/// One engine to operate on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineEntry {
    pub kind: EngineKind,
    /// Defaults to the engine's conventional port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Database used for server connections (PostgreSQL only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl EngineEntry {
    pub fn new(kind: EngineKind) -> Self {
        Self {
            kind,
            port: None,
            maintenance_database: None,
            host: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedSettings {
    pub base: u32,
    pub multipliers: Multipliers,
    pub batch_size: usize,
    pub rng_seed: u64,
    /// Run the orphan anti-join after seeding.
    pub verify: bool,
}

impl Default for SeedSettings {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE,
            multipliers: Multipliers::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            rng_seed: DEFAULT_RNG_SEED,
            verify: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub output_dir: PathBuf,
    /// Duration string: "2d", "48h", "90m", "3600".
    pub correlation_window: String,
    pub limit: u32,
    pub assignments: ReportAssignments,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            correlation_window: "2d".to_string(),
            limit: DEFAULT_LIMIT,
            assignments: ReportAssignments::default(),
        }
    }
}

/// Engine each report is exported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportAssignments {
    pub top_risk_zones: EngineKind,
    pub user_efficiency: EngineKind,
    pub sensor_correlation: EngineKind,
}

impl Default for ReportAssignments {
    fn default() -> Self {
        Self {
            top_risk_zones: ReportId::TopRiskZones.default_engine(),
            user_efficiency: ReportId::UserEfficiency.default_engine(),
            sensor_correlation: ReportId::SensorCorrelation.default_engine(),
        }
    }
}

impl ReportAssignments {
    pub fn engine_for(&self, id: ReportId) -> EngineKind {
        match id {
            ReportId::TopRiskZones => self.top_risk_zones,
            ReportId::UserEfficiency => self.user_efficiency,
            ReportId::SensorCorrelation => self.sensor_correlation,
        }
    }
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub engines: Option<Vec<EngineKind>>,
}

impl RunConfig {
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse run configuration")
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path:?}"))?;
        Self::from_yaml(&yaml).with_context(|| format!("Invalid config file {path:?}"))
    }

    /// Load `path` if given, otherwise start from the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(host) = overrides.host {
            self.connection.host = host;
        }
        if let Some(user) = overrides.user {
            self.connection.user = user;
        }
        if let Some(password) = overrides.password {
            self.connection.password = password;
        }
        if let Some(database) = overrides.database {
            self.connection.database = database;
        }
        if let Some(kinds) = overrides.engines {
            // Keep per-engine settings from the file for engines still selected.
            self.engines = kinds
                .into_iter()
                .map(|kind| {
                    self.engines
                        .iter()
                        .find(|e| e.kind == kind)
                        .cloned()
                        .unwrap_or_else(|| EngineEntry::new(kind))
                })
                .collect();
        }
    }

    fn entries(&self) -> Vec<EngineEntry> {
        if self.engines.is_empty() {
            EngineKind::ALL.into_iter().map(EngineEntry::new).collect()
        } else {
            self.engines.clone()
        }
    }

    fn build_engine_config(&self, entry: &EngineEntry) -> EngineConfig {
        let config = EngineConfig::new(
            entry.kind,
            entry.host.as_deref().unwrap_or(&self.connection.host),
            entry.port.unwrap_or_else(|| entry.kind.default_port()),
            self.connection.user.clone(),
            self.connection.password.clone(),
            self.connection.database.clone(),
        );
        match &entry.maintenance_database {
            Some(db) => config.with_maintenance_database(Some(db.clone())),
            None => config,
        }
    }

    /// Connection settings for every selected engine, in order.
    pub fn engine_configs(&self) -> Vec<EngineConfig> {
        self.entries()
            .iter()
            .map(|entry| self.build_engine_config(entry))
            .collect()
    }

    /// Connection settings for `kind`, whether or not it is selected.
    pub fn engine_config(&self, kind: EngineKind) -> EngineConfig {
        let entry = self
            .entries()
            .into_iter()
            .find(|e| e.kind == kind)
            .unwrap_or_else(|| EngineEntry::new(kind));
        self.build_engine_config(&entry)
    }

    pub fn seed_plan(&self) -> SeedPlan {
        SeedPlan {
            counts: SeedCounts {
                base: self.seed.base,
                multipliers: self.seed.multipliers,
            },
            batch_size: self.seed.batch_size,
        }
    }

    pub fn report_options(&self) -> anyhow::Result<ReportOptions> {
        let correlation_window_secs =
            duration::parse_duration_to_secs(&self.report.correlation_window)
                .context("Invalid report.correlation_window")?;
        if correlation_window_secs == 0 {
            anyhow::bail!("report.correlation_window must be longer than zero");
        }
        Ok(ReportOptions {
            limit: self.report.limit,
            correlation_window_secs,
        })
    }

    /// Standard export: each report from its assigned engine, the
    /// cross-engine extract over every selected engine.
    pub fn export_plan(&self, output_dir: Option<PathBuf>) -> anyhow::Result<ExportPlan> {
        Ok(ExportPlan {
            output_dir: output_dir.unwrap_or_else(|| self.report.output_dir.clone()),
            assignments: ReportId::ALL
                .into_iter()
                .map(|id| (id, self.engine_config(self.report.assignments.engine_for(id))))
                .collect(),
            extract_engines: self.engine_configs(),
            options: self.report_options()?,
        })
    }
}

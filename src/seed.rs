//! Dependency-ordered seeding.
//!
//! Tables are filled in five phases, one per dependency level. Each phase
//! runs in its own transaction; once it commits, the primary keys of the
//! tables it publishes are read back and become the foreign-key pools of
//! the following phases. No child row is ever generated before its parent
//! ids have been committed and fetched.
//!
//! ```text
//! root       Usuario, Zona                         → pools: Usuario, Zona
//! level-1    Reporte, Sensor                       → pools: Reporte, Sensor
//! level-2    RegistroSensor, Comentario,
//!            Multimedia, Alerta                    → pools: RegistroSensor
//! analysis   Indicador (one per reading ⋈ sensor)  → pools: Indicador
//! report     Informe (one per Indicador)
//! ```

use crate::connect::{close_engine, open_engine};
use crate::error::SeedError;
use seed_core::{
    AnalyticsQuery, ConnectTarget, ConnectionProvider, DecodeError, Engine, EngineConfig,
    EngineKind, EntityRow, IdPools, Table,
};
use seed_generator::EntityGenerator;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error, info};

/// Default batch size for INSERT operations.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Default base multiplier.
pub const DEFAULT_BASE: u32 = 15;

/// Default RNG seed.
pub const DEFAULT_RNG_SEED: u64 = 42;

// ============================================================================
// Row Counts
// ============================================================================

/// Per-table multipliers of the base count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Multipliers {
    pub usuario: u32,
    pub zona: u32,
    pub reporte: u32,
    pub sensor: u32,
    pub registro_sensor: u32,
    pub comentario: u32,
    pub multimedia: u32,
    pub alerta: u32,
}

impl Default for Multipliers {
    fn default() -> Self {
        Self {
            usuario: 2,
            zona: 1,
            reporte: 3,
            sensor: 1,
            registro_sensor: 4,
            comentario: 2,
            multimedia: 1,
            alerta: 1,
        }
    }
}

impl Multipliers {
    /// Multiplier for a directly counted table. `None` for derived tables.
    pub fn for_table(&self, table: Table) -> Option<u32> {
        match table {
            Table::Usuario => Some(self.usuario),
            Table::Zona => Some(self.zona),
            Table::Reporte => Some(self.reporte),
            Table::Sensor => Some(self.sensor),
            Table::RegistroSensor => Some(self.registro_sensor),
            Table::Comentario => Some(self.comentario),
            Table::Multimedia => Some(self.multimedia),
            Table::Alerta => Some(self.alerta),
            Table::Indicador | Table::Informe => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedCounts {
    pub base: u32,
    pub multipliers: Multipliers,
}

impl Default for SeedCounts {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE,
            multipliers: Multipliers::default(),
        }
    }
}

impl SeedCounts {
    /// Rows to generate for a directly counted table.
    pub fn rows(&self, table: Table) -> usize {
        self.multipliers
            .for_table(table)
            .map_or(0, |m| self.base as usize * m as usize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedPlan {
    pub counts: SeedCounts,
    pub batch_size: usize,
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self {
            counts: SeedCounts::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

// ============================================================================
// Phases
// ============================================================================

/// How many rows a step inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTarget {
    /// `base * multiplier` rows.
    Fixed,
    /// One row per reading joined to its sensor.
    DerivedFromReadings,
    /// One row per id in the parent pool.
    OnePerParent(Table),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStep {
    pub table: Table,
    pub target: RowTarget,
}

impl TableStep {
    const fn fixed(table: Table) -> Self {
        Self {
            table,
            target: RowTarget::Fixed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseDescriptor {
    pub name: &'static str,
    pub steps: &'static [TableStep],
    /// Tables whose ids are re-fetched after the phase commits.
    pub publishes: &'static [Table],
}

pub const PHASES: [PhaseDescriptor; 5] = [
    PhaseDescriptor {
        name: "root",
        steps: &[TableStep::fixed(Table::Usuario), TableStep::fixed(Table::Zona)],
        publishes: &[Table::Usuario, Table::Zona],
    },
    PhaseDescriptor {
        name: "level-1",
        steps: &[TableStep::fixed(Table::Reporte), TableStep::fixed(Table::Sensor)],
        publishes: &[Table::Reporte, Table::Sensor],
    },
    PhaseDescriptor {
        name: "level-2",
        steps: &[
            TableStep::fixed(Table::RegistroSensor),
            TableStep::fixed(Table::Comentario),
            TableStep::fixed(Table::Multimedia),
            TableStep::fixed(Table::Alerta),
        ],
        publishes: &[Table::RegistroSensor],
    },
    PhaseDescriptor {
        name: "analysis",
        steps: &[TableStep {
            table: Table::Indicador,
            target: RowTarget::DerivedFromReadings,
        }],
        publishes: &[Table::Indicador],
    },
    PhaseDescriptor {
        name: "report",
        steps: &[TableStep {
            table: Table::Informe,
            target: RowTarget::OnePerParent(Table::Indicador),
        }],
        publishes: &[],
    },
];

// ============================================================================
// Summary
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseSummary {
    pub name: &'static str,
    pub inserted: Vec<(Table, u64)>,
    pub pools: Vec<(Table, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub engine: EngineKind,
    pub phases: Vec<PhaseSummary>,
}

impl SeedSummary {
    /// Rows inserted into `table` across all phases.
    pub fn inserted(&self, table: Table) -> u64 {
        self.phases
            .iter()
            .flat_map(|p| &p.inserted)
            .filter(|(t, _)| *t == table)
            .map(|(_, n)| n)
            .sum()
    }

    pub fn total_rows(&self) -> u64 {
        self.phases
            .iter()
            .flat_map(|p| &p.inserted)
            .map(|(_, n)| n)
            .sum()
    }

    /// Size of the pool published for `table`, if it was published.
    pub fn pool_size(&self, table: Table) -> Option<usize> {
        self.phases
            .iter()
            .flat_map(|p| &p.pools)
            .find(|(t, _)| *t == table)
            .map(|(_, n)| *n)
    }
}

// ============================================================================
// Driver
// ============================================================================

/// Seed every table of a provisioned, empty database.
///
/// Phases already committed stay in place when a later phase fails; the
/// failed phase's transaction is left open and is rolled back when the
/// caller closes the engine.
pub async fn seed(
    engine: &mut dyn Engine,
    plan: &SeedPlan,
    generator: &mut EntityGenerator,
) -> Result<SeedSummary, SeedError> {
    let kind = engine.kind();
    let mut pools = IdPools::new();
    let mut phases = Vec::with_capacity(PHASES.len());

    for phase in &PHASES {
        let started = Instant::now();
        info!(engine = %kind, phase = phase.name, "Starting phase");

        engine
            .begin()
            .await
            .map_err(|source| SeedError::Transaction {
                phase: phase.name,
                source,
            })?;

        let mut summary = PhaseSummary {
            name: phase.name,
            ..Default::default()
        };

        for step in phase.steps {
            let rows = build_rows(engine, phase.name, step, plan, generator, &pools).await?;
            let inserted = insert_rows(engine, phase.name, step.table, &rows, plan.batch_size).await?;
            info!(engine = %kind, phase = phase.name, table = %step.table, rows = inserted, "Inserted rows");
            summary.inserted.push((step.table, inserted));
        }

        engine
            .commit()
            .await
            .map_err(|source| SeedError::Transaction {
                phase: phase.name,
                source,
            })?;

        for table in phase.publishes {
            let ids = engine
                .fetch_ids(*table)
                .await
                .map_err(|source| SeedError::FetchIds {
                    phase: phase.name,
                    table: *table,
                    source,
                })?;
            debug!(engine = %kind, phase = phase.name, table = %table, pool = ids.len(), "Published pool");
            summary.pools.push((*table, ids.len()));
            pools.publish(*table, ids);
        }

        info!(
            engine = %kind,
            phase = phase.name,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Finished phase"
        );
        phases.push(summary);
    }

    Ok(SeedSummary {
        engine: kind,
        phases,
    })
}

async fn build_rows(
    engine: &mut dyn Engine,
    phase: &'static str,
    step: &TableStep,
    plan: &SeedPlan,
    generator: &mut EntityGenerator,
    pools: &IdPools,
) -> Result<Vec<EntityRow>, SeedError> {
    let generate = |count: usize, generator: &mut EntityGenerator| {
        (0..count)
            .map(|_| generator.generate(step.table, pools))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| SeedError::Generate {
                phase,
                table: step.table,
                source,
            })
    };

    match step.target {
        RowTarget::Fixed => generate(plan.counts.rows(step.table), generator),
        RowTarget::OnePerParent(parent) => generate(pools.len(parent), generator),
        RowTarget::DerivedFromReadings => {
            let pairs = engine
                .run_query(&AnalyticsQuery::ReadingZones)
                .await
                .map_err(|source| SeedError::Query { phase, source })?;
            pairs
                .iter()
                .map(|row| -> Result<EntityRow, DecodeError> {
                    let registro = row.int(0)?;
                    let zona = row.int(1)?;
                    Ok(generator.indicador(registro, zona))
                })
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| SeedError::Decode { phase, source })
        }
    }
}

async fn insert_rows(
    engine: &mut dyn Engine,
    phase: &'static str,
    table: Table,
    rows: &[EntityRow],
    batch_size: usize,
) -> Result<u64, SeedError> {
    let batch_size = batch_size.clamp(1, table.max_batch_rows());
    let mut inserted = 0;
    for batch in rows.chunks(batch_size) {
        inserted += engine
            .insert_batch(table, batch)
            .await
            .map_err(|source| SeedError::Insert {
                phase,
                table,
                source,
            })?;
    }
    Ok(inserted)
}

// ============================================================================
// Referential Integrity
// ============================================================================

/// Result of one orphan anti-join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanCheck {
    pub child: Table,
    pub column: &'static str,
    pub parent: Table,
    pub orphans: i64,
}

/// Count child rows whose foreign key has no parent, for every foreign key.
pub async fn verify_referential_integrity(
    engine: &mut dyn Engine,
) -> Result<Vec<OrphanCheck>, SeedError> {
    const PHASE: &str = "verify";
    let mut checks = Vec::new();

    for child in Table::ALL {
        for (column, parent) in child.foreign_keys() {
            let rows = engine
                .run_query(&AnalyticsQuery::OrphanCount {
                    child,
                    column: column.name,
                    parent,
                })
                .await
                .map_err(|source| SeedError::Query { phase: PHASE, source })?;
            let orphans = match rows.first() {
                Some(row) => row
                    .int(0)
                    .map_err(|source| SeedError::Decode { phase: PHASE, source })?,
                None => 0,
            };
            checks.push(OrphanCheck {
                child,
                column: column.name,
                parent,
                orphans,
            });
        }
    }

    Ok(checks)
}

/// Connect to one engine's database, seed it and close the connection.
pub async fn seed_engine(
    provider: &dyn ConnectionProvider,
    config: &EngineConfig,
    plan: &SeedPlan,
    rng_seed: u64,
    verify: bool,
) -> Result<SeedSummary, SeedError> {
    let mut engine = open_engine(provider, config, ConnectTarget::Database).await?;
    let mut generator = EntityGenerator::new(rng_seed);

    let result = match seed(engine.as_mut(), plan, &mut generator).await {
        Ok(summary) if verify => verify_referential_integrity(engine.as_mut())
            .await
            .map(|checks| {
                for check in checks.iter().filter(|c| c.orphans > 0) {
                    error!(
                        engine = %config.kind,
                        child = %check.child,
                        column = check.column,
                        parent = %check.parent,
                        orphans = check.orphans,
                        "Orphaned foreign keys"
                    );
                }
                summary
            }),
        other => other,
    };

    close_engine(engine.as_mut()).await;
    result
}

/// Seed each engine independently. A failing engine is logged and skipped.
pub async fn seed_all(
    provider: &dyn ConnectionProvider,
    configs: &[EngineConfig],
    plan: &SeedPlan,
    rng_seed: u64,
    verify: bool,
) -> Vec<(EngineKind, Result<SeedSummary, SeedError>)> {
    let mut results = Vec::with_capacity(configs.len());
    for config in configs {
        let result = seed_engine(provider, config, plan, rng_seed, verify).await;
        match &result {
            Ok(summary) => info!(
                engine = %config.kind,
                port = config.port,
                rows = summary.total_rows(),
                "Seeding complete"
            ),
            Err(e) => error!(
                engine = %config.kind,
                port = config.port,
                phase = e.phase().unwrap_or("connect"),
                "Seeding failed: {e}"
            ),
        }
        results.push((config.kind, result));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_counts() {
        let counts = SeedCounts::default();
        assert_eq!(counts.rows(Table::Usuario), 30);
        assert_eq!(counts.rows(Table::Zona), 15);
        assert_eq!(counts.rows(Table::Reporte), 45);
        assert_eq!(counts.rows(Table::Sensor), 15);
        assert_eq!(counts.rows(Table::RegistroSensor), 60);
        assert_eq!(counts.rows(Table::Comentario), 30);
        assert_eq!(counts.rows(Table::Multimedia), 15);
        assert_eq!(counts.rows(Table::Alerta), 15);
        assert_eq!(counts.rows(Table::Indicador), 0);
    }

    #[test]
    fn test_phases_cover_every_table_once() {
        let mut seen: Vec<Table> = PHASES
            .iter()
            .flat_map(|p| p.steps.iter().map(|s| s.table))
            .collect();
        seen.sort();
        assert_eq!(seen, Table::ALL.to_vec());
    }

    #[test]
    fn test_parents_published_before_children() {
        let mut published: Vec<Table> = Vec::new();
        for phase in &PHASES {
            for step in phase.steps {
                for (column, parent) in step.table.foreign_keys() {
                    // Indicador keys come from the reading join, not a pool.
                    if step.target == RowTarget::DerivedFromReadings {
                        continue;
                    }
                    assert!(
                        published.contains(&parent),
                        "{}.{} needs {parent} before phase {}",
                        step.table,
                        column.name,
                        phase.name
                    );
                }
            }
            published.extend(phase.publishes);
        }
    }

    #[tokio::test]
    async fn test_oversized_batch_size_is_split() {
        use crate::testing::{fixtures, MemoryProvider};

        let provider = MemoryProvider::new();
        let config = MemoryProvider::config(EngineKind::PostgreSql);
        let mut server = provider.connect(&config, ConnectTarget::Server).await.unwrap();
        server.drop_and_create_database("negocio").await.unwrap();
        server.close().await.unwrap();
        let mut engine = provider
            .connect(&config, ConnectTarget::Database)
            .await
            .unwrap();
        engine.apply_schema(&Table::ALL).await.unwrap();

        let rows = vec![fixtures::zona("Cádiz"); Table::Zona.max_batch_rows() + 10];
        let inserted = insert_rows(engine.as_mut(), "root", Table::Zona, &rows, usize::MAX)
            .await
            .unwrap();
        engine.close().await.unwrap();

        assert_eq!(inserted, rows.len() as u64);
        assert_eq!(
            provider.row_count(EngineKind::PostgreSql, "negocio", Table::Zona),
            rows.len()
        );
    }

    #[test]
    fn test_multipliers_yaml_defaults() {
        let m: Multipliers = serde_yaml::from_str("reporte: 5").unwrap();
        assert_eq!(m.reporte, 5);
        assert_eq!(m.usuario, 2);
    }
}

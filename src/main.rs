//! Command-line interface for negocio-seed
//!
//! # Usage Examples
//!
//! ## Provisioning
//! ```bash
//! # Recreate the negocio schema on every engine
//! negocio-seed provision
//!
//! # Only PostgreSQL, against a remote host
//! negocio-seed --engines postgresql --host db.internal provision
//! ```
//!
//! ## Seeding
//! ```bash
//! # Default volumes (base 15) with a fixed RNG seed
//! negocio-seed seed --seed 7
//!
//! # Larger volumes, then count orphaned foreign keys
//! negocio-seed seed --base-multiplier 100 --batch-size 500 --verify
//! ```
//!
//! ## Reports
//! ```bash
//! # One report, printed to stdout
//! negocio-seed report --report user-efficiency --engine postgresql
//!
//! # Standard export into ./reports
//! negocio-seed export --output-dir reports
//!
//! # Provision, seed and export in one go
//! negocio-seed --config negocio.yaml run
//! ```

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use negocio_seed::provision::{describe, provision_all};
use negocio_seed::report::{self, ReportId};
use negocio_seed::seed::seed_all;
use negocio_seed::{ConnectionOpts, DriverProvider, RunConfig};
use seed_core::{ConnectionProvider, EngineConfig, EngineKind, SchemaShape, Table};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "negocio-seed")]
#[command(about = "Provision, seed and report on the negocio schema across PostgreSQL, MySQL and MariaDB")]
#[command(long_about = None)]
struct Cli {
    /// YAML run configuration
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    connection: ConnectionOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop, recreate and apply the schema on every selected engine
    Provision,

    /// Fill provisioned databases with synthetic data
    Seed(SeedArgs),

    /// Run one report against one engine
    Report {
        /// Report to run
        #[arg(long, value_enum)]
        report: ReportId,

        /// Engine to query (default: the report's assigned engine)
        #[arg(long)]
        engine: Option<EngineKind>,

        /// Write the document here instead of stdout
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: ReportArgs,
    },

    /// Export the three reports and the cross-engine extract
    Export {
        /// Directory for the JSON files
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        options: ReportArgs,
    },

    /// Provision, seed, then export
    Run {
        #[command(flatten)]
        seed: SeedArgs,

        /// Directory for the JSON files
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        options: ReportArgs,
    },
}

#[derive(Args, Clone, Debug, Default)]
struct SeedArgs {
    /// Base row count; each table gets base times its multiplier
    #[arg(long, value_name = "N")]
    base_multiplier: Option<u32>,

    /// Rows per INSERT statement
    #[arg(long, value_name = "N")]
    batch_size: Option<usize>,

    /// RNG seed for the generator
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Count orphaned foreign keys after seeding
    #[arg(long)]
    verify: bool,
}

impl SeedArgs {
    fn apply(self, config: &mut RunConfig) {
        if let Some(base) = self.base_multiplier {
            config.seed.base = base;
        }
        if let Some(batch_size) = self.batch_size {
            config.seed.batch_size = batch_size;
        }
        if let Some(seed) = self.seed {
            config.seed.rng_seed = seed;
        }
        config.seed.verify |= self.verify;
    }
}

#[derive(Args, Clone, Debug, Default)]
struct ReportArgs {
    /// Rows per report
    #[arg(long, value_name = "N")]
    limit: Option<u32>,

    /// How long before a reading a report still counts (e.g. 2d, 48h, 3600)
    #[arg(long, value_name = "DURATION")]
    correlation_window: Option<String>,
}

impl ReportArgs {
    fn apply(self, config: &mut RunConfig) {
        if let Some(limit) = self.limit {
            config.report.limit = limit;
        }
        if let Some(window) = self.correlation_window {
            config.report.correlation_window = window;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();

    let mut config = RunConfig::load(cli.config.as_deref())?;
    config.apply_overrides(cli.connection.into());
    let provider = DriverProvider;

    match cli.command {
        Commands::Provision => {
            run_provision(&provider, &config.engine_configs()).await;
        }
        Commands::Seed(args) => {
            args.apply(&mut config);
            run_seed(&provider, &config, &config.engine_configs()).await;
        }
        Commands::Report {
            report,
            engine,
            output,
            options,
        } => {
            options.apply(&mut config);
            run_report(&provider, &config, report, engine, output).await?;
        }
        Commands::Export {
            output_dir,
            options,
        } => {
            options.apply(&mut config);
            run_export(&provider, &config, output_dir, None).await?;
        }
        Commands::Run {
            seed,
            output_dir,
            options,
        } => {
            seed.apply(&mut config);
            options.apply(&mut config);
            // Validate report settings before touching any database.
            config.report_options()?;

            let provisioned = run_provision(&provider, &config.engine_configs()).await;
            run_seed(&provider, &config, &provisioned).await;
            run_export(&provider, &config, output_dir, Some(&provisioned)).await?;
        }
    }

    Ok(())
}

/// Provision every engine and check the resulting schema. Returns the
/// engines that were provisioned.
async fn run_provision(
    provider: &dyn ConnectionProvider,
    configs: &[EngineConfig],
) -> Vec<EngineConfig> {
    let expected = SchemaShape::from_tables(&Table::ALL);
    let mut provisioned = Vec::new();

    let results = provision_all(provider, configs).await;
    for (config, (_, result)) in configs.iter().zip(results) {
        if result.is_err() {
            continue;
        }
        match describe(provider, config).await {
            Ok(shape) if shape == expected => {
                info!(engine = %config.kind, tables = Table::ALL.len(), "Schema verified");
            }
            Ok(_) => warn!(engine = %config.kind, "Schema differs from the logical definition"),
            Err(e) => warn!(engine = %config.kind, "Could not read back schema: {e}"),
        }
        provisioned.push(config.clone());
    }

    info!(
        provisioned = provisioned.len(),
        failed = configs.len() - provisioned.len(),
        "Provisioning finished"
    );
    provisioned
}

async fn run_seed(provider: &dyn ConnectionProvider, config: &RunConfig, configs: &[EngineConfig]) {
    let plan = config.seed_plan();
    let results = seed_all(
        provider,
        configs,
        &plan,
        config.seed.rng_seed,
        config.seed.verify,
    )
    .await;
    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    info!(
        seeded = results.len() - failed,
        failed,
        base = plan.counts.base,
        "Seeding finished"
    );
}

async fn run_report(
    provider: &dyn ConnectionProvider,
    config: &RunConfig,
    id: ReportId,
    engine: Option<EngineKind>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let options = config.report_options()?;
    let kind = engine.unwrap_or_else(|| config.report.assignments.engine_for(id));
    let engine_config = config.engine_config(kind);

    let document = match report::run_report_on(provider, &engine_config, id, &options).await {
        Ok(document) => document,
        Err(e) => {
            error!(report = %id, engine = %kind, port = engine_config.port, "Report failed: {e}");
            return Ok(());
        }
    };

    match output {
        Some(path) => {
            report::write_json(&path, &document)
                .with_context(|| format!("Failed to write report to {path:?}"))?;
            info!(report = %id, engine = %kind, rows = document.rows.len(), path = ?path, "Report written");
        }
        None => println!("{}", report::to_json_string(&document)?),
    }
    Ok(())
}

/// Export the standard reports. With `only`, engines outside that list
/// are neither queried nor exported.
async fn run_export(
    provider: &dyn ConnectionProvider,
    config: &RunConfig,
    output_dir: Option<PathBuf>,
    only: Option<&[EngineConfig]>,
) -> anyhow::Result<()> {
    let mut plan = config.export_plan(output_dir)?;
    if let Some(engines) = only {
        plan = plan.restrict_to(engines);
    }
    let summary = report::export(provider, &plan)
        .await
        .with_context(|| format!("Export to {:?} failed", plan.output_dir))?;

    info!(
        written = summary.written.len(),
        failed = summary.failed.len(),
        extract_rows = summary.extract_rows,
        output_dir = ?plan.output_dir,
        "Export finished"
    );
    Ok(())
}

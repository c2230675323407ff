//! Live-engine tests
//!
//! These run against real PostgreSQL, MySQL and MariaDB servers and are
//! ignored by default. Run them with:
//!
//! ```bash
//! NEGOCIO_TEST_HOST=localhost NEGOCIO_TEST_PASSWORD=user123 \
//!   cargo test --test live_engines -- --ignored --test-threads=1
//! ```
//!
//! Environment: `NEGOCIO_TEST_HOST`, `NEGOCIO_TEST_USER`, `NEGOCIO_TEST_PASSWORD`,
//! `NEGOCIO_TEST_DATABASE` (default `negocio_test`, dropped and recreated),
//! and `NEGOCIO_TEST_{POSTGRESQL,MYSQL,MARIADB}_PORT`.

use negocio_seed::connect::{close_engine, open_engine};
use negocio_seed::provision::{describe, provision};
use negocio_seed::report::{export, ExportPlan, ReportId, ReportOptions, CROSS_ENGINE_FILE};
use negocio_seed::seed::{seed_engine, SeedCounts, SeedPlan};
use negocio_seed::DriverProvider;
use seed_core::{AnalyticsQuery, ConnectTarget, EngineConfig, EngineKind, SchemaShape, Table};

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn live_config(kind: EngineKind) -> EngineConfig {
    let port_var = format!("NEGOCIO_TEST_{}_PORT", format!("{kind:?}").to_uppercase());
    let port = std::env::var(port_var)
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(|| kind.default_port());
    EngineConfig::new(
        kind,
        env_or("NEGOCIO_TEST_HOST", "localhost"),
        port,
        env_or("NEGOCIO_TEST_USER", "user"),
        env_or("NEGOCIO_TEST_PASSWORD", "user123"),
        env_or("NEGOCIO_TEST_DATABASE", "negocio_test"),
    )
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("negocio_seed=debug")
        .try_init()
        .ok();
}

async fn row_count(config: &EngineConfig, table: Table) -> i64 {
    let mut engine = open_engine(&DriverProvider, config, ConnectTarget::Database)
        .await
        .unwrap();
    let rows = engine
        .run_query(&AnalyticsQuery::RowCount(table))
        .await
        .unwrap();
    close_engine(engine.as_mut()).await;
    rows[0].int(0).unwrap()
}

#[tokio::test]
#[ignore]
async fn test_live_schema_equivalence_and_idempotence() {
    init_tracing();
    let expected = SchemaShape::from_tables(&Table::ALL);

    for kind in EngineKind::ALL {
        let config = live_config(kind);
        provision(&DriverProvider, &config).await.unwrap();
        provision(&DriverProvider, &config).await.unwrap();

        let shape = describe(&DriverProvider, &config).await.unwrap();
        assert_eq!(shape, expected, "{kind}");
        assert_eq!(row_count(&config, Table::Usuario).await, 0, "{kind}");
    }
}

#[tokio::test]
#[ignore]
async fn test_live_seed_and_export() {
    init_tracing();
    let plan = SeedPlan {
        counts: SeedCounts::default(),
        batch_size: 25,
    };

    for kind in EngineKind::ALL {
        let config = live_config(kind);
        provision(&DriverProvider, &config).await.unwrap();
        let summary = seed_engine(&DriverProvider, &config, &plan, 42, true)
            .await
            .unwrap();

        assert_eq!(summary.inserted(Table::Reporte), 45, "{kind}");
        assert_eq!(row_count(&config, Table::Usuario).await, 30, "{kind}");
        assert_eq!(row_count(&config, Table::RegistroSensor).await, 60, "{kind}");
        assert_eq!(row_count(&config, Table::Indicador).await, 60, "{kind}");
        assert_eq!(row_count(&config, Table::Informe).await, 60, "{kind}");
    }

    let dir = tempfile::tempdir().unwrap();
    let export_plan = ExportPlan {
        output_dir: dir.path().to_path_buf(),
        assignments: ReportId::ALL
            .into_iter()
            .map(|id| (id, live_config(id.default_engine())))
            .collect(),
        extract_engines: EngineKind::ALL.into_iter().map(live_config).collect(),
        options: ReportOptions::default(),
    };
    let summary = export(&DriverProvider, &export_plan).await.unwrap();

    assert!(summary.failed.is_empty(), "{:?}", summary.failed);
    for id in ReportId::ALL {
        assert!(dir.path().join(id.file_name()).exists(), "{id}");
    }
    assert!(dir.path().join(CROSS_ENGINE_FILE).exists());
}

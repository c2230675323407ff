//! Schema provisioning: drop and recreate the database, then apply DDL.

use crate::connect::{close_engine, open_engine};
use crate::error::ProvisionError;
use seed_core::{ConnectTarget, ConnectionProvider, EngineConfig, EngineKind, SchemaShape, Table};
use tracing::{error, info};

/// Drop and recreate `config.database` and create every table in it.
///
/// Running it twice leaves the same empty schema.
pub async fn provision(
    provider: &dyn ConnectionProvider,
    config: &EngineConfig,
) -> Result<(), ProvisionError> {
    let mut server = open_engine(provider, config, ConnectTarget::Server).await?;
    let recreated = server
        .drop_and_create_database(&config.database)
        .await
        .map_err(|source| ProvisionError::Database {
            database: config.database.clone(),
            source,
        });
    close_engine(server.as_mut()).await;
    recreated?;
    info!(engine = %config.kind, database = %config.database, "Recreated database");

    let mut engine = open_engine(provider, config, ConnectTarget::Database).await?;
    let applied = engine
        .apply_schema(&Table::ALL)
        .await
        .map_err(ProvisionError::from_schema);
    close_engine(engine.as_mut()).await;
    applied?;

    info!(
        engine = %config.kind,
        tables = Table::ALL.len(),
        "Schema applied"
    );
    Ok(())
}

/// Provision each engine independently. A failing engine is logged and skipped.
pub async fn provision_all(
    provider: &dyn ConnectionProvider,
    configs: &[EngineConfig],
) -> Vec<(EngineKind, Result<(), ProvisionError>)> {
    let mut results = Vec::with_capacity(configs.len());
    for config in configs {
        let result = provision(provider, config).await;
        if let Err(e) = &result {
            error!(
                engine = %config.kind,
                port = config.port,
                "Provisioning failed: {e}"
            );
        }
        results.push((config.kind, result));
    }
    results
}

/// Tables and columns currently present in `config.database`.
pub async fn describe(
    provider: &dyn ConnectionProvider,
    config: &EngineConfig,
) -> Result<SchemaShape, ProvisionError> {
    let mut engine = open_engine(provider, config, ConnectTarget::Database).await?;
    let shape = engine
        .describe_schema()
        .await
        .map_err(ProvisionError::Describe);
    close_engine(engine.as_mut()).await;
    shape
}

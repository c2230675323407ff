//! Opening and closing engine connections.

use crate::error::ConnectionError;
use seed_core::{ConnectTarget, ConnectionProvider, Engine, EngineConfig, EngineError, EngineKind};
use tracing::{debug, warn};

/// Connects through the real drivers: `tokio-postgres` for PostgreSQL and
/// `mysql_async` for MySQL and MariaDB.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriverProvider;

#[async_trait::async_trait]
impl ConnectionProvider for DriverProvider {
    async fn connect(
        &self,
        config: &EngineConfig,
        target: ConnectTarget,
    ) -> Result<Box<dyn Engine>, EngineError> {
        match config.kind {
            EngineKind::PostgreSql => {
                let engine = seed_postgresql::connect(config, target).await?;
                Ok(Box::new(engine))
            }
            EngineKind::MySql | EngineKind::MariaDb => {
                let engine = seed_mysql::connect(config, target).await?;
                Ok(Box::new(engine))
            }
        }
    }
}

/// Open a connection, tagging failures with the engine and port.
pub async fn open_engine(
    provider: &dyn ConnectionProvider,
    config: &EngineConfig,
    target: ConnectTarget,
) -> Result<Box<dyn Engine>, ConnectionError> {
    debug!(engine = %config.kind, port = config.port, ?target, "Connecting");
    provider
        .connect(config, target)
        .await
        .map_err(|source| ConnectionError {
            engine: config.kind,
            port: config.port,
            source,
        })
}

/// Close a connection. A failure to close is only logged.
pub async fn close_engine(engine: &mut dyn Engine) {
    let kind = engine.kind();
    if let Err(e) = engine.close().await {
        warn!(engine = %kind, "Closing connection failed: {e}");
    }
}

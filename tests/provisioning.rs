//! Provisioning against the in-memory engines: idempotence, schema
//! equivalence and per-engine failure isolation.

use negocio_seed::provision::{describe, provision, provision_all};
use negocio_seed::testing::{fixtures, MemoryProvider};
use negocio_seed::ProvisionError;
use seed_core::{ConnectTarget, ConnectionProvider, EngineKind, SchemaShape, Table};

#[tokio::test]
async fn test_provision_creates_every_table() {
    let provider = MemoryProvider::new();
    let config = MemoryProvider::config(EngineKind::PostgreSql);

    provision(&provider, &config).await.unwrap();

    let shape = describe(&provider, &config).await.unwrap();
    assert_eq!(shape, SchemaShape::from_tables(&Table::ALL));
    assert_eq!(shape.table_names().count(), 10);
    assert!(shape.columns("registrosensor").unwrap().contains("id_sensor"));
    assert_eq!(provider.open_connections(EngineKind::PostgreSql), 0);
}

#[tokio::test]
async fn test_provisioning_twice_leaves_empty_schema() {
    let provider = MemoryProvider::new();
    let config = MemoryProvider::config(EngineKind::MySql);
    provision(&provider, &config).await.unwrap();
    let first = describe(&provider, &config).await.unwrap();

    // Put a row in, then provision again.
    let mut engine = provider
        .connect(&config, ConnectTarget::Database)
        .await
        .unwrap();
    engine
        .insert_batch(Table::Zona, &[fixtures::zona("Bilbao")])
        .await
        .unwrap();
    engine.close().await.unwrap();
    assert_eq!(provider.row_count(EngineKind::MySql, "negocio", Table::Zona), 1);

    provision(&provider, &config).await.unwrap();

    assert_eq!(describe(&provider, &config).await.unwrap(), first);
    for table in Table::ALL {
        assert_eq!(provider.row_count(EngineKind::MySql, "negocio", table), 0);
    }
}

#[tokio::test]
async fn test_schema_is_the_same_on_all_engines() {
    let provider = MemoryProvider::new();
    let configs = MemoryProvider::configs();

    let results = provision_all(&provider, &configs).await;
    assert!(results.iter().all(|(_, r)| r.is_ok()));

    let mut shapes = Vec::new();
    for config in &configs {
        shapes.push(describe(&provider, config).await.unwrap());
    }
    assert!(shapes.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn test_unreachable_engine_does_not_stop_the_others() {
    let provider = MemoryProvider::new();
    provider.set_unreachable(EngineKind::MySql, true);
    let configs = MemoryProvider::configs();

    let results = provision_all(&provider, &configs).await;

    let kinds: Vec<EngineKind> = results.iter().map(|(k, _)| *k).collect();
    assert_eq!(kinds, EngineKind::ALL.to_vec());
    assert!(results[0].1.is_ok());
    match &results[1].1 {
        Err(ProvisionError::Connection(e)) => {
            assert_eq!(e.engine, EngineKind::MySql);
            assert_eq!(e.port, 3306);
        }
        other => panic!("expected a connection error, got {other:?}"),
    }
    assert!(results[2].1.is_ok());
    assert!(provider.database_exists(EngineKind::MariaDb, "negocio"));
    assert!(!provider.database_exists(EngineKind::MySql, "negocio"));
}

#[tokio::test]
async fn test_ddl_failure_names_the_table() {
    let provider = MemoryProvider::new();
    provider.fail_ddl_on(EngineKind::MariaDb, Table::Sensor);
    let config = MemoryProvider::config(EngineKind::MariaDb);

    let err = provision(&provider, &config).await.unwrap_err();

    assert_eq!(err.table(), Some(Table::Sensor));
    assert!(err.to_string().contains("Sensor"));
    assert_eq!(provider.open_connections(EngineKind::MariaDb), 0);
}

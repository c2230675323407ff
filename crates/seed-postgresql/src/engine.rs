//! [`Engine`] implementation over a `tokio-postgres` client.

use crate::dialect::PostgresDialect;
use crate::error::{quote_identifier, PostgresAdapterError};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use seed_core::{
    AnalyticsQuery, ColumnType, ConnectTarget, Engine, EngineConfig, EngineError, EngineKind,
    EntityRow, ResultRow, SchemaShape, SqlDialect, SqlValue, Table,
};
use tokio::task::JoinHandle;
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Client, NoTls, Row};
use tracing::{debug, error, warn};

/// Open a connection for `config`. Server connections use the maintenance
/// database.
pub async fn connect(
    config: &EngineConfig,
    target: ConnectTarget,
) -> Result<PostgresEngine, EngineError> {
    let mut pg_config = tokio_postgres::Config::new();
    pg_config
        .host(&config.host)
        .port(config.port)
        .user(&config.user)
        .password(&config.password);
    if let Some(dbname) = config.database_for(target) {
        pg_config.dbname(dbname);
    }

    let (client, connection) = pg_config
        .connect(NoTls)
        .await
        .map_err(PostgresAdapterError::from)?;

    // Spawn the connection task
    let task = tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!("PostgreSQL connection error: {e}");
        }
    });

    debug!(
        "Connected to PostgreSQL at {}:{} ({:?})",
        config.host, config.port, target
    );

    Ok(PostgresEngine {
        client: Some(client),
        task: Some(task),
        in_transaction: false,
    })
}

/// A PostgreSQL connection.
pub struct PostgresEngine {
    client: Option<Client>,
    task: Option<JoinHandle<()>>,
    in_transaction: bool,
}

impl PostgresEngine {
    fn client(&self) -> Result<&Client, EngineError> {
        self.client.as_ref().ok_or(EngineError::Closed)
    }

    async fn execute(&self, sql: &str) -> Result<(), EngineError> {
        self.client()?
            .batch_execute(sql)
            .await
            .map_err(|e| PostgresAdapterError::from(e).into())
    }
}

#[async_trait::async_trait]
impl Engine for PostgresEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::PostgreSql
    }

    async fn drop_and_create_database(&mut self, database: &str) -> Result<(), EngineError> {
        let quoted = quote_identifier(database);

        let forced = format!("DROP DATABASE IF EXISTS {quoted} WITH (FORCE)");
        if let Err(e) = self.execute(&forced).await {
            // Servers before 13 lack WITH (FORCE); end other sessions by hand.
            warn!("Forced drop of {database} failed ({e}), terminating sessions instead");
            self.client()?
                .execute(
                    "SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
                     WHERE datname = $1 AND pid <> pg_backend_pid()",
                    &[&database],
                )
                .await
                .map_err(PostgresAdapterError::from)?;
            self.execute(&format!("DROP DATABASE IF EXISTS {quoted}"))
                .await?;
        }

        self.execute(&format!("CREATE DATABASE {quoted}")).await
    }

    async fn apply_schema(&mut self, tables: &[Table]) -> Result<(), EngineError> {
        for table in tables {
            let ddl = PostgresDialect.create_table(*table);
            debug!("Creating table {} on PostgreSQL", table);
            self.execute(&ddl).await.map_err(|e| EngineError::Ddl {
                table: *table,
                source: Box::new(e),
            })?;
        }
        Ok(())
    }

    async fn begin(&mut self) -> Result<(), EngineError> {
        self.execute("BEGIN").await?;
        self.in_transaction = true;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), EngineError> {
        self.execute("COMMIT").await?;
        self.in_transaction = false;
        Ok(())
    }

    async fn insert_batch(&mut self, table: Table, rows: &[EntityRow]) -> Result<u64, EngineError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let sql = PostgresDialect.insert_statement(table, rows.len());
        let columns = table.insert_columns();

        let mut params: Vec<Box<dyn ToSql + Sync + Send>> =
            Vec::with_capacity(rows.len() * columns.len());
        for row in rows {
            for (column, value) in columns.iter().zip(&row.values) {
                params.push(bind_value(table, column.name, column.column_type, value)?);
            }
        }

        // Convert to references for execution
        let param_refs: Vec<&(dyn ToSql + Sync)> = params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect();

        self.client()?
            .execute(&sql, &param_refs)
            .await
            .map_err(PostgresAdapterError::from)?;

        Ok(rows.len() as u64)
    }

    async fn fetch_ids(&mut self, table: Table) -> Result<Vec<i64>, EngineError> {
        let sql = PostgresDialect.select_ids(table);
        let rows = self
            .client()?
            .query(&sql, &[])
            .await
            .map_err(PostgresAdapterError::from)?;

        rows.iter()
            .map(|row| {
                row.try_get::<_, i32>(0)
                    .map(i64::from)
                    .map_err(|e| PostgresAdapterError::from(e).into())
            })
            .collect()
    }

    async fn run_query(&mut self, query: &AnalyticsQuery) -> Result<Vec<ResultRow>, EngineError> {
        let sql = PostgresDialect.render(query);
        let rows = self
            .client()?
            .query(&sql, &[])
            .await
            .map_err(PostgresAdapterError::from)?;

        rows.iter()
            .map(|row| decode_row(row).map_err(EngineError::from))
            .collect()
    }

    async fn describe_schema(&mut self) -> Result<SchemaShape, EngineError> {
        // information_schema uses domain types; cast so they decode as text
        let rows = self
            .client()?
            .query(
                "SELECT table_name::text, column_name::text
                 FROM information_schema.columns
                 WHERE table_schema = 'public'
                 ORDER BY table_name, ordinal_position",
                &[],
            )
            .await
            .map_err(PostgresAdapterError::from)?;

        let mut shape = SchemaShape::default();
        for row in rows {
            let table: String = row.try_get(0).map_err(PostgresAdapterError::from)?;
            let column: String = row.try_get(1).map_err(PostgresAdapterError::from)?;
            shape.add_column(&table, &column);
        }
        Ok(shape)
    }

    async fn close(&mut self) -> Result<(), EngineError> {
        if self.in_transaction {
            self.in_transaction = false;
            if let Err(e) = self.execute("ROLLBACK").await {
                debug!("Rollback on close failed for PostgreSQL: {e}");
            }
        }

        // Dropping the client ends the connection task.
        drop(self.client.take());
        if let Some(task) = self.task.take() {
            task.await.map_err(PostgresAdapterError::from)?;
        }
        Ok(())
    }
}

/// Box a value with the Rust type PostgreSQL expects for the column.
///
/// Parameters are typed by their column, so NULLs carry a type and INT
/// columns receive `i32`.
fn bind_value(
    table: Table,
    column: &'static str,
    column_type: ColumnType,
    value: &SqlValue,
) -> Result<Box<dyn ToSql + Sync + Send>, EngineError> {
    let mismatch = || EngineError::Bind {
        table,
        column,
        found: value.type_name(),
    };

    let boxed: Box<dyn ToSql + Sync + Send> = match (column_type, value) {
        (ColumnType::Serial | ColumnType::Int, SqlValue::Null) => Box::new(None::<i32>),
        (ColumnType::Serial | ColumnType::Int, SqlValue::Int(i)) => {
            Box::new(i32::try_from(*i).map_err(|_| mismatch())?)
        }
        (ColumnType::VarChar(_) | ColumnType::Text, SqlValue::Null) => Box::new(None::<String>),
        (ColumnType::VarChar(_) | ColumnType::Text, SqlValue::Text(s)) => Box::new(s.clone()),
        (ColumnType::Decimal { .. }, SqlValue::Null) => Box::new(None::<Decimal>),
        (ColumnType::Decimal { .. }, SqlValue::Decimal(d)) => Box::new(*d),
        (ColumnType::Decimal { .. }, SqlValue::Int(i)) => Box::new(Decimal::from(*i)),
        (ColumnType::Date, SqlValue::Null) => Box::new(None::<NaiveDate>),
        (ColumnType::Date, SqlValue::Date(d)) => Box::new(*d),
        (ColumnType::Date, SqlValue::DateTime(dt)) => Box::new(dt.date()),
        (ColumnType::DateTime, SqlValue::Null) => Box::new(None::<NaiveDateTime>),
        (ColumnType::DateTime, SqlValue::DateTime(dt)) => Box::new(*dt),
        _ => return Err(mismatch()),
    };
    Ok(boxed)
}

fn decode_row(row: &Row) -> Result<ResultRow, PostgresAdapterError> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| decode_value(row, idx, column.type_()))
        .collect::<Result<Vec<_>, _>>()
        .map(ResultRow)
}

fn decode_value(row: &Row, idx: usize, ty: &Type) -> Result<SqlValue, PostgresAdapterError> {
    let value: SqlValue = match *ty {
        Type::INT2 => row.try_get::<_, Option<i16>>(idx)?.map(i64::from).into(),
        Type::INT4 => row.try_get::<_, Option<i32>>(idx)?.map(i64::from).into(),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.into(),
        Type::NUMERIC => row.try_get::<_, Option<Decimal>>(idx)?.into(),
        Type::FLOAT4 => row.try_get::<_, Option<f32>>(idx)?.map(f64::from).into(),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx)?.into(),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            row.try_get::<_, Option<String>>(idx)?.into()
        }
        Type::TIMESTAMP => row.try_get::<_, Option<NaiveDateTime>>(idx)?.into(),
        Type::DATE => row.try_get::<_, Option<NaiveDate>>(idx)?.into(),
        _ => {
            return Err(PostgresAdapterError::UnsupportedType {
                index: idx,
                type_name: ty.name().to_string(),
            })
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_rejects_mismatched_values() {
        let err = bind_value(
            Table::Reporte,
            "id_zona",
            ColumnType::Int,
            &SqlValue::Text("x".into()),
        )
        .err()
        .unwrap();
        assert!(matches!(
            err,
            EngineError::Bind {
                column: "id_zona",
                found: "text",
                ..
            }
        ));
    }

    #[test]
    fn test_bind_rejects_out_of_range_int() {
        let result = bind_value(
            Table::Reporte,
            "id_zona",
            ColumnType::Int,
            &SqlValue::Int(i64::from(i32::MAX) + 1),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_bind_accepts_typed_nulls() {
        for column_type in [
            ColumnType::Int,
            ColumnType::Text,
            ColumnType::VarChar(10),
            ColumnType::Decimal {
                precision: 10,
                scale: 2,
            },
            ColumnType::Date,
            ColumnType::DateTime,
        ] {
            assert!(bind_value(Table::Zona, "x", column_type, &SqlValue::Null).is_ok());
        }
    }
}

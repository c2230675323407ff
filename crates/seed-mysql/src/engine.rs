//! [`Engine`] implementation over a single `mysql_async` connection.

use crate::dialect::MySqlDialect;
use crate::error::{check_identifier, MySqlAdapterError};
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use mysql_async::{prelude::*, Conn, OptsBuilder, Params, Row, Value};
use seed_core::{
    AnalyticsQuery, ConnectTarget, Engine, EngineConfig, EngineError, EngineKind, EntityRow,
    ResultRow, SchemaShape, SqlDialect, SqlValue, Table,
};
use tracing::debug;

/// Open a connection for `config`. Server connections select no database.
pub async fn connect(
    config: &EngineConfig,
    target: ConnectTarget,
) -> Result<MySqlEngine, EngineError> {
    let opts = OptsBuilder::default()
        .ip_or_hostname(config.host.clone())
        .tcp_port(config.port)
        .user(Some(config.user.clone()))
        .pass(Some(config.password.clone()))
        .db_name(config.database_for(target).map(str::to_string));

    let conn = Conn::new(opts)
        .await
        .map_err(|e| MySqlAdapterError::from(e).into_engine_error(config.kind))?;

    debug!(
        "Connected to {} at {}:{} ({:?})",
        config.kind, config.host, config.port, target
    );

    Ok(MySqlEngine::new(config.kind, conn))
}

/// A MySQL or MariaDB connection.
pub struct MySqlEngine {
    kind: EngineKind,
    conn: Option<Conn>,
    in_transaction: bool,
}

impl MySqlEngine {
    pub fn new(kind: EngineKind, conn: Conn) -> Self {
        Self {
            kind,
            conn: Some(conn),
            in_transaction: false,
        }
    }

    fn conn(&mut self) -> Result<&mut Conn, EngineError> {
        self.conn.as_mut().ok_or(EngineError::Closed)
    }

    fn wrap(&self, e: impl Into<MySqlAdapterError>) -> EngineError {
        e.into().into_engine_error(self.kind)
    }

    async fn execute(&mut self, sql: &str) -> Result<(), EngineError> {
        let kind = self.kind;
        self.conn()?
            .query_drop(sql)
            .await
            .map_err(|e| MySqlAdapterError::from(e).into_engine_error(kind))
    }
}

#[async_trait::async_trait]
impl Engine for MySqlEngine {
    fn kind(&self) -> EngineKind {
        self.kind
    }

    async fn drop_and_create_database(&mut self, database: &str) -> Result<(), EngineError> {
        let database = check_identifier(database).map_err(|e| self.wrap(e))?;
        self.execute(&format!("DROP DATABASE IF EXISTS `{database}`"))
            .await?;
        self.execute(&format!("CREATE DATABASE `{database}`")).await
    }

    async fn apply_schema(&mut self, tables: &[Table]) -> Result<(), EngineError> {
        for table in tables {
            let ddl = MySqlDialect.create_table(*table);
            debug!("Creating table {} on {}", table, self.kind);
            self.execute(&ddl).await.map_err(|e| EngineError::Ddl {
                table: *table,
                source: Box::new(e),
            })?;
        }
        Ok(())
    }

    async fn begin(&mut self) -> Result<(), EngineError> {
        self.execute("START TRANSACTION").await?;
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

        let sql = MySqlDialect.insert_statement(table, rows.len());
        let mut params: Vec<Value> =
            Vec::with_capacity(rows.len() * table.insert_columns().len());
        for row in rows {
            params.extend(row.values.iter().map(to_mysql_value));
        }

        let kind = self.kind;
        self.conn()?
            .exec_drop(&sql, Params::Positional(params))
            .await
            .map_err(|e| MySqlAdapterError::from(e).into_engine_error(kind))?;

        Ok(rows.len() as u64)
    }

    async fn fetch_ids(&mut self, table: Table) -> Result<Vec<i64>, EngineError> {
        let sql = MySqlDialect.select_ids(table);
        let kind = self.kind;
        self.conn()?
            .query::<i64, _>(sql)
            .await
            .map_err(|e| MySqlAdapterError::from(e).into_engine_error(kind))
    }

    async fn run_query(&mut self, query: &AnalyticsQuery) -> Result<Vec<ResultRow>, EngineError> {
        let sql = MySqlDialect.render(query);
        let kind = self.kind;
        // Binary protocol, so integers and dates come back typed.
        let rows: Vec<Row> = self
            .conn()?
            .exec(&sql, ())
            .await
            .map_err(|e| MySqlAdapterError::from(e).into_engine_error(kind))?;

        Ok(rows
            .iter()
            .map(|row| {
                ResultRow(
                    (0..row.len())
                        .map(|idx| row.as_ref(idx).map_or(SqlValue::Null, from_mysql_value))
                        .collect(),
                )
            })
            .collect())
    }

    async fn describe_schema(&mut self) -> Result<SchemaShape, EngineError> {
        let kind = self.kind;
        let columns: Vec<(String, String)> = self
            .conn()?
            .query(
                "SELECT TABLE_NAME, COLUMN_NAME
                 FROM INFORMATION_SCHEMA.COLUMNS
                 WHERE TABLE_SCHEMA = DATABASE()
                 ORDER BY TABLE_NAME, ORDINAL_POSITION",
            )
            .await
            .map_err(|e| MySqlAdapterError::from(e).into_engine_error(kind))?;

        let mut shape = SchemaShape::default();
        for (table, column) in columns {
            shape.add_column(&table, &column);
        }
        Ok(shape)
    }

    async fn close(&mut self) -> Result<(), EngineError> {
        if self.in_transaction {
            self.in_transaction = false;
            if let Err(e) = self.execute("ROLLBACK").await {
                debug!("Rollback on close failed for {}: {e}", self.kind);
            }
        }
        match self.conn.take() {
            Some(conn) => conn.disconnect().await.map_err(|e| self.wrap(e)),
            None => Ok(()),
        }
    }
}

/// Bind representation of a value.
pub fn to_mysql_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::NULL,
        SqlValue::Int(i) => Value::Int(*i),
        SqlValue::Float(f) => Value::Double(*f),
        // Decimals travel as strings to keep their exact digits
        SqlValue::Decimal(d) => Value::Bytes(d.to_string().into_bytes()),
        SqlValue::Text(s) => Value::Bytes(s.clone().into_bytes()),
        SqlValue::Date(d) => Value::Date(d.year() as u16, d.month() as u8, d.day() as u8, 0, 0, 0, 0),
        SqlValue::DateTime(dt) => Value::Date(
            dt.year() as u16,
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
            dt.second() as u8,
            dt.nanosecond() / 1000,
        ),
    }
}

/// Engine-neutral view of a result cell.
pub fn from_mysql_value(value: &Value) -> SqlValue {
    match value {
        Value::NULL => SqlValue::Null,
        Value::Int(i) => SqlValue::Int(*i),
        Value::UInt(u) => i64::try_from(*u).map_or(SqlValue::Float(*u as f64), SqlValue::Int),
        Value::Float(f) => SqlValue::Float(f64::from(*f)),
        Value::Double(f) => SqlValue::Float(*f),
        // DECIMAL results arrive as bytes; SqlValue parses them on demand
        Value::Bytes(b) => SqlValue::Text(String::from_utf8_lossy(b).into_owned()),
        Value::Date(year, month, day, hour, minute, second, micro) => {
            let date = NaiveDate::from_ymd_opt(*year as i32, *month as u32, *day as u32);
            let time = NaiveTime::from_hms_micro_opt(
                *hour as u32,
                *minute as u32,
                *second as u32,
                *micro,
            );
            match (date, time) {
                (Some(date), Some(time)) => SqlValue::DateTime(date.and_time(time)),
                _ => SqlValue::Null,
            }
        }
        Value::Time(negative, days, hours, minutes, seconds, _) => {
            let sign = if *negative { "-" } else { "" };
            let hours = *days * 24 + *hours as u32;
            SqlValue::Text(format!("{sign}{hours:02}:{minutes:02}:{seconds:02}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_to_mysql_value() {
        assert_eq!(to_mysql_value(&SqlValue::Null), Value::NULL);
        assert_eq!(to_mysql_value(&SqlValue::Int(7)), Value::Int(7));
        assert_eq!(
            to_mysql_value(&SqlValue::Decimal(Decimal::new(4250, 2))),
            Value::Bytes(b"42.50".to_vec())
        );
        let dt = NaiveDate::from_ymd_opt(2026, 3, 9)
            .unwrap()
            .and_hms_opt(8, 15, 30)
            .unwrap();
        assert_eq!(
            to_mysql_value(&SqlValue::DateTime(dt)),
            Value::Date(2026, 3, 9, 8, 15, 30, 0)
        );
        let d = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        assert_eq!(to_mysql_value(&SqlValue::Date(d)), Value::Date(2026, 1, 2, 0, 0, 0, 0));
    }

    #[test]
    fn test_from_mysql_value() {
        assert_eq!(from_mysql_value(&Value::NULL), SqlValue::Null);
        assert_eq!(from_mysql_value(&Value::UInt(12)), SqlValue::Int(12));
        let avg = from_mysql_value(&Value::Bytes(b"1.5000".to_vec()));
        assert_eq!(avg.as_f64(), Some(1.5));
        let dt = from_mysql_value(&Value::Date(2026, 5, 1, 10, 0, 0, 0));
        assert_eq!(
            dt.as_datetime(),
            NaiveDate::from_ymd_opt(2026, 5, 1).unwrap().and_hms_opt(10, 0, 0)
        );
    }
}

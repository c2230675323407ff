//! In-memory engine used by the test suites.
//!
//! [`MemoryProvider`] keeps one simulated server per [`EngineKind`]. Each
//! server holds databases of tables, enforces the same constraints the real
//! engines enforce (primary keys, `UNIQUE`, `NOT NULL`, foreign keys, column
//! types and lengths) and evaluates every [`AnalyticsQuery`] natively.
//! Faults can be injected per engine to exercise failure isolation.

use chrono::{NaiveDateTime, TimeDelta};
use seed_core::category::{Priority, ReportStatus};
use seed_core::{
    AnalyticsQuery, Category, ColumnDefinition, ColumnType, ConnectTarget, ConnectionProvider,
    Engine, EngineConfig, EngineError, EngineKind, EntityRow, ResultRow, SchemaShape, SqlValue,
    Table, MAX_BIND_PARAMETERS,
};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

static NULL: SqlValue = SqlValue::Null;

/// Value of `column` in a stored row of `table`.
fn cell<'a>(table: Table, row: &'a [SqlValue], column: &str) -> &'a SqlValue {
    table
        .insert_column_index(column)
        .and_then(|idx| row.get(idx))
        .unwrap_or(&NULL)
}

fn text_in<C: Category>(value: &SqlValue, allowed: &[C]) -> bool {
    value
        .as_str()
        .is_some_and(|v| allowed.iter().any(|c| c.as_str() == v))
}

/// Highest counts first; ties keep their input order.
fn top<T>(mut rows: Vec<T>, limit: u32, count: impl Fn(&T) -> i64) -> Vec<T> {
    rows.sort_by_key(|row| Reverse(count(row)));
    rows.truncate(limit as usize);
    rows
}

// ============================================================================
// Storage
// ============================================================================

#[derive(Debug, Clone, Default)]
struct TableData {
    /// Insert-column values keyed by primary key.
    rows: BTreeMap<i64, Vec<SqlValue>>,
    next_id: i64,
}

impl TableData {
    fn lookup(&self, id: &SqlValue) -> Option<&Vec<SqlValue>> {
        id.as_i64().and_then(|id| self.rows.get(&id))
    }
}

#[derive(Debug, Clone, Default)]
struct Database {
    tables: BTreeMap<Table, TableData>,
}

#[derive(Debug, Default)]
struct Faults {
    unreachable: bool,
    inserts: HashSet<Table>,
    ddl: HashSet<Table>,
}

#[derive(Debug, Default)]
struct Server {
    databases: BTreeMap<String, Database>,
    faults: Faults,
    open_connections: usize,
}

type Servers = Arc<Mutex<HashMap<EngineKind, Server>>>;

fn lock(servers: &Servers) -> MutexGuard<'_, HashMap<EngineKind, Server>> {
    servers.lock().unwrap_or_else(PoisonError::into_inner)
}

fn accepts(column: &ColumnDefinition, value: &SqlValue) -> bool {
    match (column.column_type, value) {
        (ColumnType::Serial | ColumnType::Int, SqlValue::Int(i)) => i32::try_from(*i).is_ok(),
        (ColumnType::VarChar(max), SqlValue::Text(s)) => s.chars().count() <= max as usize,
        (ColumnType::Text, SqlValue::Text(_)) => true,
        (ColumnType::Decimal { .. }, SqlValue::Decimal(_) | SqlValue::Float(_) | SqlValue::Int(_)) => {
            true
        }
        (ColumnType::Date, SqlValue::Date(_)) => true,
        (ColumnType::DateTime, SqlValue::DateTime(_)) => true,
        _ => false,
    }
}

impl Database {
    fn table(&self, table: Table) -> Result<&TableData, EngineError> {
        self.tables
            .get(&table)
            .ok_or_else(|| EngineError::Other(format!("table {table} does not exist")))
    }

    fn apply_schema(&mut self, tables: &[Table], faults: &Faults) -> Result<(), EngineError> {
        for &table in tables {
            let ddl_error = |message: String| EngineError::Ddl {
                table,
                source: Box::new(EngineError::Other(message)),
            };
            if faults.ddl.contains(&table) {
                return Err(ddl_error(format!("injected failure creating {table}")));
            }
            for (_, parent) in table.foreign_keys() {
                if !self.tables.contains_key(&parent) {
                    return Err(ddl_error(format!("referenced table {parent} does not exist")));
                }
            }
            self.tables.entry(table).or_default();
        }
        Ok(())
    }

    fn check_row(
        &self,
        table: Table,
        row: &EntityRow,
        staged: &[Vec<SqlValue>],
    ) -> Result<(), EngineError> {
        let columns = table.insert_columns();
        if row.table != table || row.values.len() != columns.len() {
            return Err(EngineError::Other(format!(
                "row for {} with {} values does not fit {table}",
                row.table,
                row.values.len()
            )));
        }

        for (idx, (column, value)) in columns.iter().zip(&row.values).enumerate() {
            if value.is_null() {
                if column.not_null {
                    return Err(EngineError::Constraint(format!(
                        "null value in {table}.{} violates not-null constraint",
                        column.name
                    )));
                }
                continue;
            }
            if !accepts(column, value) {
                return Err(EngineError::Bind {
                    table,
                    column: column.name,
                    found: value.type_name(),
                });
            }
            if column.unique {
                let existing = self.table(table)?.rows.values();
                if existing.chain(staged).any(|other| other[idx] == *value) {
                    return Err(EngineError::Constraint(format!(
                        "duplicate value {value:?} for {table}.{}",
                        column.name
                    )));
                }
            }
            if let Some(parent) = column.references {
                if self.table(parent)?.lookup(value).is_none() {
                    return Err(EngineError::Constraint(format!(
                        "{table}.{} = {value:?} has no row in {parent}",
                        column.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Insert all rows or none.
    fn insert(&mut self, table: Table, rows: &[EntityRow]) -> Result<u64, EngineError> {
        let mut staged = Vec::with_capacity(rows.len());
        for row in rows {
            self.check_row(table, row, &staged)?;
            staged.push(row.values.clone());
        }
        let data = self
            .tables
            .get_mut(&table)
            .ok_or_else(|| EngineError::Other(format!("table {table} does not exist")))?;
        for values in staged {
            data.next_id += 1;
            data.rows.insert(data.next_id, values);
        }
        Ok(rows.len() as u64)
    }

    fn evaluate(&self, query: &AnalyticsQuery) -> Result<Vec<ResultRow>, EngineError> {
        match query {
            AnalyticsQuery::ReadingZones => self.reading_zones(),
            AnalyticsQuery::TopRiskZones { limit } => self.top_risk_zones(*limit),
            AnalyticsQuery::UserResolutionEfficiency { limit } => self.user_efficiency(*limit),
            AnalyticsQuery::SensorReportCorrelation {
                window_seconds,
                limit,
            } => self.sensor_correlation(*window_seconds, *limit),
            AnalyticsQuery::TopHighPriorityZone => self.top_high_priority_zone(),
            AnalyticsQuery::RowCount(table) => {
                let count = self.table(*table)?.rows.len() as i64;
                Ok(vec![ResultRow(vec![SqlValue::Int(count)])])
            }
            AnalyticsQuery::OrphanCount {
                child,
                column,
                parent,
            } => {
                let parents = self.table(*parent)?;
                let orphans = self
                    .table(*child)?
                    .rows
                    .values()
                    .map(|row| cell(*child, row, column))
                    .filter(|fk| !fk.is_null() && parents.lookup(fk).is_none())
                    .count() as i64;
                Ok(vec![ResultRow(vec![SqlValue::Int(orphans)])])
            }
        }
    }

    fn reading_zones(&self) -> Result<Vec<ResultRow>, EngineError> {
        let sensors = self.table(Table::Sensor)?;
        Ok(self
            .table(Table::RegistroSensor)?
            .rows
            .iter()
            .filter_map(|(id, reading)| {
                let sensor = sensors.lookup(cell(Table::RegistroSensor, reading, "id_sensor"))?;
                Some(ResultRow(vec![
                    SqlValue::Int(*id),
                    cell(Table::Sensor, sensor, "id_zona").clone(),
                ]))
            })
            .collect())
    }

    fn top_risk_zones(&self, limit: u32) -> Result<Vec<ResultRow>, EngineError> {
        let zonas = self.table(Table::Zona)?;
        let mut counts: BTreeMap<i64, i64> = BTreeMap::new();
        for reporte in self.table(Table::Reporte)?.rows.values() {
            if !text_in(cell(Table::Reporte, reporte, "prioridad"), &Priority::CRITICAL) {
                continue;
            }
            if let Some(zona) = cell(Table::Reporte, reporte, "id_zona").as_i64() {
                if zonas.rows.contains_key(&zona) {
                    *counts.entry(zona).or_default() += 1;
                }
            }
        }

        Ok(top(counts.into_iter().collect(), limit, |(_, n)| *n)
            .into_iter()
            .filter_map(|(zona, n)| {
                let row = zonas.rows.get(&zona)?;
                Some(ResultRow(vec![
                    cell(Table::Zona, row, "nombre").clone(),
                    SqlValue::Int(n),
                    cell(Table::Zona, row, "coordenadas").clone(),
                ]))
            })
            .collect())
    }

    fn user_efficiency(&self, limit: u32) -> Result<Vec<ResultRow>, EngineError> {
        let usuarios = self.table(Table::Usuario)?;
        let mut comments: HashMap<i64, i64> = HashMap::new();
        for comentario in self.table(Table::Comentario)?.rows.values() {
            if let Some(reporte) = cell(Table::Comentario, comentario, "id_reporte").as_i64() {
                *comments.entry(reporte).or_default() += 1;
            }
        }

        // usuario id -> (resolved reports, comments on them)
        let mut totals: BTreeMap<i64, (i64, i64)> = BTreeMap::new();
        for (id, reporte) in &self.table(Table::Reporte)?.rows {
            if !text_in(cell(Table::Reporte, reporte, "estado"), &ReportStatus::RESOLVED) {
                continue;
            }
            if let Some(usuario) = cell(Table::Reporte, reporte, "id_usuario").as_i64() {
                if usuarios.rows.contains_key(&usuario) {
                    let entry = totals.entry(usuario).or_default();
                    entry.0 += 1;
                    entry.1 += comments.get(id).copied().unwrap_or(0);
                }
            }
        }

        Ok(top(totals.into_iter().collect(), limit, |(_, (n, _))| *n)
            .into_iter()
            .filter_map(|(usuario, (resolved, total))| {
                let row = usuarios.rows.get(&usuario)?;
                Some(ResultRow(vec![
                    cell(Table::Usuario, row, "nombre").clone(),
                    SqlValue::Int(resolved),
                    SqlValue::Float(total as f64 / resolved as f64),
                ]))
            })
            .collect())
    }

    fn sensor_correlation(&self, window_seconds: i64, limit: u32) -> Result<Vec<ResultRow>, EngineError> {
        let zonas = self.table(Table::Zona)?;
        let sensors = self.table(Table::Sensor)?;
        let reportes = self.table(Table::Reporte)?;

        let alerted: HashSet<i64> = self
            .table(Table::Alerta)?
            .rows
            .values()
            .filter_map(|alerta| cell(Table::Alerta, alerta, "id_reporte").as_i64())
            .collect();

        // zona id -> (reporte id, fechaHora) of alerted reports
        let mut by_zone: HashMap<i64, Vec<(i64, NaiveDateTime)>> = HashMap::new();
        for (id, reporte) in &reportes.rows {
            if !alerted.contains(id) {
                continue;
            }
            let zona = cell(Table::Reporte, reporte, "id_zona").as_i64();
            let at = cell(Table::Reporte, reporte, "fechaHora").as_datetime();
            if let (Some(zona), Some(at)) = (zona, at) {
                by_zone.entry(zona).or_default().push((*id, at));
            }
        }

        let window = TimeDelta::try_seconds(window_seconds);
        let mut groups: BTreeMap<(String, Option<String>), HashSet<i64>> = BTreeMap::new();
        for reading in self.table(Table::RegistroSensor)?.rows.values() {
            let Some(sensor) = sensors.lookup(cell(Table::RegistroSensor, reading, "id_sensor")) else {
                continue;
            };
            let zona_id = cell(Table::Sensor, sensor, "id_zona");
            let (Some(zona), Some(reports)) = (
                zonas.lookup(zona_id),
                zona_id.as_i64().and_then(|id| by_zone.get(&id)),
            ) else {
                continue;
            };
            let Some(fecha) = cell(Table::RegistroSensor, reading, "fecha").as_datetime() else {
                continue;
            };
            let from = window
                .and_then(|w| fecha.checked_sub_signed(w))
                .unwrap_or(NaiveDateTime::MIN);

            for (reporte, at) in reports {
                if from <= *at && *at <= fecha {
                    let key = (
                        cell(Table::Zona, zona, "nombre").as_str().unwrap_or_default().to_string(),
                        cell(Table::Sensor, sensor, "tipo").as_str().map(str::to_string),
                    );
                    groups.entry(key).or_default().insert(*reporte);
                }
            }
        }

        Ok(top(groups.into_iter().collect(), limit, |(_, ids)| ids.len() as i64)
            .into_iter()
            .map(|((zona, tipo), ids)| {
                ResultRow(vec![
                    SqlValue::Text(zona),
                    tipo.map_or(SqlValue::Null, SqlValue::Text),
                    SqlValue::Int(ids.len() as i64),
                ])
            })
            .collect())
    }

    fn top_high_priority_zone(&self) -> Result<Vec<ResultRow>, EngineError> {
        let zonas = self.table(Table::Zona)?;
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for reporte in self.table(Table::Reporte)?.rows.values() {
            if !text_in(cell(Table::Reporte, reporte, "prioridad"), &[Priority::Alta]) {
                continue;
            }
            let Some(zona) = zonas.lookup(cell(Table::Reporte, reporte, "id_zona")) else {
                continue;
            };
            if let Some(nombre) = cell(Table::Zona, zona, "nombre").as_str() {
                *counts.entry(nombre.to_string()).or_default() += 1;
            }
        }

        Ok(top(counts.into_iter().collect(), 1, |(_, n)| *n)
            .into_iter()
            .map(|(nombre, n)| ResultRow(vec![SqlValue::Text(nombre), SqlValue::Int(n)]))
            .collect())
    }
}

// ============================================================================
// Provider
// ============================================================================

/// Simulated servers shared by every connection opened from this provider.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    servers: Servers,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default connection settings for `kind`.
    pub fn config(kind: EngineKind) -> EngineConfig {
        EngineConfig::new(kind, "localhost", kind.default_port(), "user", "user123", "negocio")
    }

    /// Default connection settings for all three engines.
    pub fn configs() -> Vec<EngineConfig> {
        EngineKind::ALL.into_iter().map(Self::config).collect()
    }

    fn with_server<T>(&self, kind: EngineKind, f: impl FnOnce(&mut Server) -> T) -> T {
        let mut servers = lock(&self.servers);
        f(servers.entry(kind).or_default())
    }

    /// Refuse every new connection to `kind`.
    pub fn set_unreachable(&self, kind: EngineKind, unreachable: bool) {
        self.with_server(kind, |s| s.faults.unreachable = unreachable);
    }

    /// Make every insert into `table` on `kind` fail.
    pub fn fail_inserts_into(&self, kind: EngineKind, table: Table) {
        self.with_server(kind, |s| s.faults.inserts.insert(table));
    }

    /// Make creating `table` on `kind` fail.
    pub fn fail_ddl_on(&self, kind: EngineKind, table: Table) {
        self.with_server(kind, |s| s.faults.ddl.insert(table));
    }

    pub fn clear_faults(&self, kind: EngineKind) {
        self.with_server(kind, |s| s.faults = Faults::default());
    }

    /// Connections opened and not yet closed.
    pub fn open_connections(&self, kind: EngineKind) -> usize {
        self.with_server(kind, |s| s.open_connections)
    }

    pub fn database_exists(&self, kind: EngineKind, database: &str) -> bool {
        self.with_server(kind, |s| s.databases.contains_key(database))
    }

    /// Committed and uncommitted rows currently stored, zero if the table
    /// does not exist.
    pub fn row_count(&self, kind: EngineKind, database: &str, table: Table) -> usize {
        self.with_server(kind, |s| {
            s.databases
                .get(database)
                .and_then(|db| db.tables.get(&table))
                .map_or(0, |t| t.rows.len())
        })
    }

    /// Stored rows of `table` as `(id, insert-column values)`, ascending by id.
    pub fn rows(&self, kind: EngineKind, database: &str, table: Table) -> Vec<(i64, Vec<SqlValue>)> {
        self.with_server(kind, |s| {
            s.databases
                .get(database)
                .and_then(|db| db.tables.get(&table))
                .map(|t| t.rows.iter().map(|(id, row)| (*id, row.clone())).collect())
                .unwrap_or_default()
        })
    }
}

#[async_trait::async_trait]
impl ConnectionProvider for MemoryProvider {
    async fn connect(
        &self,
        config: &EngineConfig,
        target: ConnectTarget,
    ) -> Result<Box<dyn Engine>, EngineError> {
        let database = self.with_server(config.kind, |server| {
            if server.faults.unreachable {
                return Err(EngineError::driver(
                    config.kind,
                    format!("connection refused: {}:{}", config.host, config.port),
                ));
            }
            let database = match target {
                ConnectTarget::Server => None,
                ConnectTarget::Database if server.databases.contains_key(&config.database) => {
                    Some(config.database.clone())
                }
                ConnectTarget::Database => {
                    return Err(EngineError::driver(
                        config.kind,
                        format!("unknown database '{}'", config.database),
                    ))
                }
            };
            server.open_connections += 1;
            Ok(database)
        })?;

        Ok(Box::new(MemoryEngine {
            kind: config.kind,
            servers: self.servers.clone(),
            database,
            snapshot: None,
            closed: false,
        }))
    }
}

// ============================================================================
// Engine
// ============================================================================

/// One connection to a simulated server.
///
/// A transaction snapshots the database on `begin`; closing with the
/// transaction still open restores the snapshot.
pub struct MemoryEngine {
    kind: EngineKind,
    servers: Servers,
    /// `None` for server connections.
    database: Option<String>,
    snapshot: Option<Database>,
    closed: bool,
}

impl MemoryEngine {
    fn with_server<T>(
        &self,
        f: impl FnOnce(&mut Server) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        if self.closed {
            return Err(EngineError::Closed);
        }
        let mut servers = lock(&self.servers);
        f(servers.entry(self.kind).or_default())
    }

    fn with_database<T>(
        &self,
        f: impl FnOnce(&mut Database, &Faults) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let kind = self.kind;
        let name = self.database.as_deref();
        self.with_server(|server| {
            let name = name.ok_or_else(|| EngineError::Other("no database selected".into()))?;
            let Server {
                databases, faults, ..
            } = server;
            let database = databases
                .get_mut(name)
                .ok_or_else(|| EngineError::driver(kind, format!("unknown database '{name}'")))?;
            f(database, faults)
        })
    }
}

#[async_trait::async_trait]
impl Engine for MemoryEngine {
    fn kind(&self) -> EngineKind {
        self.kind
    }

    async fn drop_and_create_database(&mut self, database: &str) -> Result<(), EngineError> {
        let selected = self.database.is_some();
        self.with_server(|server| {
            if selected {
                return Err(EngineError::Other(
                    "dropping a database requires a server connection".into(),
                ));
            }
            server
                .databases
                .insert(database.to_string(), Database::default());
            Ok(())
        })
    }

    async fn apply_schema(&mut self, tables: &[Table]) -> Result<(), EngineError> {
        self.with_database(|db, faults| db.apply_schema(tables, faults))
    }

    async fn begin(&mut self) -> Result<(), EngineError> {
        if self.snapshot.is_some() {
            return Err(EngineError::Other("transaction already open".into()));
        }
        let snapshot = self.with_database(|db, _| Ok(db.clone()))?;
        self.snapshot = Some(snapshot);
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), EngineError> {
        self.with_database(|_, _| Ok(()))?;
        if self.snapshot.take().is_none() {
            return Err(EngineError::Other("no transaction open".into()));
        }
        Ok(())
    }

    async fn insert_batch(&mut self, table: Table, rows: &[EntityRow]) -> Result<u64, EngineError> {
        let kind = self.kind;
        self.with_database(|db, faults| {
            if faults.inserts.contains(&table) {
                return Err(EngineError::driver(
                    kind,
                    format!("injected failure inserting into {table}"),
                ));
            }
            let placeholders = rows.len() * table.insert_columns().len();
            if placeholders > MAX_BIND_PARAMETERS {
                return Err(EngineError::driver(
                    kind,
                    format!("too many placeholders in INSERT into {table}: {placeholders}"),
                ));
            }
            db.insert(table, rows)
        })
    }

    async fn fetch_ids(&mut self, table: Table) -> Result<Vec<i64>, EngineError> {
        self.with_database(|db, _| Ok(db.table(table)?.rows.keys().copied().collect()))
    }

    async fn run_query(&mut self, query: &AnalyticsQuery) -> Result<Vec<ResultRow>, EngineError> {
        self.with_database(|db, _| db.evaluate(query))
    }

    async fn describe_schema(&mut self) -> Result<SchemaShape, EngineError> {
        self.with_database(|db, _| {
            let tables: Vec<Table> = db.tables.keys().copied().collect();
            Ok(SchemaShape::from_tables(&tables))
        })
    }

    async fn close(&mut self) -> Result<(), EngineError> {
        if self.closed {
            return Ok(());
        }
        let restored = match self.snapshot.take() {
            Some(snapshot) => self.with_database(|db, _| {
                *db = snapshot;
                Ok(())
            }),
            None => Ok(()),
        };
        self.with_server(|server| {
            server.open_connections = server.open_connections.saturating_sub(1);
            Ok(())
        })?;
        self.closed = true;
        restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    async fn provisioned(provider: &MemoryProvider, kind: EngineKind) -> Box<dyn Engine> {
        let config = MemoryProvider::config(kind);
        let mut server = provider.connect(&config, ConnectTarget::Server).await.unwrap();
        server.drop_and_create_database("negocio").await.unwrap();
        server.close().await.unwrap();
        let mut engine = provider
            .connect(&config, ConnectTarget::Database)
            .await
            .unwrap();
        engine.apply_schema(&Table::ALL).await.unwrap();
        engine
    }

    #[tokio::test]
    async fn test_unknown_database_is_refused() {
        let provider = MemoryProvider::new();
        let config = MemoryProvider::config(EngineKind::MySql);
        let err = provider
            .connect(&config, ConnectTarget::Database)
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("unknown database"));
        assert_eq!(provider.open_connections(EngineKind::MySql), 0);
    }

    #[tokio::test]
    async fn test_oversized_batch_is_refused() {
        let provider = MemoryProvider::new();
        let mut engine = provisioned(&provider, EngineKind::PostgreSql).await;
        let rows = vec![fixtures::zona("Bilbao"); Table::Zona.max_batch_rows() + 1];

        let err = engine.insert_batch(Table::Zona, &rows).await.unwrap_err();
        assert!(err.to_string().contains("too many placeholders"), "{err}");
        engine.close().await.unwrap();
        assert_eq!(provider.row_count(EngineKind::PostgreSql, "negocio", Table::Zona), 0);
    }

    #[tokio::test]
    async fn test_foreign_key_and_unique_enforced() {
        let provider = MemoryProvider::new();
        let mut engine = provisioned(&provider, EngineKind::PostgreSql).await;

        let err = engine
            .insert_batch(Table::Reporte, &[fixtures::reporte(1, 1, "Abierto", "Alta")])
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Constraint(_)));

        let ana = fixtures::usuario("Ana", "ana@example.com");
        engine.insert_batch(Table::Usuario, &[ana.clone()]).await.unwrap();
        let err = engine
            .insert_batch(Table::Usuario, &[ana])
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Constraint(_)));
        engine.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_batch_inserts_nothing() {
        let provider = MemoryProvider::new();
        let mut engine = provisioned(&provider, EngineKind::MySql).await;

        let rows = vec![
            fixtures::usuario("Ana", "ana@example.com"),
            fixtures::usuario("Luis", "luis@example.com"),
            fixtures::usuario("Otra Ana", "ana@example.com"),
        ];
        assert!(engine.insert_batch(Table::Usuario, &rows).await.is_err());
        assert_eq!(
            provider.row_count(EngineKind::MySql, "negocio", Table::Usuario),
            0
        );
        engine.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_close_rolls_back_open_transaction() {
        let provider = MemoryProvider::new();
        let mut engine = provisioned(&provider, EngineKind::MariaDb).await;

        engine.begin().await.unwrap();
        engine
            .insert_batch(Table::Zona, &[fixtures::zona("Sevilla")])
            .await
            .unwrap();
        assert_eq!(provider.row_count(EngineKind::MariaDb, "negocio", Table::Zona), 1);
        engine.close().await.unwrap();

        assert_eq!(provider.row_count(EngineKind::MariaDb, "negocio", Table::Zona), 0);
        assert_eq!(provider.open_connections(EngineKind::MariaDb), 0);
        assert!(matches!(
            engine.fetch_ids(Table::Zona).await,
            Err(EngineError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_overlong_varchar_is_rejected() {
        let provider = MemoryProvider::new();
        let mut engine = provisioned(&provider, EngineKind::PostgreSql).await;

        let long_name = "x".repeat(101);
        let err = engine
            .insert_batch(Table::Zona, &[fixtures::zona(&long_name)])
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Bind { column: "nombre", .. }));
        engine.close().await.unwrap();
    }

    #[test]
    fn test_unreachable_server_refuses_connections() {
        let provider = MemoryProvider::new();
        let config = MemoryProvider::config(EngineKind::PostgreSql);
        provider.set_unreachable(EngineKind::PostgreSql, true);

        let refused = tokio_test::block_on(provider.connect(&config, ConnectTarget::Server));
        assert!(matches!(
            refused,
            Err(EngineError::Driver {
                engine: EngineKind::PostgreSql,
                ..
            })
        ));

        provider.clear_faults(EngineKind::PostgreSql);
        let mut engine =
            tokio_test::block_on(provider.connect(&config, ConnectTarget::Server)).unwrap();
        assert_eq!(provider.open_connections(EngineKind::PostgreSql), 1);
        tokio_test::block_on(engine.close()).unwrap();
        assert_eq!(provider.open_connections(EngineKind::PostgreSql), 0);
    }

    #[test]
    fn test_top_keeps_ties_in_order() {
        let rows = top(vec![("a", 1), ("b", 3), ("c", 3), ("d", 2)], 3, |(_, n)| *n);
        assert_eq!(rows, vec![("b", 3), ("c", 3), ("d", 2)]);
    }
}

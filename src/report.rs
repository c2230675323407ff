//! Analytical reports and their JSON export.
//!
//! Each report is one fixed [`AnalyticsQuery`]; any report can run against
//! any engine. [`export`] reproduces the standard assignment of reports to
//! engines and finishes with the cross-engine extract.

use crate::connect::{close_engine, open_engine};
use crate::error::ReportError;
use seed_core::{
    AnalyticsQuery, ConnectTarget, ConnectionProvider, DecodeError, Engine, EngineConfig,
    EngineKind, ResultRow,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Default number of rows per report.
pub const DEFAULT_LIMIT: u32 = 5;

/// Default correlation window: two days before a reading.
pub const DEFAULT_CORRELATION_WINDOW_SECS: i64 = 2 * 86_400;

/// File name of the cross-engine extract.
pub const CROSS_ENGINE_FILE: &str = "datosDeLasTresBases";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReportId {
    /// Zones with the most Crítica/Alta reports
    TopRiskZones,
    /// Users with the most resolved reports
    UserEfficiency,
    /// Zone and sensor type pairs with the most alerted reports near a reading
    SensorCorrelation,
}

impl ReportId {
    pub const ALL: [ReportId; 3] = [
        ReportId::TopRiskZones,
        ReportId::UserEfficiency,
        ReportId::SensorCorrelation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ReportId::TopRiskZones => "top-risk-zones",
            ReportId::UserEfficiency => "user-efficiency",
            ReportId::SensorCorrelation => "sensor-correlation",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            ReportId::TopRiskZones => "analisisZonasRiesgo.json",
            ReportId::UserEfficiency => "analisis_eficiencia_usuarios.json",
            ReportId::SensorCorrelation => "analisisCorrelacionSensor.json",
        }
    }

    /// Engine the report is exported from by default.
    pub fn default_engine(self) -> EngineKind {
        match self {
            ReportId::TopRiskZones => EngineKind::PostgreSql,
            ReportId::UserEfficiency => EngineKind::MySql,
            ReportId::SensorCorrelation => EngineKind::MariaDb,
        }
    }

    fn query(self, options: &ReportOptions) -> AnalyticsQuery {
        match self {
            ReportId::TopRiskZones => AnalyticsQuery::TopRiskZones {
                limit: options.limit,
            },
            ReportId::UserEfficiency => AnalyticsQuery::UserResolutionEfficiency {
                limit: options.limit,
            },
            ReportId::SensorCorrelation => AnalyticsQuery::SensorReportCorrelation {
                window_seconds: options.correlation_window_secs,
                limit: options.limit,
            },
        }
    }

    fn description(self, options: &ReportOptions) -> String {
        let limit = options.limit;
        match self {
            ReportId::TopRiskZones => format!(
                "Las {limit} zonas con mayor cantidad de incidentes reportados con prioridad \
                 Crítica o Alta. Usado para la asignación de patrullaje y recursos de emergencia."
            ),
            ReportId::UserEfficiency => "Usuarios con mayor cantidad de reportes resueltos y el \
                 promedio de comentarios en esos reportes. Mide la productividad de los usuarios \
                 clave y la interacción comunitaria."
                .to_string(),
            ReportId::SensorCorrelation => format!(
                "Mide el número de reportes ciudadanos con alerta en zonas donde la fecha del \
                 reporte cae dentro de {} antes de un registro de sensor. Esto valida la \
                 correlación entre la percepción del ciudadano y los datos tecnológicos.",
                describe_window(options.correlation_window_secs)
            ),
        }
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn describe_window(secs: i64) -> String {
    let (value, unit, plural) = if secs % 86_400 == 0 {
        (secs / 86_400, "día", "días")
    } else if secs % 3_600 == 0 {
        (secs / 3_600, "hora", "horas")
    } else if secs % 60 == 0 {
        (secs / 60, "minuto", "minutos")
    } else {
        (secs, "segundo", "segundos")
    };
    format!("{value} {}", if value == 1 { unit } else { plural })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub limit: u32,
    pub correlation_window_secs: i64,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            correlation_window_secs: DEFAULT_CORRELATION_WINDOW_SECS,
        }
    }
}

// ============================================================================
// Documents
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskZone {
    pub zona: String,
    pub incidentes_criticos: i64,
    pub coordenadas: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEfficiency {
    pub usuario: String,
    pub reportes_resueltos: i64,
    pub promedio_comentarios: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorCorrelation {
    pub zona: String,
    pub sensor: Option<String>,
    pub reportes_ciudadanos_afectados: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighPriorityZone {
    pub zona_mas_critica: String,
    pub reportes_alta_prioridad_total: i64,
}

/// Result rows, serialized under the report's own key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReportRows {
    #[serde(rename = "top_zonas")]
    TopZonas(Vec<RiskZone>),
    #[serde(rename = "top_usuarios_eficientes")]
    TopUsuariosEficientes(Vec<UserEfficiency>),
    #[serde(rename = "top_correlaciones_sensor_reporte")]
    TopCorrelaciones(Vec<SensorCorrelation>),
}

impl ReportRows {
    pub fn len(&self) -> usize {
        match self {
            ReportRows::TopZonas(rows) => rows.len(),
            ReportRows::TopUsuariosEficientes(rows) => rows.len(),
            ReportRows::TopCorrelaciones(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub fecha_generacion: String,
    pub descripcion: String,
    #[serde(flatten)]
    pub rows: ReportRows,
}

/// Local time in ISO-8601 with microseconds, e.g. `2026-10-14T09:30:00.123456`.
pub fn generation_timestamp() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn decode_rows(id: ReportId, rows: &[ResultRow]) -> Result<ReportRows, DecodeError> {
    Ok(match id {
        ReportId::TopRiskZones => ReportRows::TopZonas(
            rows.iter()
                .map(|row| -> Result<RiskZone, DecodeError> {
                    Ok(RiskZone {
                        zona: row.text(0)?,
                        incidentes_criticos: row.int(1)?,
                        coordenadas: row.opt_text(2)?,
                    })
                })
                .collect::<Result<_, DecodeError>>()?,
        ),
        ReportId::UserEfficiency => ReportRows::TopUsuariosEficientes(
            rows.iter()
                .map(|row| -> Result<UserEfficiency, DecodeError> {
                    Ok(UserEfficiency {
                        usuario: row.text(0)?,
                        reportes_resueltos: row.int(1)?,
                        promedio_comentarios: round2(row.opt_f64(2)?.unwrap_or(0.0)),
                    })
                })
                .collect::<Result<_, DecodeError>>()?,
        ),
        ReportId::SensorCorrelation => ReportRows::TopCorrelaciones(
            rows.iter()
                .map(|row| -> Result<SensorCorrelation, DecodeError> {
                    Ok(SensorCorrelation {
                        zona: row.text(0)?,
                        sensor: row.opt_text(1)?,
                        reportes_ciudadanos_afectados: row.int(2)?,
                    })
                })
                .collect::<Result<_, DecodeError>>()?,
        ),
    })
}

// ============================================================================
// Running Reports
// ============================================================================

/// Run one report on an open engine.
pub async fn run_report(
    engine: &mut dyn Engine,
    id: ReportId,
    options: &ReportOptions,
) -> Result<ReportDocument, ReportError> {
    let rows = engine
        .run_query(&id.query(options))
        .await
        .map_err(|source| ReportError::Query {
            report: id.name(),
            source,
        })?;
    let rows = decode_rows(id, &rows).map_err(|source| ReportError::Decode {
        report: id.name(),
        source,
    })?;

    Ok(ReportDocument {
        fecha_generacion: generation_timestamp(),
        descripcion: id.description(options),
        rows,
    })
}

/// Connect, run one report and close the connection.
pub async fn run_report_on(
    provider: &dyn ConnectionProvider,
    config: &EngineConfig,
    id: ReportId,
    options: &ReportOptions,
) -> Result<ReportDocument, ReportError> {
    let mut engine = open_engine(provider, config, ConnectTarget::Database).await?;
    let result = run_report(engine.as_mut(), id, options).await;
    close_engine(engine.as_mut()).await;
    result
}

/// The zone with the most Alta reports on one engine, if any.
pub async fn high_priority_zone(
    provider: &dyn ConnectionProvider,
    config: &EngineConfig,
) -> Result<Option<HighPriorityZone>, ReportError> {
    const REPORT: &str = "cross-engine";

    let mut engine = open_engine(provider, config, ConnectTarget::Database).await?;
    let result = engine
        .run_query(&AnalyticsQuery::TopHighPriorityZone)
        .await
        .map_err(|source| ReportError::Query {
            report: REPORT,
            source,
        });
    close_engine(engine.as_mut()).await;

    let rows = result?;
    rows.first()
        .map(|row| -> Result<HighPriorityZone, DecodeError> {
            Ok(HighPriorityZone {
                zona_mas_critica: row.text(0)?,
                reportes_alta_prioridad_total: row.int(1)?,
            })
        })
        .transpose()
        .map_err(|source| ReportError::Decode {
            report: REPORT,
            source,
        })
}

/// Top Alta zone from each engine, concatenated. Failing engines are
/// logged and left out.
pub async fn cross_engine_extract(
    provider: &dyn ConnectionProvider,
    configs: &[EngineConfig],
) -> Vec<HighPriorityZone> {
    let mut extract = Vec::with_capacity(configs.len());
    for config in configs {
        match high_priority_zone(provider, config).await {
            Ok(Some(zone)) => extract.push(zone),
            Ok(None) => info!(engine = %config.kind, "No Alta reports"),
            Err(e) => error!(
                engine = %config.kind,
                port = config.port,
                "Cross-engine extract failed: {e}"
            ),
        }
    }
    extract
}

// ============================================================================
// Export
// ============================================================================

/// Pretty-print `value` with a 4-space indent, leaving non-ASCII unescaped.
pub fn to_json_string<T: Serialize>(value: &T) -> Result<String, ReportError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ReportError> {
    let json = to_json_string(value)?;
    std::fs::write(path, json).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Which engine each report is exported from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPlan {
    pub output_dir: PathBuf,
    pub assignments: Vec<(ReportId, EngineConfig)>,
    /// Engines queried for the cross-engine extract, in output order.
    pub extract_engines: Vec<EngineConfig>,
    pub options: ReportOptions,
}

impl ExportPlan {
    /// Keep only reports and extract engines whose kind appears in
    /// `engines`. Dropped reports are logged and not written.
    pub fn restrict_to(mut self, engines: &[EngineConfig]) -> Self {
        let allowed = |config: &EngineConfig| engines.iter().any(|e| e.kind == config.kind);
        self.assignments.retain(|(id, config)| {
            let keep = allowed(config);
            if !keep {
                warn!(report = %id, engine = %config.kind, "Engine not provisioned, skipping report");
            }
            keep
        });
        self.extract_engines.retain(|config| allowed(config));
        self
    }
}

#[derive(Debug, Default)]
pub struct ExportSummary {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(ReportId, ReportError)>,
    pub extract_rows: usize,
}

/// Export every assigned report, then the cross-engine extract.
///
/// A report that fails is logged and skipped. Only failures to create the
/// output directory or to write the extract end the export.
pub async fn export(
    provider: &dyn ConnectionProvider,
    plan: &ExportPlan,
) -> Result<ExportSummary, ReportError> {
    std::fs::create_dir_all(&plan.output_dir).map_err(|source| ReportError::Io {
        path: plan.output_dir.clone(),
        source,
    })?;

    let mut summary = ExportSummary::default();
    for (id, config) in &plan.assignments {
        let path = plan.output_dir.join(id.file_name());
        let result = match run_report_on(provider, config, *id, &plan.options).await {
            Ok(document) => write_json(&path, &document).map(|()| document.rows.len()),
            Err(e) => Err(e),
        };
        match result {
            Ok(rows) => {
                info!(report = %id, engine = %config.kind, rows, path = ?path, "Report exported");
                summary.written.push(path);
            }
            Err(e) => {
                error!(report = %id, engine = %config.kind, port = config.port, "Report failed: {e}");
                summary.failed.push((*id, e));
            }
        }
    }

    let extract = cross_engine_extract(provider, &plan.extract_engines).await;
    let path = plan.output_dir.join(CROSS_ENGINE_FILE);
    write_json(&path, &extract)?;
    info!(rows = extract.len(), path = ?path, "Cross-engine extract exported");
    summary.extract_rows = extract.len();
    summary.written.push(path);

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use seed_core::SqlValue;

    #[test]
    fn test_document_keys_and_indent() {
        let document = ReportDocument {
            fecha_generacion: "2026-10-14T09:00:00.000000".into(),
            descripcion: "x".into(),
            rows: ReportRows::TopZonas(vec![RiskZone {
                zona: "Cádiz".into(),
                incidentes_criticos: 3,
                coordenadas: Some("36.5, -6.2".into()),
            }]),
        };
        let json = to_json_string(&document).unwrap();
        assert!(json.contains("\n    \"fecha_generacion\""));
        assert!(json.contains("\"top_zonas\": ["));
        assert!(json.contains("\"zona\": \"Cádiz\""));
        assert!(json.contains("\n            \"incidentes_criticos\": 3"));
    }

    #[test]
    fn test_average_rounds_and_defaults_to_zero() {
        let rows = vec![
            ResultRow(vec!["Ana".into(), SqlValue::Int(4), SqlValue::Text("1.6667".into())]),
            ResultRow(vec!["Luis".into(), SqlValue::Int(1), SqlValue::Null]),
        ];
        let ReportRows::TopUsuariosEficientes(users) =
            decode_rows(ReportId::UserEfficiency, &rows).unwrap()
        else {
            panic!("wrong rows");
        };
        assert_eq!(users[0].promedio_comentarios, 1.67);
        assert_eq!(users[1].promedio_comentarios, 0.0);
    }

    #[test]
    fn test_decode_error_names_column() {
        let rows = vec![ResultRow(vec!["Zona".into(), SqlValue::Text("x".into())])];
        let err = decode_rows(ReportId::TopRiskZones, &rows).unwrap_err();
        assert_eq!(err.index, 1);
    }

    #[test]
    fn test_window_description() {
        assert_eq!(describe_window(172_800), "2 días");
        assert_eq!(describe_window(3_600), "1 hora");
        assert_eq!(describe_window(90), "90 segundos");
    }

    #[test]
    fn test_timestamp_format() {
        let ts = generation_timestamp();
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, "%Y-%m-%dT%H:%M:%S%.6f").is_ok());
        assert_eq!(ts.len(), "2026-10-14T09:00:00.000000".len());
    }
}

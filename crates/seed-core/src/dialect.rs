//! SQL rendering shared by the dialects.
//!
//! The logical schema and the analytical queries are written once here.
//! A dialect only supplies what actually differs between engines: column
//! type spelling, the auto-increment key, bind placeholders and interval
//! arithmetic.

use crate::category::{Category, Priority, ReportStatus};
use crate::schema::{ColumnDefault, ColumnDefinition, ColumnType, Table};

/// Fixed queries run against a populated store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsQuery {
    /// `(RegistroSensor.id, Sensor.id_zona)` for every reading.
    ReadingZones,
    /// Zones by count of Crítica/Alta reports: `(nombre, count, coordenadas)`.
    TopRiskZones { limit: u32 },
    /// Users by resolved reports: `(nombre, count, avg comments)`.
    UserResolutionEfficiency { limit: u32 },
    /// Zone/sensor-type pairs by distinct alerted reports dated within
    /// `window_seconds` before a reading: `(zona, tipo, count)`.
    SensorReportCorrelation { window_seconds: i64, limit: u32 },
    /// The zone with the most Alta reports: `(nombre, count)`.
    TopHighPriorityZone,
    /// `(count)` of rows in a table.
    RowCount(Table),
    /// `(count)` of child rows whose non-null FK has no parent row.
    OrphanCount {
        child: Table,
        column: &'static str,
        parent: Table,
    },
}

/// Quote a string literal.
pub fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn literal_list<C: Category>(values: &[C]) -> String {
    values
        .iter()
        .map(|v| sql_literal(v.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Per-engine SQL differences.
pub trait SqlDialect {
    /// Column type spelling. For [`ColumnType::Serial`] this includes the
    /// primary key clause.
    fn column_type(&self, column_type: ColumnType) -> String;

    /// Bind placeholder for the 1-based parameter `index`.
    fn placeholder(&self, index: usize) -> String;

    /// Expression for `expr` minus `seconds` seconds.
    fn subtract_seconds(&self, expr: &str, seconds: i64) -> String;

    /// One column line of a CREATE TABLE statement.
    fn column_definition(&self, column: &ColumnDefinition) -> String {
        let mut line = format!("{} {}", column.name, self.column_type(column.column_type));
        if column.unique {
            line.push_str(" UNIQUE");
        }
        if column.not_null {
            line.push_str(" NOT NULL");
        }
        match column.default {
            Some(ColumnDefault::CurrentTimestamp) => line.push_str(" DEFAULT CURRENT_TIMESTAMP"),
            Some(ColumnDefault::Zero) => line.push_str(" DEFAULT 0"),
            None => {}
        }
        line
    }

    fn create_table(&self, table: Table) -> String {
        let mut lines: Vec<String> = table
            .columns()
            .iter()
            .map(|c| self.column_definition(c))
            .collect();
        lines.extend(table.foreign_keys().map(|(column, parent)| {
            format!(
                "FOREIGN KEY ({}) REFERENCES {}(id) ON DELETE CASCADE",
                column.name,
                parent.name()
            )
        }));
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            table.name(),
            lines.join(",\n    ")
        )
    }

    /// Multi-row INSERT for `rows` rows of `table`.
    fn insert_statement(&self, table: Table, rows: usize) -> String {
        let columns = table.insert_columns();
        let mut param = 0;
        let tuples: Vec<String> = (0..rows)
            .map(|_| {
                let placeholders: Vec<String> = columns
                    .iter()
                    .map(|_| {
                        param += 1;
                        self.placeholder(param)
                    })
                    .collect();
                format!("({})", placeholders.join(", "))
            })
            .collect();
        format!(
            "INSERT INTO {} ({}) VALUES {}",
            table.name(),
            columns.iter().map(|c| c.name).collect::<Vec<_>>().join(", "),
            tuples.join(", ")
        )
    }

    fn select_ids(&self, table: Table) -> String {
        format!("SELECT id FROM {} ORDER BY id", table.name())
    }

    fn render(&self, query: &AnalyticsQuery) -> String {
        match query {
            AnalyticsQuery::ReadingZones => {
                "SELECT R.id, S.id_zona FROM RegistroSensor R \
                 INNER JOIN Sensor S ON R.id_sensor = S.id ORDER BY R.id"
                    .to_string()
            }
            AnalyticsQuery::TopRiskZones { limit } => format!(
                "SELECT Z.nombre AS nombre_zona, COUNT(R.id) AS total_incidentes_criticos, Z.coordenadas \
                 FROM Zona Z JOIN Reporte R ON Z.id = R.id_zona \
                 WHERE R.prioridad IN ({}) \
                 GROUP BY Z.id, Z.nombre, Z.coordenadas \
                 ORDER BY total_incidentes_criticos DESC LIMIT {limit}",
                literal_list(&Priority::CRITICAL)
            ),
            AnalyticsQuery::UserResolutionEfficiency { limit } => format!(
                "SELECT U.nombre AS nombre_usuario, COUNT(R.id) AS reportes_resueltos, \
                 AVG(COALESCE(Sub.total_comentarios, 0)) AS promedio_comentarios_por_reporte \
                 FROM Usuario U JOIN Reporte R ON U.id = R.id_usuario \
                 LEFT JOIN (SELECT id_reporte, COUNT(id) AS total_comentarios \
                 FROM Comentario GROUP BY id_reporte) Sub ON R.id = Sub.id_reporte \
                 WHERE R.estado IN ({}) \
                 GROUP BY U.id, U.nombre \
                 ORDER BY reportes_resueltos DESC LIMIT {limit}",
                literal_list(&ReportStatus::RESOLVED)
            ),
            AnalyticsQuery::SensorReportCorrelation {
                window_seconds,
                limit,
            } => format!(
                "SELECT Z.nombre AS zona, S.tipo AS tipo_sensor, \
                 COUNT(DISTINCT R.id) AS reportes_ciudadanos_cercanos \
                 FROM RegistroSensor RS JOIN Sensor S ON RS.id_sensor = S.id \
                 JOIN Zona Z ON S.id_zona = Z.id \
                 JOIN Reporte R ON R.id_zona = Z.id \
                 JOIN Alerta A ON A.id_reporte = R.id \
                 WHERE R.fechaHora BETWEEN {} AND RS.fecha \
                 GROUP BY Z.nombre, S.tipo \
                 HAVING COUNT(R.id) > 0 \
                 ORDER BY reportes_ciudadanos_cercanos DESC LIMIT {limit}",
                self.subtract_seconds("RS.fecha", *window_seconds)
            ),
            AnalyticsQuery::TopHighPriorityZone => format!(
                "SELECT Z.nombre AS zona_mas_critica, COUNT(R.id) AS reportes_alta_prioridad_total \
                 FROM Zona Z JOIN Reporte R ON Z.id = R.id_zona \
                 WHERE R.prioridad = {} \
                 GROUP BY Z.nombre \
                 ORDER BY reportes_alta_prioridad_total DESC LIMIT 1",
                sql_literal(Priority::Alta.as_str())
            ),
            AnalyticsQuery::RowCount(table) => format!("SELECT COUNT(*) FROM {}", table.name()),
            AnalyticsQuery::OrphanCount {
                child,
                column,
                parent,
            } => format!(
                "SELECT COUNT(*) FROM {child} C LEFT JOIN {parent} P ON C.{column} = P.id \
                 WHERE C.{column} IS NOT NULL AND P.id IS NULL",
                child = child.name(),
                parent = parent.name(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl SqlDialect for Plain {
        fn column_type(&self, column_type: ColumnType) -> String {
            match column_type {
                ColumnType::Serial => "SERIAL PRIMARY KEY".into(),
                ColumnType::Int => "INT".into(),
                ColumnType::VarChar(n) => format!("VARCHAR({n})"),
                ColumnType::Text => "TEXT".into(),
                ColumnType::Decimal { precision, scale } => format!("DECIMAL({precision},{scale})"),
                ColumnType::Date => "DATE".into(),
                ColumnType::DateTime => "TIMESTAMP".into(),
            }
        }

        fn placeholder(&self, _index: usize) -> String {
            "?".into()
        }

        fn subtract_seconds(&self, expr: &str, seconds: i64) -> String {
            format!("{expr} - {seconds}")
        }
    }

    #[test]
    fn test_create_table_foreign_keys() {
        let ddl = Plain.create_table(Table::Indicador);
        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS Indicador ("));
        assert!(ddl.contains("id SERIAL PRIMARY KEY"));
        assert!(ddl.contains("valor DECIMAL(10,2)"));
        assert!(ddl.contains("fecha TIMESTAMP DEFAULT CURRENT_TIMESTAMP"));
        assert!(ddl.contains("FOREIGN KEY (id_zona) REFERENCES Zona(id) ON DELETE CASCADE"));
        assert!(ddl.contains(
            "FOREIGN KEY (id_registro_sensor) REFERENCES RegistroSensor(id) ON DELETE CASCADE"
        ));
    }

    #[test]
    fn test_column_constraints_order() {
        let ddl = Plain.create_table(Table::Usuario);
        assert!(ddl.contains("correo VARCHAR(100) UNIQUE NOT NULL"));
        let zona = Plain.create_table(Table::Zona);
        assert!(zona.contains("numeroIncidencias INT DEFAULT 0"));
    }

    #[test]
    fn test_insert_statement() {
        let sql = Plain.insert_statement(Table::Multimedia, 2);
        assert_eq!(
            sql,
            "INSERT INTO Multimedia (id_reporte, tipoArchivo, rutaArchivo) VALUES (?, ?, ?), (?, ?, ?)"
        );
    }

    #[test]
    fn test_render_uses_category_labels() {
        let sql = Plain.render(&AnalyticsQuery::TopRiskZones { limit: 5 });
        assert!(sql.contains("IN ('Crítica', 'Alta')"));
        assert!(sql.ends_with("LIMIT 5"));

        let sql = Plain.render(&AnalyticsQuery::UserResolutionEfficiency { limit: 5 });
        assert!(sql.contains("IN ('Cerrado', 'Resuelto')"));
        assert!(sql.contains("COALESCE(Sub.total_comentarios, 0)"));
    }

    #[test]
    fn test_render_correlation_window() {
        let sql = Plain.render(&AnalyticsQuery::SensorReportCorrelation {
            window_seconds: 172_800,
            limit: 5,
        });
        assert!(sql.contains("BETWEEN RS.fecha - 172800 AND RS.fecha"));
    }

    #[test]
    fn test_render_top_risk_zones_shape() {
        let sql = Plain.render(&AnalyticsQuery::TopRiskZones { limit: 5 });
        assert!(sql.starts_with(
            "SELECT Z.nombre AS nombre_zona, COUNT(R.id) AS total_incidentes_criticos, Z.coordenadas "
        ));
        assert!(sql.contains("GROUP BY Z.id, Z.nombre, Z.coordenadas"));
        assert!(sql.contains("ORDER BY total_incidentes_criticos DESC"));
    }

    #[test]
    fn test_render_user_efficiency_shape() {
        let sql = Plain.render(&AnalyticsQuery::UserResolutionEfficiency { limit: 3 });
        assert!(sql.contains("JOIN Reporte R ON U.id = R.id_usuario"));
        // Comments are counted per report before averaging, so reports
        // without comments still join.
        assert!(sql.contains("LEFT JOIN (SELECT id_reporte, COUNT(id) AS total_comentarios"));
        assert!(sql.contains("GROUP BY id_reporte) Sub ON R.id = Sub.id_reporte"));
        assert!(sql.contains("GROUP BY U.id, U.nombre"));
        assert!(sql.contains("ORDER BY reportes_resueltos DESC LIMIT 3"));
    }

    #[test]
    fn test_render_sensor_correlation_shape() {
        let sql = Plain.render(&AnalyticsQuery::SensorReportCorrelation {
            window_seconds: 60,
            limit: 5,
        });
        // Several readings or alerts per report must count the report once.
        assert!(sql.contains("COUNT(DISTINCT R.id) AS reportes_ciudadanos_cercanos"));
        assert!(sql.contains("JOIN Alerta A ON A.id_reporte = R.id"));
        assert!(sql.contains("JOIN Reporte R ON R.id_zona = Z.id"));
        assert!(sql.contains("GROUP BY Z.nombre, S.tipo"));
        assert!(sql.contains("ORDER BY reportes_ciudadanos_cercanos DESC LIMIT 5"));
    }

    #[test]
    fn test_render_high_priority_zone_shape() {
        let sql = Plain.render(&AnalyticsQuery::TopHighPriorityZone);
        assert!(sql.contains("WHERE R.prioridad = 'Alta'"));
        assert!(sql.contains("GROUP BY Z.nombre"));
        assert!(sql.ends_with("ORDER BY reportes_alta_prioridad_total DESC LIMIT 1"));
    }

    #[test]
    fn test_sql_literal_escapes_quotes() {
        assert_eq!(sql_literal("O'Brien"), "'O''Brien'");
    }
}

//! MySQL/MariaDB SQL dialect.

use seed_core::{ColumnType, SqlDialect};

/// SQL spelling shared by MySQL and MariaDB.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl SqlDialect for MySqlDialect {
    fn column_type(&self, column_type: ColumnType) -> String {
        match column_type {
            ColumnType::Serial => "INT AUTO_INCREMENT PRIMARY KEY".to_string(),
            ColumnType::Int => "INT".to_string(),
            ColumnType::VarChar(length) => format!("VARCHAR({length})"),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Decimal { precision, scale } => format!("DECIMAL({precision},{scale})"),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::DateTime => "DATETIME".to_string(),
        }
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn subtract_seconds(&self, expr: &str, seconds: i64) -> String {
        format!("DATE_SUB({expr}, INTERVAL {seconds} SECOND)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seed_core::{AnalyticsQuery, Table};

    #[test]
    fn test_create_table_usuario() {
        let ddl = MySqlDialect.create_table(Table::Usuario);
        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS Usuario ("));
        assert!(ddl.contains("id INT AUTO_INCREMENT PRIMARY KEY"));
        assert!(ddl.contains("correo VARCHAR(100) UNIQUE NOT NULL"));
        assert!(ddl.contains("fechaDeRegistro DATETIME DEFAULT CURRENT_TIMESTAMP"));
    }

    #[test]
    fn test_create_table_sensor() {
        let ddl = MySqlDialect.create_table(Table::Sensor);
        assert!(ddl.contains("fechaInstalacion DATE"));
        assert!(ddl.contains("FOREIGN KEY (id_zona) REFERENCES Zona(id) ON DELETE CASCADE"));
    }

    #[test]
    fn test_insert_uses_question_marks() {
        let sql = MySqlDialect.insert_statement(Table::Alerta, 1);
        assert_eq!(
            sql,
            "INSERT INTO Alerta (id_reporte, tipo, mensaje, fecha) VALUES (?, ?, ?, ?)"
        );
    }

    #[test]
    fn test_correlation_interval() {
        let sql = MySqlDialect.render(&AnalyticsQuery::SensorReportCorrelation {
            window_seconds: 3600,
            limit: 5,
        });
        assert!(sql.contains("BETWEEN DATE_SUB(RS.fecha, INTERVAL 3600 SECOND) AND RS.fecha"));
    }

    #[test]
    fn test_reports_keep_grouping_and_ranking() {
        let cases = [
            (
                AnalyticsQuery::TopRiskZones { limit: 5 },
                "GROUP BY Z.id, Z.nombre, Z.coordenadas",
                "ORDER BY total_incidentes_criticos DESC LIMIT 5",
            ),
            (
                AnalyticsQuery::UserResolutionEfficiency { limit: 5 },
                "GROUP BY U.id, U.nombre",
                "ORDER BY reportes_resueltos DESC LIMIT 5",
            ),
            (
                AnalyticsQuery::SensorReportCorrelation {
                    window_seconds: 172_800,
                    limit: 5,
                },
                "GROUP BY Z.nombre, S.tipo",
                "ORDER BY reportes_ciudadanos_cercanos DESC LIMIT 5",
            ),
            (
                AnalyticsQuery::TopHighPriorityZone,
                "GROUP BY Z.nombre",
                "ORDER BY reportes_alta_prioridad_total DESC LIMIT 1",
            ),
        ];
        for (query, group_by, order_by) in cases {
            let sql = MySqlDialect.render(&query);
            assert!(sql.contains(group_by), "{sql}");
            assert!(sql.ends_with(order_by), "{sql}");
        }

        let correlation = MySqlDialect.render(&AnalyticsQuery::SensorReportCorrelation {
            window_seconds: 60,
            limit: 5,
        });
        assert!(correlation.contains("COUNT(DISTINCT R.id)"));
    }
}

//! Main entity generator for producing rows of the negocio schema.

use crate::generators::numeric::{generate_coordinates, generate_decimal, generate_int_range};
use crate::generators::person::{
    generate_address, generate_city, generate_name, generate_phone, EmailRegistry,
};
use crate::generators::text::{generate_paragraph, generate_sentence, generate_text};
use crate::generators::timestamp::{generate_date_this_year, generate_timestamp_this_year};
use crate::generators::{generate_uuid_v4, sample, sample_id};
use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seed_core::category::{
    AlertType, FileType, IncidentType, IndicatorName, InformeType, Priority, ReadingUnit,
    ReportMedium, ReportStatus, SensorType, ZoneCategory, INFORME_SOURCES, SENSOR_ACTIVE,
};
use seed_core::{Category, EntityRow, IdPools, SqlValue, Table};

/// Error type for generator operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeneratorError {
    /// A parent pool has no ids to reference.
    #[error("no {0} ids available to reference")]
    EmptyPool(Table),

    /// The table's foreign keys are pinned by a query, not sampled.
    #[error("{0} rows are derived from existing data; use the dedicated constructor")]
    DerivedTable(Table),
}

/// Generator that produces one plausible row per call.
///
/// All randomness comes from a seeded [`StdRng`], and "now" is pinned at
/// construction, so the same seed always yields the same rows.
pub struct EntityGenerator {
    rng: StdRng,
    now: NaiveDateTime,
    emails: EmailRegistry,
}

impl EntityGenerator {
    /// Create a generator seeded with `seed`, pinned to the current local time.
    pub fn new(seed: u64) -> Self {
        Self::with_clock(seed, chrono::Local::now().naive_local())
    }

    /// Create a generator pinned to an explicit "now".
    pub fn with_clock(seed: u64, now: NaiveDateTime) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            now,
            emails: EmailRegistry::new(),
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// Generate one row for `table`, drawing foreign keys from `pools`.
    pub fn generate(&mut self, table: Table, pools: &IdPools) -> Result<EntityRow, GeneratorError> {
        let values = match table {
            Table::Usuario => self.usuario(),
            Table::Zona => self.zona(),
            Table::Reporte => self.reporte(pools)?,
            Table::Comentario => self.comentario(pools)?,
            Table::Multimedia => self.multimedia(pools)?,
            Table::Alerta => self.alerta(pools)?,
            Table::Sensor => self.sensor(pools)?,
            Table::RegistroSensor => self.registro_sensor(pools)?,
            Table::Indicador => return Err(GeneratorError::DerivedTable(Table::Indicador)),
            Table::Informe => self.informe(pools)?,
        };
        Ok(EntityRow::new(table, values))
    }

    /// Generate the Indicador row for one reading and the zone of its sensor.
    pub fn indicador(&mut self, registro_id: i64, zona_id: i64) -> EntityRow {
        let values = vec![
            zona_id.into(),
            registro_id.into(),
            self.category::<IndicatorName>(),
            generate_sentence(&mut self.rng, 5).into(),
            generate_decimal(&mut self.rng, 2, 2, 1, 10).into(),
            self.timestamp(),
        ];
        EntityRow::new(Table::Indicador, values)
    }

    fn parent(&mut self, pools: &IdPools, table: Table) -> Result<SqlValue, GeneratorError> {
        sample_id(&mut self.rng, pools.get(table))
            .map(SqlValue::Int)
            .ok_or(GeneratorError::EmptyPool(table))
    }

    fn category<C: Category>(&mut self) -> SqlValue {
        sample::<C, _>(&mut self.rng).as_str().into()
    }

    fn timestamp(&mut self) -> SqlValue {
        generate_timestamp_this_year(&mut self.rng, self.now).into()
    }

    fn usuario(&mut self) -> Vec<SqlValue> {
        vec![
            generate_name(&mut self.rng).into(),
            self.emails.generate(&mut self.rng).into(),
            generate_phone(&mut self.rng).into(),
            generate_address(&mut self.rng).into(),
            self.timestamp(),
        ]
    }

    fn zona(&mut self) -> Vec<SqlValue> {
        vec![
            generate_city(&mut self.rng).into(),
            self.category::<ZoneCategory>(),
            generate_int_range(&mut self.rng, 0, 100).into(),
            generate_coordinates(&mut self.rng).into(),
        ]
    }

    fn reporte(&mut self, pools: &IdPools) -> Result<Vec<SqlValue>, GeneratorError> {
        let usuario = self.parent(pools, Table::Usuario)?;
        let zona = self.parent(pools, Table::Zona)?;
        let incident = sample::<IncidentType, _>(&mut self.rng);
        let descripcion = format!(
            "Reporte de {incident} cerca de {}. Detalle: {}",
            generate_city(&mut self.rng),
            generate_paragraph(&mut self.rng, 2)
        );
        Ok(vec![
            usuario,
            zona,
            incident.as_str().into(),
            descripcion.into(),
            self.timestamp(),
            self.category::<ReportStatus>(),
            self.category::<Priority>(),
            self.category::<ReportMedium>(),
            generate_address(&mut self.rng).into(),
        ])
    }

    fn comentario(&mut self, pools: &IdPools) -> Result<Vec<SqlValue>, GeneratorError> {
        Ok(vec![
            self.parent(pools, Table::Usuario)?,
            self.parent(pools, Table::Reporte)?,
            generate_sentence(&mut self.rng, 8).into(),
            self.timestamp(),
        ])
    }

    fn multimedia(&mut self, pools: &IdPools) -> Result<Vec<SqlValue>, GeneratorError> {
        Ok(vec![
            self.parent(pools, Table::Reporte)?,
            self.category::<FileType>(),
            format!("/evidencia/{}", generate_uuid_v4(&mut self.rng)).into(),
        ])
    }

    fn alerta(&mut self, pools: &IdPools) -> Result<Vec<SqlValue>, GeneratorError> {
        Ok(vec![
            self.parent(pools, Table::Reporte)?,
            self.category::<AlertType>(),
            generate_sentence(&mut self.rng, 10).into(),
            self.timestamp(),
        ])
    }

    fn sensor(&mut self, pools: &IdPools) -> Result<Vec<SqlValue>, GeneratorError> {
        Ok(vec![
            self.parent(pools, Table::Zona)?,
            self.category::<SensorType>(),
            generate_address(&mut self.rng).into(),
            generate_date_this_year(&mut self.rng, self.now).into(),
            format!("MOD-{}", self.rng.gen_range(100..=999)).into(),
            SENSOR_ACTIVE.into(),
        ])
    }

    fn registro_sensor(&mut self, pools: &IdPools) -> Result<Vec<SqlValue>, GeneratorError> {
        Ok(vec![
            self.parent(pools, Table::Sensor)?,
            self.timestamp(),
            generate_decimal(&mut self.rng, 3, 2, 40, 95).into(),
            self.category::<ReadingUnit>(),
        ])
    }

    fn informe(&mut self, pools: &IdPools) -> Result<Vec<SqlValue>, GeneratorError> {
        let indicador = self.parent(pools, Table::Indicador)?;
        let titulo = format!(
            "{} - {}",
            sample::<InformeType, _>(&mut self.rng),
            generate_city(&mut self.rng)
        );
        Ok(vec![
            indicador,
            titulo.into(),
            generate_text(&mut self.rng, 200).into(),
            self.timestamp(),
            self.category::<InformeType>(),
            INFORME_SOURCES.into(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};
    use rust_decimal::Decimal;
    use std::collections::HashSet;

    fn clock() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 14)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn full_pools() -> IdPools {
        let mut pools = IdPools::new();
        pools.publish(Table::Usuario, vec![1, 2, 3]);
        pools.publish(Table::Zona, vec![10, 11]);
        pools.publish(Table::Reporte, vec![100, 101, 102]);
        pools.publish(Table::Sensor, vec![20]);
        pools.publish(Table::Indicador, vec![7, 8]);
        pools
    }

    #[test]
    fn test_every_row_matches_insert_columns() {
        let pools = full_pools();
        let mut generator = EntityGenerator::with_clock(42, clock());

        for table in Table::ALL {
            let row = match table {
                Table::Indicador => generator.indicador(1, 10),
                _ => generator.generate(table, &pools).unwrap(),
            };
            assert_eq!(row.values.len(), table.insert_columns().len(), "{table}");
        }
    }

    #[test]
    fn test_deterministic_generation() {
        let pools = full_pools();
        let mut gen1 = EntityGenerator::with_clock(42, clock());
        let mut gen2 = EntityGenerator::with_clock(42, clock());

        for table in [Table::Usuario, Table::Reporte, Table::Informe] {
            assert_eq!(
                gen1.generate(table, &pools).unwrap(),
                gen2.generate(table, &pools).unwrap()
            );
        }
    }

    #[test]
    fn test_foreign_keys_come_from_pools() {
        let pools = full_pools();
        let mut generator = EntityGenerator::with_clock(42, clock());

        for _ in 0..100 {
            let row = generator.generate(Table::Reporte, &pools).unwrap();
            let usuario = row.get("id_usuario").unwrap().as_i64().unwrap();
            let zona = row.get("id_zona").unwrap().as_i64().unwrap();
            assert!(pools.get(Table::Usuario).contains(&usuario));
            assert!(pools.get(Table::Zona).contains(&zona));
        }
    }

    #[test]
    fn test_empty_pool_is_an_error() {
        let mut generator = EntityGenerator::with_clock(42, clock());
        let result = generator.generate(Table::Sensor, &IdPools::new());
        assert_eq!(result, Err(GeneratorError::EmptyPool(Table::Zona)));
    }

    #[test]
    fn test_indicador_is_derived_only() {
        let mut generator = EntityGenerator::with_clock(42, clock());
        let result = generator.generate(Table::Indicador, &full_pools());
        assert_eq!(result, Err(GeneratorError::DerivedTable(Table::Indicador)));

        let row = generator.indicador(5, 11);
        assert_eq!(row.get("id_registro_sensor"), Some(&SqlValue::Int(5)));
        assert_eq!(row.get("id_zona"), Some(&SqlValue::Int(11)));
    }

    #[test]
    fn test_usuario_emails_unique() {
        let mut generator = EntityGenerator::with_clock(42, clock());
        let pools = IdPools::new();
        let emails: HashSet<String> = (0..2000)
            .map(|_| {
                let row = generator.generate(Table::Usuario, &pools).unwrap();
                row.get("correo").unwrap().as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(emails.len(), 2000);
    }

    #[test]
    fn test_reading_values() {
        let mut generator = EntityGenerator::with_clock(42, clock());
        let pools = full_pools();
        for _ in 0..100 {
            let row = generator.generate(Table::RegistroSensor, &pools).unwrap();
            let SqlValue::Decimal(valor) = row.get("valor").unwrap() else {
                panic!("valor should be a decimal");
            };
            assert!(*valor >= Decimal::new(40, 0) && *valor <= Decimal::new(95, 0));
            let unidad = row.get("unidad").unwrap().as_str().unwrap();
            assert!(unidad == "dB" || unidad == "PPM");
            let fecha = row.get("fecha").unwrap().as_datetime().unwrap();
            assert_eq!(fecha.year(), 2026);
            assert!(fecha <= clock());
        }
    }

    #[test]
    fn test_reporte_description() {
        let mut generator = EntityGenerator::with_clock(42, clock());
        let row = generator.generate(Table::Reporte, &full_pools()).unwrap();
        let tipo = row.get("tipoIncidencia").unwrap().as_str().unwrap();
        let descripcion = row.get("descripcion").unwrap().as_str().unwrap();
        assert!(descripcion.starts_with(&format!("Reporte de {tipo} cerca de ")));
        assert!(descripcion.contains(". Detalle: "));
    }

    #[test]
    fn test_sensor_fields() {
        let mut generator = EntityGenerator::with_clock(42, clock());
        let row = generator.generate(Table::Sensor, &full_pools()).unwrap();
        assert_eq!(row.get("estado").unwrap().as_str(), Some("Activo"));
        let modelo = row.get("modelo").unwrap().as_str().unwrap();
        let number: u32 = modelo.strip_prefix("MOD-").unwrap().parse().unwrap();
        assert!((100..=999).contains(&number));
        assert!(matches!(row.get("fechaInstalacion"), Some(SqlValue::Date(_))));
    }
}

//! Hand-written rows for tests that need exact control over the data.
//!
//! Values follow the insert column order of each table. Timestamps default
//! to noon on 2026-01-01 unless given.

use chrono::{NaiveDate, NaiveDateTime};
use seed_core::{EntityRow, SqlValue, Table};

/// `2026-01-<day> <hour>:00:00`.
pub fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .unwrap_or_default()
}

pub fn usuario(nombre: &str, correo: &str) -> EntityRow {
    EntityRow::new(
        Table::Usuario,
        vec![
            nombre.into(),
            correo.into(),
            "+34 600 00 00 00".into(),
            "Calle Mayor, 1, 28001 Madrid, Madrid".into(),
            at(1, 12).into(),
        ],
    )
}

pub fn zona(nombre: &str) -> EntityRow {
    EntityRow::new(
        Table::Zona,
        vec![
            nombre.into(),
            "Zona Céntrica".into(),
            SqlValue::Int(0),
            "40.416775, -3.703790".into(),
        ],
    )
}

pub fn reporte(usuario: i64, zona: i64, estado: &str, prioridad: &str) -> EntityRow {
    reporte_at(usuario, zona, estado, prioridad, at(1, 12))
}

pub fn reporte_at(
    usuario: i64,
    zona: i64,
    estado: &str,
    prioridad: &str,
    fecha_hora: NaiveDateTime,
) -> EntityRow {
    EntityRow::new(
        Table::Reporte,
        vec![
            usuario.into(),
            zona.into(),
            "Robo".into(),
            "Reporte de prueba".into(),
            fecha_hora.into(),
            estado.into(),
            prioridad.into(),
            "App".into(),
            "Plaza Mayor, 1".into(),
        ],
    )
}

pub fn comentario(usuario: i64, reporte: i64) -> EntityRow {
    EntityRow::new(
        Table::Comentario,
        vec![usuario.into(), reporte.into(), "Comentario".into(), at(1, 13).into()],
    )
}

pub fn alerta(reporte: i64) -> EntityRow {
    EntityRow::new(
        Table::Alerta,
        vec![reporte.into(), "Seguridad".into(), "Alerta".into(), at(1, 13).into()],
    )
}

pub fn sensor(zona: i64, tipo: &str) -> EntityRow {
    EntityRow::new(
        Table::Sensor,
        vec![
            zona.into(),
            tipo.into(),
            "Calle Sensor, 2".into(),
            at(1, 0).date().into(),
            "MOD-100".into(),
            "Activo".into(),
        ],
    )
}

pub fn registro(sensor: i64, fecha: NaiveDateTime) -> EntityRow {
    EntityRow::new(
        Table::RegistroSensor,
        vec![sensor.into(), fecha.into(), SqlValue::Float(55.5), "dB".into()],
    )
}

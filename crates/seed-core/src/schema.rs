//! Logical schema of the `negocio` database.
//!
//! The ten tables form a DAG by foreign key. The definitions here are the
//! single source of truth: every SQL dialect renders its DDL from them and
//! the seeder derives its insert column lists from them, so the logical
//! schema is the same on every engine.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ============================================================================
// Column Types
// ============================================================================

/// Logical column type, rendered per dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Server-generated auto-incrementing integer primary key.
    Serial,
    /// 32-bit integer.
    Int,
    /// Bounded character string.
    VarChar(u16),
    /// Unbounded text.
    Text,
    /// Exact decimal with total digits and digits after the point.
    Decimal { precision: u8, scale: u8 },
    /// Calendar date.
    Date,
    /// Timestamp without time zone.
    DateTime,
}

/// Column default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnDefault {
    CurrentTimestamp,
    Zero,
}

/// A single column of a table definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub not_null: bool,
    pub unique: bool,
    pub default: Option<ColumnDefault>,
    /// Parent table for foreign-key columns. Always `ON DELETE CASCADE`.
    pub references: Option<Table>,
}

impl ColumnDefinition {
    const fn new(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            not_null: false,
            unique: false,
            default: None,
            references: None,
        }
    }

    const fn id() -> Self {
        Self::new("id", ColumnType::Serial)
    }

    const fn foreign_key(name: &'static str, parent: Table) -> Self {
        let mut column = Self::new(name, ColumnType::Int);
        column.references = Some(parent);
        column
    }

    const fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    const fn default_now(mut self) -> Self {
        self.default = Some(ColumnDefault::CurrentTimestamp);
        self
    }

    const fn default_zero(mut self) -> Self {
        self.default = Some(ColumnDefault::Zero);
        self
    }

    /// Whether this column is the server-generated primary key.
    pub fn is_primary_key(&self) -> bool {
        self.column_type == ColumnType::Serial
    }
}

use ColumnType::{Date, DateTime, Int, Text, VarChar};

const DECIMAL_10_2: ColumnType = ColumnType::Decimal {
    precision: 10,
    scale: 2,
};

const USUARIO: &[ColumnDefinition] = &[
    ColumnDefinition::id(),
    ColumnDefinition::new("nombre", VarChar(100)).not_null(),
    ColumnDefinition::new("correo", VarChar(100)).unique().not_null(),
    ColumnDefinition::new("telefono", VarChar(20)),
    ColumnDefinition::new("direccion", VarChar(150)),
    ColumnDefinition::new("fechaDeRegistro", DateTime).default_now(),
];

const ZONA: &[ColumnDefinition] = &[
    ColumnDefinition::id(),
    ColumnDefinition::new("nombre", VarChar(100)).not_null(),
    ColumnDefinition::new("categoria", VarChar(50)),
    ColumnDefinition::new("numeroIncidencias", Int).default_zero(),
    ColumnDefinition::new("coordenadas", VarChar(255)),
];

const REPORTE: &[ColumnDefinition] = &[
    ColumnDefinition::id(),
    ColumnDefinition::foreign_key("id_usuario", Table::Usuario),
    ColumnDefinition::foreign_key("id_zona", Table::Zona),
    ColumnDefinition::new("tipoIncidencia", VarChar(100)),
    ColumnDefinition::new("descripcion", Text),
    ColumnDefinition::new("fechaHora", DateTime).default_now(),
    ColumnDefinition::new("estado", VarChar(50)),
    ColumnDefinition::new("prioridad", VarChar(20)),
    ColumnDefinition::new("medioReporte", VarChar(50)),
    ColumnDefinition::new("ubicacion", VarChar(150)),
];

const COMENTARIO: &[ColumnDefinition] = &[
    ColumnDefinition::id(),
    ColumnDefinition::foreign_key("id_usuario", Table::Usuario),
    ColumnDefinition::foreign_key("id_reporte", Table::Reporte),
    ColumnDefinition::new("texto", Text),
    ColumnDefinition::new("fecha", DateTime).default_now(),
];

const MULTIMEDIA: &[ColumnDefinition] = &[
    ColumnDefinition::id(),
    ColumnDefinition::foreign_key("id_reporte", Table::Reporte),
    ColumnDefinition::new("tipoArchivo", VarChar(50)),
    ColumnDefinition::new("rutaArchivo", VarChar(255)),
];

const ALERTA: &[ColumnDefinition] = &[
    ColumnDefinition::id(),
    ColumnDefinition::foreign_key("id_reporte", Table::Reporte),
    ColumnDefinition::new("tipo", VarChar(50)),
    ColumnDefinition::new("mensaje", Text),
    ColumnDefinition::new("fecha", DateTime).default_now(),
];

const SENSOR: &[ColumnDefinition] = &[
    ColumnDefinition::id(),
    ColumnDefinition::foreign_key("id_zona", Table::Zona),
    ColumnDefinition::new("tipo", VarChar(50)),
    ColumnDefinition::new("ubicacion", VarChar(150)),
    ColumnDefinition::new("fechaInstalacion", Date),
    ColumnDefinition::new("modelo", VarChar(50)),
    ColumnDefinition::new("estado", VarChar(50)),
];

const REGISTRO_SENSOR: &[ColumnDefinition] = &[
    ColumnDefinition::id(),
    ColumnDefinition::foreign_key("id_sensor", Table::Sensor),
    ColumnDefinition::new("fecha", DateTime).default_now(),
    ColumnDefinition::new("valor", DECIMAL_10_2),
    ColumnDefinition::new("unidad", VarChar(20)),
];

const INDICADOR: &[ColumnDefinition] = &[
    ColumnDefinition::id(),
    ColumnDefinition::foreign_key("id_zona", Table::Zona),
    ColumnDefinition::foreign_key("id_registro_sensor", Table::RegistroSensor),
    ColumnDefinition::new("nombre", VarChar(100)),
    ColumnDefinition::new("descripcion", Text),
    ColumnDefinition::new("valor", DECIMAL_10_2),
    ColumnDefinition::new("fecha", DateTime).default_now(),
];

const INFORME: &[ColumnDefinition] = &[
    ColumnDefinition::id(),
    ColumnDefinition::foreign_key("id_indicador", Table::Indicador),
    ColumnDefinition::new("titulo", VarChar(100)),
    ColumnDefinition::new("descripcion", Text),
    ColumnDefinition::new("fecha", DateTime).default_now(),
    ColumnDefinition::new("tipo", VarChar(50)),
    ColumnDefinition::new("fuentes", Text),
];

// ============================================================================
// Tables
// ============================================================================

/// Placeholder limit of one statement on both PostgreSQL and MySQL.
pub const MAX_BIND_PARAMETERS: usize = 65_535;

/// The tables of the `negocio` schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Usuario,
    Zona,
    Reporte,
    Comentario,
    Multimedia,
    Alerta,
    Sensor,
    RegistroSensor,
    Indicador,
    Informe,
}

impl Table {
    /// All tables in creation order. Every table appears after the tables it
    /// references.
    pub const ALL: [Table; 10] = [
        Table::Usuario,
        Table::Zona,
        Table::Reporte,
        Table::Comentario,
        Table::Multimedia,
        Table::Alerta,
        Table::Sensor,
        Table::RegistroSensor,
        Table::Indicador,
        Table::Informe,
    ];

    /// Table name as written in DDL and queries.
    pub fn name(self) -> &'static str {
        match self {
            Table::Usuario => "Usuario",
            Table::Zona => "Zona",
            Table::Reporte => "Reporte",
            Table::Comentario => "Comentario",
            Table::Multimedia => "Multimedia",
            Table::Alerta => "Alerta",
            Table::Sensor => "Sensor",
            Table::RegistroSensor => "RegistroSensor",
            Table::Indicador => "Indicador",
            Table::Informe => "Informe",
        }
    }

    /// All columns including the primary key.
    pub fn columns(self) -> &'static [ColumnDefinition] {
        match self {
            Table::Usuario => USUARIO,
            Table::Zona => ZONA,
            Table::Reporte => REPORTE,
            Table::Comentario => COMENTARIO,
            Table::Multimedia => MULTIMEDIA,
            Table::Alerta => ALERTA,
            Table::Sensor => SENSOR,
            Table::RegistroSensor => REGISTRO_SENSOR,
            Table::Indicador => INDICADOR,
            Table::Informe => INFORME,
        }
    }

    /// Columns supplied on INSERT: everything but the primary key.
    pub fn insert_columns(self) -> &'static [ColumnDefinition] {
        // The primary key is always the first column.
        &self.columns()[1..]
    }

    /// Position of a column within [`Table::insert_columns`].
    pub fn insert_column_index(self, column: &str) -> Option<usize> {
        self.insert_columns().iter().position(|c| c.name == column)
    }

    /// Largest multi-row INSERT that stays within [`MAX_BIND_PARAMETERS`].
    pub fn max_batch_rows(self) -> usize {
        MAX_BIND_PARAMETERS / self.insert_columns().len()
    }

    /// Foreign-key columns and the tables they reference.
    pub fn foreign_keys(self) -> impl Iterator<Item = (&'static ColumnDefinition, Table)> {
        self.columns()
            .iter()
            .filter_map(|c| c.references.map(|parent| (c, parent)))
    }

    /// Look a table up by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Table> {
        Table::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Schema Shape
// ============================================================================

/// Table and column names present in a database, lower-cased.
///
/// PostgreSQL folds unquoted identifiers to lower case while MySQL keeps
/// them as written, so shapes are compared case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaShape {
    tables: BTreeMap<String, BTreeSet<String>>,
}

impl SchemaShape {
    /// Shape expected after provisioning the given tables.
    pub fn from_tables(tables: &[Table]) -> Self {
        let mut shape = Self::default();
        for table in tables {
            for column in table.columns() {
                shape.add_column(table.name(), column.name);
            }
        }
        shape
    }

    pub fn add_column(&mut self, table: &str, column: &str) {
        self.tables
            .entry(table.to_ascii_lowercase())
            .or_default()
            .insert(column.to_ascii_lowercase());
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn columns(&self, table: &str) -> Option<&BTreeSet<String>> {
        self.tables.get(&table.to_ascii_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parents_precede_children() {
        for (position, table) in Table::ALL.iter().enumerate() {
            for (column, parent) in table.foreign_keys() {
                let parent_position = Table::ALL.iter().position(|t| *t == parent).unwrap();
                assert!(
                    parent_position < position,
                    "{table}.{} references {parent}, which is created later",
                    column.name
                );
            }
        }
    }

    #[test]
    fn test_primary_key_is_first_column() {
        for table in Table::ALL {
            let columns = table.columns();
            assert!(columns[0].is_primary_key(), "{table} must start with id");
            assert!(columns[1..].iter().all(|c| !c.is_primary_key()));
        }
    }

    #[test]
    fn test_max_batch_rows_fits_placeholder_limit() {
        for table in Table::ALL {
            let rows = table.max_batch_rows();
            assert!(rows * table.insert_columns().len() <= MAX_BIND_PARAMETERS);
            assert!((rows + 1) * table.insert_columns().len() > MAX_BIND_PARAMETERS);
        }
        assert_eq!(Table::Zona.max_batch_rows(), MAX_BIND_PARAMETERS / 4);
    }

    #[test]
    fn test_foreign_keys() {
        let parents: Vec<Table> = Table::Indicador.foreign_keys().map(|(_, t)| t).collect();
        assert_eq!(parents, vec![Table::Zona, Table::RegistroSensor]);
        assert_eq!(Table::Usuario.foreign_keys().count(), 0);
        assert_eq!(Table::Zona.foreign_keys().count(), 0);
    }

    #[test]
    fn test_correo_is_unique() {
        let correo = Table::Usuario
            .columns()
            .iter()
            .find(|c| c.name == "correo")
            .unwrap();
        assert!(correo.unique);
        assert!(correo.not_null);
    }

    #[test]
    fn test_insert_column_index() {
        assert_eq!(Table::Reporte.insert_column_index("id_usuario"), Some(0));
        assert_eq!(Table::Reporte.insert_column_index("ubicacion"), Some(8));
        assert_eq!(Table::Reporte.insert_column_index("id"), None);
    }

    #[test]
    fn test_from_name_ignores_case() {
        assert_eq!(
            Table::from_name("registrosensor"),
            Some(Table::RegistroSensor)
        );
        assert_eq!(Table::from_name("Informe"), Some(Table::Informe));
        assert_eq!(Table::from_name("missing"), None);
    }

    #[test]
    fn test_schema_shape_is_case_insensitive() {
        let expected = SchemaShape::from_tables(&[Table::Usuario]);

        let mut folded = SchemaShape::default();
        for column in ["id", "nombre", "correo", "telefono", "direccion", "fechaderegistro"] {
            folded.add_column("usuario", column);
        }

        assert_eq!(expected, folded);
        assert!(expected
            .columns("USUARIO")
            .unwrap()
            .contains("fechaderegistro"));
    }
}

//! Value representations shared by the generator, the engines and the reports.

use crate::schema::Table;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// A single SQL value, independent of the engine it is bound to or read from.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Integer view. Drivers that return numbers as text are accepted.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Decimal(d) => d.to_i64(),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Floating point view of any numeric value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Decimal(d) => d.to_f64(),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            Self::Date(d) => d.and_hms_opt(0, 0, 0),
            Self::Text(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").ok(),
            _ => None,
        }
    }

    /// Short type name used in decode errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Decimal(_) => "decimal",
            Self::Text(_) => "text",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Decimal> for SqlValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One generated row, with values in [`Table::insert_columns`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRow {
    pub table: Table,
    pub values: Vec<SqlValue>,
}

impl EntityRow {
    pub fn new(table: Table, values: Vec<SqlValue>) -> Self {
        debug_assert_eq!(values.len(), table.insert_columns().len());
        Self { table, values }
    }

    /// Value of the named insert column.
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.table
            .insert_column_index(column)
            .and_then(|idx| self.values.get(idx))
    }
}

/// Error decoding a query result column.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("column {index}: expected {expected}, found {found}")]
pub struct DecodeError {
    pub index: usize,
    pub expected: &'static str,
    pub found: &'static str,
}

/// One row returned by [`crate::Engine::run_query`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRow(pub Vec<SqlValue>);

impl ResultRow {
    pub fn get(&self, index: usize) -> Option<&SqlValue> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn decode<T>(
        &self,
        index: usize,
        expected: &'static str,
        view: impl FnOnce(&SqlValue) -> Option<T>,
    ) -> Result<T, DecodeError> {
        let value = self.0.get(index).unwrap_or(&SqlValue::Null);
        view(value).ok_or(DecodeError {
            index,
            expected,
            found: value.type_name(),
        })
    }

    pub fn int(&self, index: usize) -> Result<i64, DecodeError> {
        self.decode(index, "int", SqlValue::as_i64)
    }

    pub fn text(&self, index: usize) -> Result<String, DecodeError> {
        self.decode(index, "text", |v| v.as_str().map(str::to_string))
    }

    /// Nullable text column.
    pub fn opt_text(&self, index: usize) -> Result<Option<String>, DecodeError> {
        match self.0.get(index) {
            None | Some(SqlValue::Null) => Ok(None),
            Some(_) => self.text(index).map(Some),
        }
    }

    /// Nullable numeric column.
    pub fn opt_f64(&self, index: usize) -> Result<Option<f64>, DecodeError> {
        match self.0.get(index) {
            None | Some(SqlValue::Null) => Ok(None),
            Some(_) => self.decode(index, "number", SqlValue::as_f64).map(Some),
        }
    }
}

impl From<Vec<SqlValue>> for ResultRow {
    fn from(values: Vec<SqlValue>) -> Self {
        Self(values)
    }
}

//! Engine-neutral values, rows and named parameters.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};

use super::{WarehouseError, WarehouseResult};

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer view of the value. Integral reals and numeric text convert.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Real(f) if f.fract() == 0.0 => Some(*f as i64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(f) => Some(*f),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Null => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(v: ValueRef<'_>) -> Self {
        match v {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) | ValueRef::Blob(t) => {
                Value::Text(String::from_utf8_lossy(t).into_owned())
            }
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(i) => ToSqlOutput::from(*i),
            Value::Real(f) => ToSqlOutput::from(*f),
            Value::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

/// One result row with named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
        let (columns, values): (Vec<String>, Vec<Value>) = pairs
            .into_iter()
            .map(|(c, v)| (c.to_string(), v))
            .unzip();
        Self {
            columns: columns.into(),
            values,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn get(&self, column: &str) -> WarehouseResult<&Value> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
            .map(|i| &self.values[i])
            .ok_or_else(|| WarehouseError::MissingColumn(column.to_string()))
    }

    /// Required text column.
    pub fn text(&self, column: &str) -> WarehouseResult<String> {
        self.opt_text(column)?
            .ok_or_else(|| WarehouseError::UnexpectedNull(column.to_string()))
    }

    /// Nullable text column. Numbers are rendered as text.
    pub fn opt_text(&self, column: &str) -> WarehouseResult<Option<String>> {
        Ok(match self.get(column)? {
            Value::Null => None,
            Value::Text(s) => Some(s.clone()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Real(f) => Some(f.to_string()),
        })
    }

    /// Required integer column.
    pub fn integer(&self, column: &str) -> WarehouseResult<i64> {
        self.opt_integer(column)?
            .ok_or_else(|| WarehouseError::UnexpectedNull(column.to_string()))
    }

    pub fn opt_integer(&self, column: &str) -> WarehouseResult<Option<i64>> {
        let value = self.get(column)?;
        if value.is_null() {
            return Ok(None);
        }
        value.as_i64().map(Some).ok_or(WarehouseError::TypeMismatch {
            column: column.to_string(),
            expected: "integer",
        })
    }

    /// Nullable numeric column.
    pub fn opt_real(&self, column: &str) -> WarehouseResult<Option<f64>> {
        let value = self.get(column)?;
        if value.is_null() {
            return Ok(None);
        }
        value.as_f64().map(Some).ok_or(WarehouseError::TypeMismatch {
            column: column.to_string(),
            expected: "number",
        })
    }
}

/// Named statement parameters, keyed without the leading `:`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    values: BTreeMap<String, Value>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any earlier value.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.values
            .insert(name.trim_start_matches(':').to_string(), value.into());
        self
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name.trim_start_matches(':'))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keep only the named parameters.
    pub fn restricted_to(&self, names: &[&str]) -> QueryParams {
        QueryParams {
            values: self
                .values
                .iter()
                .filter(|(k, _)| names.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

//! In-memory representation of a parsed CSV: named, typed columns and rows of values.
use serde::{Serialize, Serializer};

/// The scalar type inferred for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    String,
}

impl ColumnType {
    /// The type a single non-empty field would have on its own
    fn of(field: &str) -> Self {
        if field.parse::<i64>().is_ok() {
            Self::Integer
        } else if parse_float(field).is_some() {
            Self::Float
        } else if parse_bool(field).is_some() {
            Self::Boolean
        } else {
            Self::String
        }
    }

    /// The narrowest type that holds values of both `self` and `other`
    fn unify(self, other: Self) -> Self {
        use ColumnType::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Integer, Float) | (Float, Integer) => Float,
            _ => String,
        }
    }
}

/// A column of a [`Table`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: ColumnType,
}

/// A single cell. `Null` marks a missing value (an empty field in the source).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Converts a raw field into a value of a column of type `type_`.
    /// `field` must be consistent with `type_` (i.e. `type_` was inferred over it)
    fn parse(field: &str, type_: ColumnType) -> Self {
        if field.is_empty() {
            return Self::Null;
        }
        match type_ {
            ColumnType::Integer => field
                .parse()
                .map(Self::Integer)
                .unwrap_or_else(|_| Self::String(field.to_string())),
            ColumnType::Float => parse_float(field)
                .map(Self::Float)
                .unwrap_or_else(|| Self::String(field.to_string())),
            ColumnType::Boolean => parse_bool(field)
                .map(Self::Boolean)
                .unwrap_or_else(|| Self::String(field.to_string())),
            ColumnType::String => Self::String(field.to_string()),
        }
    }

    /// The field as written back to delimited text.
    /// Floats always keep a fractional part or an exponent so they are read back as floats
    pub fn to_field(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Integer(v) => v.to_string(),
            Self::Float(v) => format!("{v:?}"),
            Self::Boolean(v) => v.to_string(),
            Self::String(v) => v.clone(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("NaN"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Integer(v) => serializer.serialize_i64(*v),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::Boolean(v) => serializer.serialize_bool(*v),
            Self::String(v) => serializer.serialize_str(v),
        }
    }
}

/// Only finite numbers count as floats: "NaN" or "inf" stay strings
fn parse_float(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_bool(field: &str) -> Option<bool> {
    if field.eq_ignore_ascii_case("true") {
        Some(true)
    } else if field.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Columns in header order and rows in source order.
/// Every row has exactly one [`Value`] per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Builds a [`Table`] from a header and raw rows, inferring the type of every column.
    /// Every record must have exactly `names.len()` fields.
    pub(crate) fn infer(names: Vec<String>, records: Vec<Vec<String>>) -> Self {
        let types = names
            .iter()
            .enumerate()
            .map(|(i, _)| {
                records
                    .iter()
                    .map(|record| record[i].as_str())
                    .filter(|field| !field.is_empty())
                    .map(ColumnType::of)
                    .reduce(ColumnType::unify)
                    .unwrap_or(ColumnType::String)
            })
            .collect::<Vec<_>>();

        let rows = records
            .into_iter()
            .map(|record| {
                record
                    .iter()
                    .zip(types.iter())
                    .map(|(field, type_)| Value::parse(field, *type_))
                    .collect()
            })
            .collect();

        let columns = names
            .into_iter()
            .zip(types)
            .map(|(name, type_)| Column { name, type_ })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// The first `n` rows, like a dataframe's `head`
    pub fn head(&self, n: usize) -> &[Vec<Value>] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Returns the values of the column named `name`, if it exists
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value>> {
        let index = self.columns.iter().position(|c| c.name == name)?;
        Some(self.rows.iter().map(move |row| &row[index]))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows (it may still have columns)
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

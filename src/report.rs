//! Human-readable previews of a [`Table`].
use itertools::Itertools;

use crate::{Table, Value};

/// Renders the first `rows` rows of `table` as a right-aligned grid with a leading row index,
/// like a dataframe's `head()`:
/// ```text
///     name  age
/// 0  Alice   24
/// 1    Bob   30
/// ```
pub fn preview(table: &Table, rows: usize) -> String {
    let header = std::iter::once(String::new())
        .chain(table.column_names().map(|x| x.to_string()))
        .collect::<Vec<_>>();
    let body = table
        .head(rows)
        .iter()
        .enumerate()
        .map(|(index, row)| {
            std::iter::once(index.to_string())
                .chain(row.iter().map(|v| v.to_string()))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let widths = (0..header.len())
        .map(|i| {
            std::iter::once(&header)
                .chain(body.iter())
                .map(|line| line[i].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect::<Vec<_>>();

    std::iter::once(&header)
        .chain(body.iter())
        .map(|line| {
            line.iter()
                .zip(widths.iter())
                .map(|(cell, &width)| format!("{cell:>width$}"))
                .join("  ")
                .trim_end()
                .to_string()
        })
        .join("\n")
}

/// The first `rows` rows of `table` as a JSON array of objects keyed by column name
pub fn json_rows(table: &Table, rows: usize) -> serde_json::Value {
    serde_json::Value::Array(
        table
            .head(rows)
            .iter()
            .map(|row| {
                serde_json::Value::Object(
                    table
                        .column_names()
                        .zip(row.iter())
                        .map(|(name, value)| (name.to_string(), to_json(value)))
                        .collect(),
                )
            })
            .collect(),
    )
}

fn to_json(value: &Value) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or_default()
}

/// The columns of `table` with their types, as JSON
pub fn json_columns(table: &Table) -> serde_json::Value {
    serde_json::to_value(table.columns()).unwrap_or_default()
}

/// One line describing the shape of `table`, e.g. `2 rows x 2 columns (name: string, age: integer)`
pub fn summary(table: &Table) -> String {
    let columns = table
        .columns()
        .iter()
        .map(|c| format!("{}: {}", c.name, type_name(c.type_)))
        .join(", ");
    format!(
        "{} rows x {} columns ({columns})",
        table.len(),
        table.columns().len()
    )
}

fn type_name(type_: crate::ColumnType) -> &'static str {
    match type_ {
        crate::ColumnType::Integer => "integer",
        crate::ColumnType::Float => "float",
        crate::ColumnType::Boolean => "boolean",
        crate::ColumnType::String => "string",
    }
}

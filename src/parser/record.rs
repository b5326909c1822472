use anyhow::{Context, Result};
use serde_json::Value;

use crate::schema::{Column, ColumnType, TableSchema};

/// A parsed staging row, values aligned with the table's insert columns
pub struct ParsedRow {
    pub values: Vec<SqlValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> rusqlite::Result<()> {
        match self {
            SqlValue::Null => stmt.raw_bind_parameter(idx, rusqlite::types::Null)?,
            SqlValue::Integer(i) => stmt.raw_bind_parameter(idx, i)?,
            SqlValue::Real(f) => stmt.raw_bind_parameter(idx, f)?,
            SqlValue::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
        }
        Ok(())
    }
}

/// How staging columns find their JSON fields
#[derive(Debug, Clone)]
pub enum FieldMapping {
    /// Column name (or its declared override) matches the JSON field
    Auto,
    /// Positional field list from a JSONPaths descriptor, one entry per
    /// insert column
    Paths(Vec<String>),
}

impl FieldMapping {
    fn key_for<'a>(&'a self, idx: usize, col: &'a Column) -> &'a str {
        match self {
            FieldMapping::Auto => col.json_key(),
            FieldMapping::Paths(fields) => &fields[idx],
        }
    }
}

/// Parse a JSON line into a row for the given staging table
pub fn parse_record(line: &str, table: &TableSchema, mapping: &FieldMapping) -> Result<ParsedRow> {
    let json: Value = serde_json::from_str(line).context("Failed to parse JSON")?;

    let values = table
        .insert_columns()
        .iter()
        .enumerate()
        .map(|(idx, col)| extract_value(&json, mapping.key_for(idx, col), col.col_type))
        .collect();

    Ok(ParsedRow { values })
}

fn extract_value(json: &Value, key: &str, col_type: ColumnType) -> SqlValue {
    let val = match json.get(key) {
        None | Some(Value::Null) => return SqlValue::Null,
        Some(v) => v,
    };

    match col_type {
        ColumnType::SmallInt | ColumnType::Int | ColumnType::BigInt => as_integer(val),
        ColumnType::Float | ColumnType::Decimal(_) => as_real(val),
        ColumnType::Char | ColumnType::Varchar | ColumnType::Timestamp => as_text(val),
    }
}

/// The event log encodes logged-out user ids as `""`; empty or
/// non-numeric strings load as NULL rather than aborting the file.
fn as_integer(val: &Value) -> SqlValue {
    if let Some(i) = val.as_i64() {
        return SqlValue::Integer(i);
    }
    if let Some(f) = val.as_f64() {
        return SqlValue::Integer(f as i64);
    }
    val.as_str()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .map(SqlValue::Integer)
        .unwrap_or(SqlValue::Null)
}

fn as_real(val: &Value) -> SqlValue {
    if let Some(f) = val.as_f64() {
        return SqlValue::Real(f);
    }
    val.as_str()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .map(SqlValue::Real)
        .unwrap_or(SqlValue::Null)
}

fn as_text(val: &Value) -> SqlValue {
    match val {
        Value::String(s) => SqlValue::Text(s.clone()),
        // itemInSession and friends arrive numeric but stage as VARCHAR
        other => SqlValue::Text(other.to_string()),
    }
}

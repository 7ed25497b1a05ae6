//! Result reconstruction.
//!
//! Data API style drivers return rows as bare value tuples. The functions
//! here zip those tuples with the output names a SELECT was compiled with
//! ([`CompiledQuery::fields`](super::compiler::CompiledQuery::fields)) so
//! callers get named [`Row`]s back.

use polysql_core::{SqlError, SqlResult};
use serde::Deserialize;

use super::params::TypedValue;
use crate::value::Value;

/// A database row: column names and their values.
///
/// `Row` provides typed access via the [`get`](Row::get) method.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Creates a new row from column names and values.
    ///
    /// # Panics
    ///
    /// Panics if the number of columns does not match the number of values.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        assert_eq!(
            columns.len(),
            values.len(),
            "Row column count must match value count"
        );
        Self { columns, values }
    }

    /// Creates a row, failing if the column and value counts differ.
    pub fn try_new(columns: Vec<String>, values: Vec<Value>) -> SqlResult<Self> {
        if columns.len() != values.len() {
            return Err(SqlError::DatabaseError(format!(
                "row has {} values but {} columns were selected",
                values.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, values })
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the values in column order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Gets a typed value by column name.
    ///
    /// # Errors
    ///
    /// Returns an error if the column does not exist or the value cannot be
    /// converted to the requested type.
    pub fn get<T: FromValue>(&self, column: &str) -> SqlResult<T> {
        let idx = self
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| SqlError::DatabaseError(format!("Column '{column}' not found in row")))?;
        T::from_value(&self.values[idx])
    }

    /// Gets a typed value by column index.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of bounds or the value cannot be
    /// converted to the requested type.
    pub fn get_by_index<T: FromValue>(&self, idx: usize) -> SqlResult<T> {
        let value = self.values.get(idx).ok_or_else(|| {
            SqlError::DatabaseError(format!(
                "Column index {idx} out of bounds (row has {} columns)",
                self.values.len()
            ))
        })?;
        T::from_value(value)
    }

    /// Returns a reference to the raw Value at the given column name.
    pub fn get_value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
    }

    /// Converts the row into a JSON object in column order.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .columns
            .iter()
            .zip(&self.values)
            .map(|(c, v)| (c.clone(), serde_json::to_value(v).unwrap_or(serde_json::Value::Null)))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }

    /// Splits joined columns back into one row per table.
    ///
    /// Columns named `table__field` go to `table` under `field`; all other
    /// columns belong to `primary`. The primary table comes first, the rest
    /// follow in order of first appearance.
    pub fn split_tables(&self, primary: &str) -> Vec<(String, Self)> {
        let mut groups: Vec<(String, Self)> = vec![(primary.to_string(), Self::new(Vec::new(), Vec::new()))];
        for (column, value) in self.columns.iter().zip(&self.values) {
            let (table, field) = column
                .split_once("__")
                .filter(|(t, f)| !t.is_empty() && !f.is_empty())
                .unwrap_or((primary, column.as_str()));
            let idx = match groups.iter().position(|(t, _)| t == table) {
                Some(idx) => idx,
                None => {
                    groups.push((table.to_string(), Self::new(Vec::new(), Vec::new())));
                    groups.len() - 1
                }
            };
            let row = &mut groups[idx].1;
            row.columns.push(field.to_string());
            row.values.push(value.clone());
        }
        groups
    }
}

/// Trait for converting a [`Value`] to a concrete Rust type.
pub trait FromValue: Sized {
    /// Attempts to convert a value reference to this type.
    fn from_value(value: &Value) -> SqlResult<Self>;
}

fn expected(what: &str, value: &Value) -> SqlError {
    SqlError::DatabaseError(format!("Expected {what}, got {value:?}"))
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> SqlResult<Self> {
        match value {
            Value::Int(i) => Ok(*i),
            _ => Err(expected("Int", value)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> SqlResult<Self> {
        match value {
            Value::Int(i) => i32::try_from(*i).map_err(|e| {
                SqlError::DatabaseError(format!("Int value out of i32 range: {e}"))
            }),
            _ => Err(expected("Int", value)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> SqlResult<Self> {
        match value {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            // DECIMAL travels as text.
            Value::String(s) => s.parse().map_err(|_| expected("Float", value)),
            _ => Err(expected("Float", value)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> SqlResult<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Int(0) => Ok(false),
            Value::Int(1) => Ok(true),
            _ => Err(expected("Bool", value)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> SqlResult<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            _ => Err(expected("String", value)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> SqlResult<Self> {
        match value {
            Value::Bytes(b) => Ok(b.clone()),
            _ => Err(expected("Bytes", value)),
        }
    }
}

impl FromValue for uuid::Uuid {
    fn from_value(value: &Value) -> SqlResult<Self> {
        match value {
            Value::Uuid(u) => Ok(*u),
            Value::String(s) => s.parse().map_err(|_| expected("Uuid", value)),
            _ => Err(expected("Uuid", value)),
        }
    }
}

impl FromValue for chrono::NaiveDate {
    fn from_value(value: &Value) -> SqlResult<Self> {
        match value {
            Value::Date(d) => Ok(*d),
            Value::String(s) => s.parse().map_err(|_| expected("Date", value)),
            _ => Err(expected("Date", value)),
        }
    }
}

impl FromValue for chrono::NaiveDateTime {
    fn from_value(value: &Value) -> SqlResult<Self> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            Value::String(s) => {
                chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
                    .or_else(|_| s.parse())
                    .map_err(|_| expected("DateTime", value))
            }
            _ => Err(expected("DateTime", value)),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> SqlResult<Self> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> SqlResult<Self> {
        match value {
            Value::Null => Ok(None),
            _ => T::from_value(value).map(Some),
        }
    }
}

/// Rows reconstructed from a driver response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// One row per record, named by the compiled field list.
    pub records: Vec<Row>,
    /// The driver's count of affected rows, passed through unchanged.
    pub number_of_records_updated: Option<u64>,
}

impl QueryResult {
    /// Converts the records into JSON objects.
    pub fn to_json(&self) -> Vec<serde_json::Value> {
        self.records.iter().map(Row::to_json).collect()
    }
}

/// Zips each value tuple with the compiled field list.
///
/// Fails with [`SqlError::DatabaseError`] when a tuple's length differs from
/// the number of fields.
pub fn reconstruct(
    fields: &[String],
    rows: Vec<Vec<Value>>,
    number_of_records_updated: Option<u64>,
) -> SqlResult<QueryResult> {
    let records = rows
        .into_iter()
        .map(|values| Row::try_new(fields.to_vec(), values))
        .collect::<SqlResult<Vec<_>>>()?;
    Ok(QueryResult {
        records,
        number_of_records_updated,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataApiResponse {
    #[serde(default)]
    records: Vec<Vec<TypedValue>>,
    #[serde(default)]
    number_of_records_updated: Option<u64>,
}

/// Decodes a Data API `executeStatement` response and zips its records with
/// the compiled field list.
///
/// Each cell is a tagged value such as `{"longValue": 1}` or
/// `{"isNull": true}`.
pub fn reconstruct_data_api(fields: &[String], response: &serde_json::Value) -> SqlResult<QueryResult> {
    let response = DataApiResponse::deserialize(response)?;
    let rows = response
        .records
        .into_iter()
        .map(|cells| cells.into_iter().map(TypedValue::into_value).collect())
        .collect();
    reconstruct(fields, rows, response.number_of_records_updated)
}

//! Row extraction helpers.
//!
//! Metadata queries decode rows into `Record`s keyed by column name and
//! then pull typed values out with the `extract_*` functions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::{DatabaseValue, DbError, FieldValue, QueryResult};

static NULL: FieldValue = FieldValue::Null;

/// One decoded row, keyed by the column names the result set reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, FieldValue>);

impl Record {
    /// Value of `column`, or `Null` when the column is absent.
    pub fn get(&self, column: &str) -> &FieldValue {
        self.0.get(column).unwrap_or(&NULL)
    }

    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .0
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        Value::Object(map)
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Position of `name` among the result headers.
pub fn column_index(result: &QueryResult, name: &str) -> Result<usize, DbError> {
    result
        .headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| DbError::MissingColumn {
            name: name.to_string(),
        })
}

/// Zip every row with the result headers.
pub fn rows_as_records(result: QueryResult) -> Vec<Record> {
    let QueryResult { headers, rows } = result;
    rows.into_iter()
        .map(|row| headers.iter().cloned().zip(row).collect())
        .collect()
}

/// Extract a String, returning None if the value is not text.
pub fn extract_string(value: &FieldValue) -> Option<String> {
    value.as_string()
}

/// Extract a String, returning the default if the value is not text.
pub fn extract_string_or(value: &FieldValue, default: &str) -> String {
    value.as_string_or(default)
}

pub fn extract_bool(value: &FieldValue, default: bool) -> bool {
    value.as_bool_or(default)
}

/// Extract a JSON document; `Null` becomes `None`.
pub fn extract_json(value: &FieldValue) -> Option<Value> {
    match value {
        FieldValue::Null => None,
        other => Some(other.to_json()),
    }
}

/// Extract a text array (decoded as a JSON array of strings).
///
/// Non-string elements are skipped and `Null` yields an empty list.
pub fn extract_string_vec(value: &FieldValue) -> Vec<String> {
    match value {
        FieldValue::Json(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

pub fn extract_timestamp(value: &FieldValue) -> Option<DateTime<Utc>> {
    match value {
        FieldValue::Timestamp(ts) => Some(*ts),
        FieldValue::Text(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|ts| ts.with_timezone(&Utc)),
        _ => None,
    }
}

//! Abstract field types and default-value literals.
//!
//! | Abstract type            | Column type          |
//! |--------------------------|----------------------|
//! | `string`, `varchar`      | `VARCHAR(n)` (255)   |
//! | `text`                   | `TEXT`               |
//! | `integer`, `int`         | `INTEGER`            |
//! | `bigint`                 | `BIGINT`             |
//! | `float`, `decimal`       | `DECIMAL`            |
//! | `boolean`, `bool`        | `BOOLEAN`            |
//! | `date`                   | `DATE`               |
//! | `time`                   | `TIME`               |
//! | `datetime`, `timestamp`  | `TIMESTAMP`          |
//! | `uuid`                   | `UUID`               |
//! | `json`, `jsonb`          | `JSONB`              |
//! | anything else            | `TEXT`               |

use std::fmt;

use serde_json::Value;

use crate::db::quote_literal;
use crate::error::EngineError;

/// Length used for `VARCHAR` when none (or a non-positive one) is given.
pub const DEFAULT_VARCHAR_LENGTH: u32 = 255;

/// Physical column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Varchar(u32),
    Text,
    Integer,
    BigInt,
    Decimal,
    Boolean,
    Date,
    Time,
    Timestamp,
    Uuid,
    Jsonb,
}

impl ColumnType {
    /// Map an abstract type name to a column type.
    ///
    /// Matching is case-insensitive. Unknown names fall back to `TEXT`.
    pub fn from_abstract(data_type: &str, max_length: Option<i64>) -> Self {
        match data_type.trim().to_ascii_lowercase().as_str() {
            "string" | "varchar" => {
                let len = max_length
                    .filter(|n| *n > 0)
                    .and_then(|n| u32::try_from(n).ok())
                    .unwrap_or(DEFAULT_VARCHAR_LENGTH);
                ColumnType::Varchar(len)
            }
            "text" => ColumnType::Text,
            "integer" | "int" => ColumnType::Integer,
            "bigint" => ColumnType::BigInt,
            "float" | "decimal" => ColumnType::Decimal,
            "boolean" | "bool" => ColumnType::Boolean,
            "date" => ColumnType::Date,
            "time" => ColumnType::Time,
            "datetime" | "timestamp" => ColumnType::Timestamp,
            "uuid" => ColumnType::Uuid,
            "json" | "jsonb" => ColumnType::Jsonb,
            _ => ColumnType::Text,
        }
    }

    pub fn sql(&self) -> String {
        match self {
            ColumnType::Varchar(n) => format!("VARCHAR({})", n),
            other => other.keyword().to_string(),
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            ColumnType::Varchar(_) => "VARCHAR",
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Decimal => "DECIMAL",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Date => "DATE",
            ColumnType::Time => "TIME",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Uuid => "UUID",
            ColumnType::Jsonb => "JSONB",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql())
    }
}

/// Render a JSON default value as a SQL literal for `DEFAULT`.
///
/// Strings are single-quoted with embedded quotes doubled; numbers are
/// truncated toward zero to an integer literal. Objects and arrays have no
/// literal form and are rejected.
pub fn format_default_value(value: &Value) -> Result<String, EngineError> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::String(s) => Ok(quote_literal(s)),
        Value::Number(n) => {
            let literal = match n.as_i64() {
                Some(i) => i.to_string(),
                None => match n.as_u64() {
                    Some(u) => u.to_string(),
                    None => format!("{}", n.as_f64().unwrap_or_default().trunc() as i64),
                },
            };
            Ok(literal)
        }
        Value::Object(_) | Value::Array(_) => Err(EngineError::validation(
            "Default value must be a string, number, boolean or null",
        )),
    }
}

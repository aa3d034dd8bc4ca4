//! Type conversion between `FieldValue` and PostgreSQL wire types.
//!
//! Encoding follows the parameter type the server inferred for each
//! placeholder, so a JSON number bound to an `INTEGER` column is sent as
//! `int4` and the same number bound to `DECIMAL` is sent as `numeric`.
//! Decoding goes by the column type reported in the result set.

use std::error::Error;
use std::fmt;

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use postgres::Row;
use postgres_types::{to_sql_checked, IsNull, ToSql, Type};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Number, Value};
use tracing::warn;
use uuid::Uuid;

use crate::db::{format_timestamp, DatabaseValue, FieldValue};

type BoxError = Box<dyn Error + Sync + Send>;

/// A value could not be converted to the parameter type the server expects.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeError {
    pub message: String,
}

impl EncodeError {
    fn mismatch(value: &FieldValue, ty: &Type) -> BoxError {
        Box::new(EncodeError {
            message: format!("cannot encode {} value as {}", value.type_name(), ty.name()),
        })
    }

    fn invalid(ty: &Type, detail: impl fmt::Display) -> BoxError {
        Box::new(EncodeError {
            message: format!("invalid {} value: {}", ty.name(), detail),
        })
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for EncodeError {}

fn is_text_type(ty: &Type) -> bool {
    matches!(ty.name(), "text" | "varchar" | "bpchar" | "name" | "citext" | "unknown")
}

fn is_json_type(ty: &Type) -> bool {
    matches!(ty.name(), "json" | "jsonb")
}

fn is_text_array(ty: &Type) -> bool {
    matches!(ty.name(), "_text" | "_varchar")
}

/// Encode through a driver impl, tagging failures as encode errors.
fn encode<T: ToSql>(value: T, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    value
        .to_sql(ty, out)
        .map_err(|e| EncodeError::invalid(ty, e))
}

fn int_from_number(n: &Number, ty: &Type) -> Result<i64, BoxError> {
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => Ok(f as i64),
        _ => Err(EncodeError::invalid(ty, n)),
    }
}

fn encode_int(i: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match ty.name() {
        "int2" => encode(i16::try_from(i).map_err(|e| EncodeError::invalid(ty, e))?, ty, out),
        "int4" => encode(i32::try_from(i).map_err(|e| EncodeError::invalid(ty, e))?, ty, out),
        _ => encode(i, ty, out),
    }
}

fn parse_decimal(text: &str, ty: &Type) -> Result<Decimal, BoxError> {
    text.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|e| EncodeError::invalid(ty, e))
}

fn parse_bool(text: &str, ty: &Type) -> Result<bool, BoxError> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Ok(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Ok(false),
        other => Err(EncodeError::invalid(ty, other)),
    }
}

fn parse_naive_datetime(text: &str) -> Option<NaiveDateTime> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_naive_datetime(text).map(|ts| ts.date()))
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    ["%H:%M:%S%.f", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
}

fn encode_text(s: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    if is_text_type(ty) {
        return encode(s, ty, out);
    }
    match ty.name() {
        "int2" | "int4" | "int8" => {
            let i = s.trim().parse::<i64>().map_err(|e| EncodeError::invalid(ty, e))?;
            encode_int(i, ty, out)
        }
        "float4" => encode(
            s.trim().parse::<f32>().map_err(|e| EncodeError::invalid(ty, e))?,
            ty,
            out,
        ),
        "float8" => encode(
            s.trim().parse::<f64>().map_err(|e| EncodeError::invalid(ty, e))?,
            ty,
            out,
        ),
        "numeric" => encode(parse_decimal(s.trim(), ty)?, ty, out),
        "bool" => encode(parse_bool(s, ty)?, ty, out),
        "uuid" => encode(
            Uuid::parse_str(s).map_err(|e| EncodeError::invalid(ty, e))?,
            ty,
            out,
        ),
        "timestamp" => {
            let ts = parse_naive_datetime(s).ok_or_else(|| EncodeError::invalid(ty, s))?;
            encode(ts, ty, out)
        }
        "timestamptz" => {
            let ts = parse_naive_datetime(s).ok_or_else(|| EncodeError::invalid(ty, s))?;
            encode(ts.and_utc(), ty, out)
        }
        "date" => encode(parse_date(s).ok_or_else(|| EncodeError::invalid(ty, s))?, ty, out),
        "time" => encode(parse_time(s).ok_or_else(|| EncodeError::invalid(ty, s))?, ty, out),
        _ if is_json_type(ty) => encode(Value::String(s.to_string()), ty, out),
        _ => Err(EncodeError::invalid(ty, "unsupported parameter type")),
    }
}

fn encode_number(n: &Number, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match ty.name() {
        "int2" | "int4" | "int8" => encode_int(int_from_number(n, ty)?, ty, out),
        "float4" => encode(n.as_f64().unwrap_or_default() as f32, ty, out),
        "float8" => encode(n.as_f64().unwrap_or_default(), ty, out),
        "numeric" => encode(parse_decimal(&n.to_string(), ty)?, ty, out),
        _ if is_text_type(ty) => encode(n.to_string(), ty, out),
        _ if is_json_type(ty) => encode(Value::Number(n.clone()), ty, out),
        _ => Err(EncodeError::invalid(ty, n)),
    }
}

impl ToSql for FieldValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            FieldValue::Null => Ok(IsNull::Yes),
            FieldValue::Bool(b) => match ty.name() {
                "bool" => encode(*b, ty, out),
                _ if is_text_type(ty) => encode(b.to_string(), ty, out),
                _ if is_json_type(ty) => encode(Value::Bool(*b), ty, out),
                _ => Err(EncodeError::mismatch(self, ty)),
            },
            FieldValue::Number(n) => encode_number(n, ty, out),
            FieldValue::Text(s) => encode_text(s, ty, out),
            FieldValue::Timestamp(ts) => match ty.name() {
                "timestamptz" => encode(*ts, ty, out),
                "timestamp" => encode(ts.naive_utc(), ty, out),
                "date" => encode(ts.date_naive(), ty, out),
                _ if is_text_type(ty) => encode(format_timestamp(ts), ty, out),
                _ => Err(EncodeError::mismatch(self, ty)),
            },
            FieldValue::Json(v) => {
                if is_json_type(ty) {
                    encode(v, ty, out)
                } else if is_text_type(ty) {
                    encode(v.to_string(), ty, out)
                } else if is_text_array(ty) {
                    let items = v
                        .as_array()
                        .and_then(|items| {
                            items
                                .iter()
                                .map(|item| item.as_str().map(str::to_string))
                                .collect::<Option<Vec<String>>>()
                        })
                        .ok_or_else(|| EncodeError::mismatch(self, ty))?;
                    encode(items, ty, out)
                } else {
                    Err(EncodeError::mismatch(self, ty))
                }
            }
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // Compatibility is decided per value in `to_sql`.
        true
    }

    to_sql_checked!();
}

fn number_from_decimal(d: Decimal) -> Option<Number> {
    if d.fract().is_zero() {
        if let Some(i) = d.to_i64() {
            return Some(Number::from(i));
        }
    }
    d.to_f64().and_then(Number::from_f64)
}

fn from_opt<T>(value: Option<T>, f: impl FnOnce(T) -> FieldValue) -> FieldValue {
    value.map_or(FieldValue::Null, f)
}

/// Decode the cell at `idx` using the column's reported type.
pub fn decode_cell(row: &Row, idx: usize) -> Result<FieldValue, postgres::Error> {
    let ty = row.columns()[idx].type_().clone();
    let value = match ty.name() {
        "bool" => from_opt(row.try_get::<_, Option<bool>>(idx)?, FieldValue::Bool),
        "int2" => from_opt(row.try_get::<_, Option<i16>>(idx)?, |v| i64::from(v).into()),
        "int4" => from_opt(row.try_get::<_, Option<i32>>(idx)?, |v| i64::from(v).into()),
        "int8" => from_opt(row.try_get::<_, Option<i64>>(idx)?, FieldValue::from),
        "float4" => from_opt(row.try_get::<_, Option<f32>>(idx)?, |v| {
            Number::from_f64(f64::from(v)).map_or(FieldValue::Null, FieldValue::Number)
        }),
        "float8" => from_opt(row.try_get::<_, Option<f64>>(idx)?, |v| {
            Number::from_f64(v).map_or(FieldValue::Null, FieldValue::Number)
        }),
        "numeric" => from_opt(row.try_get::<_, Option<Decimal>>(idx)?, |d| {
            number_from_decimal(d).map_or(FieldValue::Null, FieldValue::Number)
        }),
        "json" | "jsonb" => from_opt(row.try_get::<_, Option<Value>>(idx)?, FieldValue::from_json),
        "uuid" => from_opt(row.try_get::<_, Option<Uuid>>(idx)?, |u| {
            FieldValue::Text(u.to_string())
        }),
        "timestamp" => from_opt(row.try_get::<_, Option<NaiveDateTime>>(idx)?, |ts| {
            FieldValue::Timestamp(ts.and_utc())
        }),
        "timestamptz" => from_opt(
            row.try_get::<_, Option<DateTime<Utc>>>(idx)?,
            FieldValue::Timestamp,
        ),
        "date" => from_opt(row.try_get::<_, Option<NaiveDate>>(idx)?, |d| {
            FieldValue::Text(d.format("%Y-%m-%d").to_string())
        }),
        "time" => from_opt(row.try_get::<_, Option<NaiveTime>>(idx)?, |t| {
            FieldValue::Text(t.format("%H:%M:%S").to_string())
        }),
        "bytea" => from_opt(row.try_get::<_, Option<Vec<u8>>>(idx)?, |bytes| {
            FieldValue::from_text(String::from_utf8_lossy(&bytes).into_owned())
        }),
        "_text" | "_varchar" => from_opt(
            row.try_get::<_, Option<Vec<Option<String>>>>(idx)?,
            |items| {
                FieldValue::Json(Value::Array(
                    items
                        .into_iter()
                        .map(|item| item.map_or(Value::Null, Value::String))
                        .collect(),
                ))
            },
        ),
        _ => match row.try_get::<_, Option<String>>(idx) {
            Ok(text) => from_opt(text, FieldValue::from_text),
            Err(_) => {
                warn!(
                    column = row.columns()[idx].name(),
                    column_type = ty.name(),
                    "unsupported column type, returning null"
                );
                FieldValue::Null
            }
        },
    };
    Ok(value)
}

/// Decode every cell of a row.
pub fn decode_row(row: &Row) -> Result<Vec<FieldValue>, postgres::Error> {
    (0..row.len()).map(|idx| decode_cell(row, idx)).collect()
}

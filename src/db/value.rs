//! The closed value model shared by bound parameters and decoded cells.
//!
//! Collection rows have no static shape, so every value crossing the
//! datastore boundary is one of a fixed set of variants. Matching on
//! `FieldValue` is exhaustive at both the encode and decode side.

use std::fmt::Debug;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

/// A single column value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    Timestamp(DateTime<Utc>),
    /// Nested object or array (also used for json/jsonb columns).
    Json(Value),
}

impl FieldValue {
    /// Convert a request payload value.
    ///
    /// Objects and arrays become `Json`; scalars map onto their own variant.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => FieldValue::Number(n),
            Value::String(s) => FieldValue::Text(s),
            nested @ (Value::Object(_) | Value::Array(_)) => FieldValue::Json(nested),
        }
    }

    /// Wrap an optional document for a json/jsonb metadata column.
    pub fn json(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => FieldValue::Null,
            Some(v) => FieldValue::Json(v),
        }
    }

    /// Render as a response value. Timestamps become RFC 3339 strings.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Number(n) => Value::Number(n.clone()),
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Timestamp(ts) => Value::String(format_timestamp(ts)),
            FieldValue::Json(v) => v.clone(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Decode a text payload: JSON objects and arrays are parsed, anything
    /// else stays a plain string.
    pub fn from_text(text: String) -> Self {
        let trimmed = text.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(nested @ (Value::Object(_) | Value::Array(_))) =
                serde_json::from_str::<Value>(&text)
            {
                return FieldValue::Json(nested);
            }
        }
        FieldValue::Text(text)
    }
}

/// RFC 3339 with second precision and a `Z` suffix.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Null => serializer.serialize_none(),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Number(n) => n.serialize(serializer),
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Timestamp(ts) => serializer.serialize_str(&format_timestamp(ts)),
            FieldValue::Json(v) => v.serialize(serializer),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(Number::from(n))
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::Text(s.clone())
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(ts: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(ts)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// Trait for extracting Rust types out of decoded database values.
pub trait DatabaseValue: Clone + Debug {
    /// Extract as String if the value is a string.
    fn as_string(&self) -> Option<String>;

    /// Extract as i64; floats are truncated.
    fn as_i64(&self) -> Option<i64>;

    /// Extract as f64 if the value is numeric.
    fn as_f64(&self) -> Option<f64>;

    /// Extract as bool if the value is boolean.
    fn as_bool(&self) -> Option<bool>;

    /// Type name for error messages.
    fn type_name(&self) -> &'static str;

    fn as_string_or(&self, default: &str) -> String {
        self.as_string().unwrap_or_else(|| default.to_string())
    }

    fn as_bool_or(&self, default: bool) -> bool {
        self.as_bool().unwrap_or(default)
    }
}

impl DatabaseValue for FieldValue {
    fn as_string(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Number(_) => "number",
            FieldValue::Text(_) => "string",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Json(_) => "json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn test_from_json_scalars() {
        assert_eq!(FieldValue::from_json(json!(null)), FieldValue::Null);
        assert_eq!(FieldValue::from_json(json!(true)), FieldValue::Bool(true));
        assert_eq!(FieldValue::from_json(json!(42)), FieldValue::from(42i64));
        assert_eq!(FieldValue::from_json(json!("hi")), FieldValue::from("hi"));
    }

    #[rstest]
    fn test_from_json_nested() {
        let nested = json!({"tags": ["a", "b"], "count": 2});
        assert_eq!(FieldValue::from_json(nested.clone()), FieldValue::Json(nested));
        let list = json!([1, 2, 3]);
        assert_eq!(FieldValue::from_json(list.clone()), FieldValue::Json(list));
    }

    #[rstest]
    fn test_from_text_parses_objects_and_arrays() {
        assert_eq!(
            FieldValue::from_text(r#"{"a":1}"#.to_string()),
            FieldValue::Json(json!({"a": 1}))
        );
        assert_eq!(
            FieldValue::from_text("[1,2]".to_string()),
            FieldValue::Json(json!([1, 2]))
        );
    }

    #[rstest]
    #[case("hello")]
    #[case("123")]
    #[case("true")]
    #[case("{not json")]
    #[case("\"quoted\"")]
    fn test_from_text_keeps_plain_strings(#[case] text: &str) {
        assert_eq!(
            FieldValue::from_text(text.to_string()),
            FieldValue::Text(text.to_string())
        );
    }

    #[rstest]
    fn test_timestamp_serializes_rfc3339() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        let value = serde_json::to_value(FieldValue::Timestamp(ts)).unwrap();
        assert_eq!(value, json!("2024-03-01T12:30:05Z"));
    }

    #[rstest]
    fn test_serialize_matches_to_json() {
        let values = vec![
            FieldValue::Null,
            FieldValue::Bool(false),
            FieldValue::from(7i64),
            FieldValue::from("x"),
            FieldValue::Json(json!({"k": [1, null]})),
        ];
        for value in values {
            assert_eq!(serde_json::to_value(&value).unwrap(), value.to_json());
        }
    }

    #[rstest]
    fn test_json_helper_treats_null_as_absent() {
        assert_eq!(FieldValue::json(None), FieldValue::Null);
        assert_eq!(FieldValue::json(Some(Value::Null)), FieldValue::Null);
        assert_eq!(
            FieldValue::json(Some(json!({"en": "Posts"}))),
            FieldValue::Json(json!({"en": "Posts"}))
        );
    }

    #[rstest]
    fn test_from_option() {
        assert_eq!(FieldValue::from(None::<String>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some("a")), FieldValue::from("a"));
    }

    #[rstest]
    fn test_database_value_extraction() {
        assert_eq!(FieldValue::from("hello").as_string(), Some("hello".to_string()));
        assert_eq!(FieldValue::Null.as_string(), None);
        assert_eq!(FieldValue::from(42i64).as_i64(), Some(42));
        assert_eq!(FieldValue::from_json(json!(42.7)).as_i64(), Some(42));
        assert_eq!(FieldValue::from_json(json!(1.5)).as_f64(), Some(1.5));
        assert_eq!(FieldValue::Bool(true).as_bool(), Some(true));
        assert_eq!(FieldValue::from("true").as_bool(), None);
    }

    #[rstest]
    fn test_database_value_defaults() {
        assert_eq!(FieldValue::from(1i64).as_string_or("default"), "default");
        assert!(!FieldValue::Null.as_bool_or(false));
    }

    #[rstest]
    #[case(FieldValue::Null, "null")]
    #[case(FieldValue::Bool(true), "bool")]
    #[case(FieldValue::from(1i64), "number")]
    #[case(FieldValue::from("s"), "string")]
    #[case(FieldValue::Json(json!([])), "json")]
    fn test_type_name(#[case] value: FieldValue, #[case] expected: &str) {
        assert_eq!(value.type_name(), expected);
    }
}

//! Domain record plumbing shared by `Event` and `Feature`

use std::fmt;

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde_json::{Map, Value as JsonValue};

use crate::schema::TableSchema;
use crate::utils::time::{parse_datetime, parse_timezone};

use super::decoder::SessionSequence;
use super::diagnostics::Diagnostics;
use super::resolve::resolve_with;
use super::value::{Value, Zone};

/// A typed record decoded from one raw row
pub trait DomainRecord: Sized {
    /// Logical fields, in the order they are written back by the encoder
    const FIELDS: &'static [&'static str];

    /// Build the record from resolved logical fields
    fn read(reader: &FieldReader<'_>) -> Self;

    /// Current value of a logical field, for encoding
    fn field_value(&self, field: &str) -> Value;

    /// Fill values the source omitted. Called once per row, in source order.
    fn apply_fallback_defaults(&mut self, _sequence: &mut SessionSequence) {}
}

/// Per-field values used when a field's locator is `Absent`
#[derive(Debug, Clone, Default)]
pub struct Fallbacks {
    values: FxHashMap<String, Value>,
}

impl Fallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Value {
        self.values.get(field).cloned().unwrap_or_default()
    }
}

/// Reads logical fields from one row, verifying each against the shape the
/// record expects. A mismatch is reported once per field through
/// `Diagnostics` and coerced rather than failing the row.
pub struct FieldReader<'a> {
    row: &'a [Value],
    schema: &'a TableSchema,
    fallbacks: &'a Fallbacks,
    diagnostics: &'a Diagnostics,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(
        row: &'a [Value],
        schema: &'a TableSchema,
        fallbacks: &'a Fallbacks,
        diagnostics: &'a Diagnostics,
    ) -> Self {
        Self {
            row,
            schema,
            fallbacks,
            diagnostics,
        }
    }

    /// Resolve a field; cells that fail conversion keep their text form.
    pub fn resolve(&self, field: &str) -> Value {
        let result = resolve_with(
            self.row,
            self.schema.locator(field),
            self.schema.column_types(),
            self.schema.concatenator(),
            self.fallbacks.get(field),
            |index, raw, err| {
                let column = self.schema.column(index).map_or("?", |c| c.name.as_str());
                self.diagnostics.warn_once(
                    field,
                    format_args!("Column '{}' could not be converted: {}", column, err),
                );
                Ok(Value::Text(raw.to_string()))
            },
        );
        result.unwrap_or_else(|err| {
            self.diagnostics
                .warn_once(field, format_args!("Field could not be resolved: {}", err));
            Value::Null
        })
    }

    /// Report a record-level issue for `field`
    pub fn warn(&self, field: &str, message: impl fmt::Display) {
        self.diagnostics.warn_once(field, message);
    }

    fn mismatch(&self, field: &str, expected: &str, got: &Value) {
        self.diagnostics.warn_once(
            field,
            format_args!("Expected {} but found {} value", expected, got.kind()),
        );
    }

    pub fn text(&self, field: &str) -> Option<String> {
        match self.resolve(field) {
            Value::Null => None,
            Value::Text(s) => Some(s),
            other => {
                self.mismatch(field, "str", &other);
                Some(other.to_string())
            }
        }
    }

    /// Text that the record cannot do without; missing becomes ""
    pub fn required_text(&self, field: &str) -> String {
        self.text(field).unwrap_or_else(|| {
            self.diagnostics.warn_once(field, "Required value is missing");
            String::new()
        })
    }

    pub fn datetime(&self, field: &str) -> Option<DateTime<Utc>> {
        match self.resolve(field) {
            Value::Null => None,
            Value::DateTime(dt) => Some(dt),
            Value::Text(s) => parse_datetime(&s).or_else(|| {
                self.mismatch(field, "datetime", &Value::Text(s));
                None
            }),
            other => {
                self.mismatch(field, "datetime", &other);
                None
            }
        }
    }

    /// An unconvertible value is dropped (warned, `None`), never turned into text.
    pub fn int(&self, field: &str) -> Option<i64> {
        match self.resolve(field) {
            Value::Null => None,
            Value::Int(i) => Some(i),
            Value::Float(f) if f.fract() == 0.0 => Some(f as i64),
            Value::Text(s) if s.trim().parse::<i64>().is_ok() => s.trim().parse().ok(),
            other => {
                self.mismatch(field, "int", &other);
                None
            }
        }
    }

    pub fn zone(&self, field: &str) -> Option<Zone> {
        match self.resolve(field) {
            Value::Null => None,
            Value::TimeZone(z) => Some(z),
            Value::Text(s) => parse_timezone(&s).or_else(|| {
                self.mismatch(field, "timezone", &Value::Text(s));
                None
            }),
            other => {
                self.mismatch(field, "timezone", &other);
                None
            }
        }
    }

    /// JSON object; a non-object is kept under a single `value` key
    pub fn object(&self, field: &str) -> Map<String, JsonValue> {
        match self.resolve(field) {
            Value::Null => Map::new(),
            Value::Json(JsonValue::Object(map)) => map,
            Value::Text(s) => match serde_json::from_str::<JsonValue>(&s) {
                Ok(JsonValue::Object(map)) => map,
                _ => {
                    self.mismatch(field, "json object", &Value::Text(s.clone()));
                    wrap_value(JsonValue::String(s))
                }
            },
            other => {
                self.mismatch(field, "json object", &other);
                wrap_value(JsonValue::String(other.to_string()))
            }
        }
    }

    /// JSON list; objects contribute their values, text may be a JSON array
    /// or a comma separated list
    pub fn list(&self, field: &str) -> Vec<JsonValue> {
        match self.resolve(field) {
            Value::Null => Vec::new(),
            Value::Json(JsonValue::Array(items)) => items,
            Value::Json(JsonValue::Object(map)) => map.into_iter().map(|(_, v)| v).collect(),
            Value::Text(s) => match serde_json::from_str::<JsonValue>(&s) {
                Ok(JsonValue::Array(items)) => items,
                _ => s
                    .split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(|part| JsonValue::String(part.to_string()))
                    .collect(),
            },
            other => vec![other.to_json()],
        }
    }
}

fn wrap_value(value: JsonValue) -> Map<String, JsonValue> {
    let mut map = Map::new();
    map.insert("value".to_string(), value);
    map
}

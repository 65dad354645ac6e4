//! Value conversion against declared column types

use serde_json::{Map, Value as JsonValue};

use crate::constants::NULL_SENTINELS;
use crate::error::ConvertError;
use crate::schema::ColumnType;
use crate::utils::time::{parse_datetime, parse_duration, parse_timezone};

use super::value::Value;

/// Whether a raw cell stands for "no value"
fn is_null_like(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Text(s) => NULL_SENTINELS.contains(&s.as_str()),
        Value::Float(f) => f.is_nan(),
        _ => false,
    }
}

/// Convert a raw cell to the declared type of its column.
///
/// - `Null`, `"None"`, `"null"`, `"nan"` and NaN floats become `Null`.
///   `json` columns are the exception for `Null`, `"None"` and `""`, which
///   become an empty mapping.
/// - Date/time-like types keep native values and parse strings against a
///   fixed, ordered list of layouts.
/// - `json` keeps native JSON and parses non-empty strings.
pub fn convert_to_type(value: &Value, ty: &ColumnType) -> Result<Value, ConvertError> {
    if *ty == ColumnType::Json
        && (value.is_null() || matches!(value, Value::Text(s) if s.is_empty() || s == "None"))
    {
        return Ok(Value::Json(JsonValue::Object(Map::new())));
    }
    if is_null_like(value) {
        return Ok(Value::Null);
    }

    let fail = || ConvertError::incompatible(value.kind(), value, ty);

    match ty {
        ColumnType::Str => Ok(match value {
            Value::Text(_) => value.clone(),
            other => Value::Text(other.to_string()),
        }),
        ColumnType::Int => match value {
            Value::Int(_) => Ok(value.clone()),
            Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
            Value::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Ok(Value::Int(*f as i64))
            }
            Value::Text(s) => {
                let s = s.trim();
                if let Ok(i) = s.parse::<i64>() {
                    return Ok(Value::Int(i));
                }
                match s.parse::<f64>() {
                    Ok(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                        Ok(Value::Int(f as i64))
                    }
                    _ => Err(fail()),
                }
            }
            _ => Err(fail()),
        },
        ColumnType::Float => match value {
            Value::Float(_) => Ok(value.clone()),
            Value::Int(i) => Ok(Value::Float(*i as f64)),
            Value::Text(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| fail()),
            _ => Err(fail()),
        },
        ColumnType::Bool => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::Int(0) => Ok(Value::Bool(false)),
            Value::Int(1) => Ok(Value::Bool(true)),
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "yes" | "1" => Ok(Value::Bool(true)),
                "false" | "f" | "no" | "0" => Ok(Value::Bool(false)),
                _ => Err(fail()),
            },
            _ => Err(fail()),
        },
        ColumnType::DateTime => match value {
            Value::DateTime(_) => Ok(value.clone()),
            Value::Text(s) => parse_datetime(s).map(Value::DateTime).ok_or_else(fail),
            _ => Err(fail()),
        },
        ColumnType::TimeDelta => match value {
            Value::Duration(_) => Ok(value.clone()),
            Value::Text(s) => parse_duration(s).map(Value::Duration).ok_or_else(fail),
            _ => Err(fail()),
        },
        ColumnType::TimeZone => match value {
            Value::TimeZone(_) => Ok(value.clone()),
            Value::Text(s) => parse_timezone(s).map(Value::TimeZone).ok_or_else(fail),
            _ => Err(fail()),
        },
        ColumnType::Json => match value {
            Value::Json(_) => Ok(value.clone()),
            Value::Text(s) => serde_json::from_str::<JsonValue>(s)
                .map(Value::Json)
                .map_err(|_| fail()),
            _ => Err(fail()),
        },
        ColumnType::Enum(variants) => {
            let text = value.to_string();
            if variants.is_empty() {
                return Ok(Value::Text(text));
            }
            variants
                .iter()
                .find(|v| v.eq_ignore_ascii_case(text.trim()))
                .map(|v| Value::Text(v.clone()))
                .ok_or_else(fail)
        }
    }
}

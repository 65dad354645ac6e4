//! Element types a filter can carry

use std::fmt;

use chrono::{DateTime, Utc};

use crate::codec::Value;
use crate::utils::time::parse_datetime;

use super::version::Version;

/// A filterable value domain.
///
/// `to_value` produces the cell form bound as a query parameter;
/// `from_value` reads a materialized cell back for in-memory evaluation and
/// returns `None` for nulls and cells of another kind.
pub trait FilterValue: Ord + Clone + fmt::Debug + Send + Sync + 'static {
    /// Ordering that text comparison of `to_value` does not reproduce
    const SEMANTIC_ORDER: bool = false;

    fn to_value(&self) -> Value;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FilterValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl FilterValue for i64 {
    fn to_value(&self) -> Value {
        Value::Int(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FilterValue for Version {
    const SEMANTIC_ORDER: bool = true;

    fn to_value(&self) -> Value {
        Value::Text(self.as_str().to_string())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Text(s) => Some(Version::parse(s)),
            Value::Int(_) | Value::Float(_) => Some(Version::parse(&value.to_string())),
            _ => None,
        }
    }
}

impl FilterValue for DateTime<Utc> {
    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::DateTime(dt) => Some(*dt),
            Value::Text(s) => parse_datetime(s),
            _ => None,
        }
    }
}

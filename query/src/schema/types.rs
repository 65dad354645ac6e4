//! Column descriptors
//!
//! Declared type tags are resolved once, when the schema is built, into the
//! closed `ColumnType` enum.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::SchemaError;

/// Declared value type of a physical column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum ColumnType {
    Str,
    Int,
    Float,
    Bool,
    DateTime,
    TimeDelta,
    TimeZone,
    Json,
    /// Text restricted to the listed variants (empty = unrestricted)
    Enum(Vec<String>),
}

impl FromStr for ColumnType {
    type Err = SchemaError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let normalized = tag.trim();
        let lower = normalized.to_ascii_lowercase();
        let parsed = match lower.as_str() {
            "str" | "string" => ColumnType::Str,
            "int" | "integer" => ColumnType::Int,
            "float" => ColumnType::Float,
            "bool" | "boolean" => ColumnType::Bool,
            "datetime" => ColumnType::DateTime,
            "timedelta" => ColumnType::TimeDelta,
            "timezone" => ColumnType::TimeZone,
            "json" => ColumnType::Json,
            "enum" => ColumnType::Enum(Vec::new()),
            _ => {
                let inner = lower
                    .strip_prefix("enum(")
                    .and_then(|rest| rest.strip_suffix(')'))
                    .ok_or_else(|| SchemaError::UnknownType(tag.to_string()))?;
                // Keep the caller's casing for variant names.
                let start = normalized.len() - inner.len() - 1;
                let variants = normalized[start..normalized.len() - 1]
                    .split(',')
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect();
                ColumnType::Enum(variants)
            }
        };
        Ok(parsed)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Str => f.write_str("str"),
            ColumnType::Int => f.write_str("int"),
            ColumnType::Float => f.write_str("float"),
            ColumnType::Bool => f.write_str("bool"),
            ColumnType::DateTime => f.write_str("datetime"),
            ColumnType::TimeDelta => f.write_str("timedelta"),
            ColumnType::TimeZone => f.write_str("timezone"),
            ColumnType::Json => f.write_str("json"),
            ColumnType::Enum(variants) if variants.is_empty() => f.write_str("enum"),
            ColumnType::Enum(variants) => write!(f, "enum({})", variants.join(", ")),
        }
    }
}

impl From<ColumnType> for String {
    fn from(ty: ColumnType) -> Self {
        ty.to_string()
    }
}

/// One physical column: name plus declared type. Its position in the owning
/// `TableSchema` is its physical index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub column_type: ColumnType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

//! Compiled clauses and their out-of-band parameters

use std::fmt;

use serde::Serialize;

use crate::codec::Value;
use crate::schema::ColumnType;

/// Parameter type, named after the warehouse's scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SqlType {
    String,
    Int64,
    Float64,
    Bool,
    Timestamp,
    Json,
}

impl SqlType {
    /// Parameter type for values bound against a column of `ty`
    pub fn for_column(ty: &ColumnType) -> Self {
        match ty {
            ColumnType::Int => SqlType::Int64,
            ColumnType::Float => SqlType::Float64,
            ColumnType::Bool => SqlType::Bool,
            ColumnType::DateTime => SqlType::Timestamp,
            ColumnType::Json => SqlType::Json,
            ColumnType::Str
            | ColumnType::TimeDelta
            | ColumnType::TimeZone
            | ColumnType::Enum(_) => SqlType::String,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SqlType::String => "STRING",
            SqlType::Int64 => "INT64",
            SqlType::Float64 => "FLOAT64",
            SqlType::Bool => "BOOL",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Json => "JSON",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scalar or an array of scalars of the parameter's type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Scalar(Value),
    Array(Vec<Value>),
}

/// One bound parameter. Positional dialects leave `name` empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryParam {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub sql_type: SqlType,
    pub value: ParamValue,
}

impl QueryParam {
    pub fn scalar(name: Option<String>, sql_type: SqlType, value: Value) -> Self {
        Self {
            name,
            sql_type,
            value: ParamValue::Scalar(value),
        }
    }

    pub fn array(name: impl Into<String>, sql_type: SqlType, values: Vec<Value>) -> Self {
        Self {
            name: Some(name.into()),
            sql_type,
            value: ParamValue::Array(values),
        }
    }

    /// Flattened scalar values, in binding order
    pub fn values(&self) -> Vec<&Value> {
        match &self.value {
            ParamValue::Scalar(v) => vec![v],
            ParamValue::Array(vs) => vs.iter().collect(),
        }
    }
}

/// A predicate fragment plus its parameters. Not executable by itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParameterizedClause {
    pub text: String,
    pub parameters: Vec<QueryParam>,
}

impl ParameterizedClause {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

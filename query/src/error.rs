//! Error types
//!
//! Configuration problems (`SchemaError`) and filter contradictions
//! (`CompileError`) surface immediately. Per-cell `ConvertError`s are recovered
//! inside the row decoder and only escape through the strict helpers.

use thiserror::Error;

use crate::filters::FilterField;

/// Schema construction and loading errors
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A locator points past the end of the column list
    #[error("Column map entry '{field}' references index {index}, but table '{table}' has {columns} columns")]
    IndexOutOfRange {
        table: String,
        field: String,
        index: usize,
        columns: usize,
    },

    /// A locator names a column the table does not have
    #[error("Column map entry '{field}' references unknown column '{column}' in table '{table}'")]
    UnknownColumn {
        table: String,
        field: String,
        column: String,
    },

    /// Two columns share a name
    #[error("Duplicate column '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// A declared type tag is not one of the supported types
    #[error("Unknown column type '{0}'")]
    UnknownType(String),

    /// A column map entry has an unsupported shape
    #[error("Invalid column map entry '{field}': {reason}")]
    InvalidLocator { field: String, reason: String },

    /// Schema document could not be parsed
    #[error("Invalid schema document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Schema file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Clause compilation errors
///
/// These are programming or request errors: the filter cannot be expressed
/// for the target column and compilation stops at the first one.
#[derive(Error, Debug)]
pub enum CompileError {
    /// The filter shape is not permitted for the field
    #[error("{field} does not accept a {shape} filter")]
    ShapeNotAllowed {
        field: FilterField,
        shape: &'static str,
    },

    /// Range minimum is greater than its maximum
    #[error("Range filter on '{column}' has minimum {min} greater than maximum {max}")]
    InvertedRange {
        column: String,
        min: String,
        max: String,
    },

    /// A non-trivial filter targets a field with no column behind it
    #[error("{0} has an active filter but no column binding")]
    Unbound(FilterField),

    /// The field is backed by several columns and cannot be filtered directly
    #[error("{0} is composed from several columns and cannot be filtered")]
    CompositeBinding(FilterField),

    /// A filter element could not be converted to the column's declared type
    #[error("Filter element {value} cannot be used with column '{column}': {source}")]
    ElementType {
        column: String,
        value: String,
        #[source]
        source: ConvertError,
    },

    /// A semantically ordered range bound to a column compared as text
    #[error("Range filter on '{column}' compares versions, but the column is compared as text")]
    TextOrderedRange { column: String },

    /// A filter element converted to null
    #[error("Filter element {value} converts to null for column '{column}'")]
    NullElement { column: String, value: String },

    /// The in-memory frame has no column of that name
    #[error("Frame has no column '{0}'")]
    MissingFrameColumn(String),
}

/// Single value conversion failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// The value's text or kind does not fit the declared type
    #[error("cannot convert {kind} value '{value}' to {target}")]
    Incompatible {
        kind: &'static str,
        value: String,
        target: String,
    },

    /// The row is shorter than the locator expects
    #[error("row has no cell at index {0}")]
    MissingCell(usize),
}

impl ConvertError {
    pub fn incompatible(kind: &'static str, value: impl ToString, target: impl ToString) -> Self {
        Self::Incompatible {
            kind,
            value: value.to_string(),
            target: target.to_string(),
        }
    }
}

/// Row decoding errors
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Row width differs from the schema
    #[error("Row {row} has {actual} cells, table '{table}' declares {expected}")]
    RowLength {
        table: String,
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Filter document parsing errors
#[derive(Error, Debug)]
pub enum FilterParseError {
    #[error("Filter JSON exceeds maximum size of {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Filter document holds {count} set elements, maximum is {limit}")]
    TooManyElements { count: usize, limit: usize },

    #[error("Invalid filter JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed JSON describing a filter the field cannot take
    #[error("Invalid filter: {0}")]
    Contradiction(#[from] CompileError),
}

/// Umbrella error for callers that drive the whole pipeline
#[derive(Error, Debug)]
pub enum QueryError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    FilterParse(#[from] FilterParseError),
}

impl QueryError {
    /// Whether this error comes from configuration rather than data
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Schema(_) | Self::FilterParse(_))
    }
}

//! Table schema: ordered columns plus the logical mapping over them

use rustc_hash::FxHashSet;

use crate::constants::DEFAULT_CONCATENATOR;
use crate::error::SchemaError;

use super::mapping::{ColumnLocator, ColumnMapping};
use super::types::{ColumnDescriptor, ColumnType};

/// Ordered column list for one data source.
///
/// Column order is fixed at construction; every locator index is validated
/// against it here so decoding never has to re-check.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    name: String,
    columns: Vec<ColumnDescriptor>,
    column_types: Vec<ColumnType>,
    mapping: ColumnMapping,
    concatenator: String,
}

impl TableSchema {
    /// Build and validate a schema.
    pub fn new(
        name: impl Into<String>,
        columns: Vec<ColumnDescriptor>,
        mapping: ColumnMapping,
    ) -> Result<Self, SchemaError> {
        let name = name.into();

        let mut seen = FxHashSet::default();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaError::DuplicateColumn {
                    table: name,
                    column: column.name.clone(),
                });
            }
        }

        for (field, locator) in mapping.iter() {
            if let ColumnLocator::List(indices) = locator
                && indices.is_empty()
            {
                return Err(SchemaError::InvalidLocator {
                    field: field.to_string(),
                    reason: "list locator needs at least one column".to_string(),
                });
            }
            if let Some(index) = locator.indices().into_iter().find(|i| *i >= columns.len()) {
                return Err(SchemaError::IndexOutOfRange {
                    table: name,
                    field: field.to_string(),
                    index,
                    columns: columns.len(),
                });
            }
        }

        let column_types = columns.iter().map(|c| c.column_type.clone()).collect();
        tracing::debug!(table = %name, columns = columns.len(), "Built table schema");

        Ok(Self {
            name,
            columns,
            column_types,
            mapping,
            concatenator: DEFAULT_CONCATENATOR.to_string(),
        })
    }

    /// Replace the List-locator separator
    pub fn with_concatenator(mut self, concatenator: impl Into<String>) -> Self {
        self.concatenator = concatenator.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&ColumnDescriptor> {
        self.columns.get(index)
    }

    /// Declared types in physical order
    pub fn column_types(&self) -> &[ColumnType] {
        &self.column_types
    }

    /// Physical index of a column by name
    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == column)
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    pub fn locator(&self, field: &str) -> &ColumnLocator {
        self.mapping.get(field)
    }

    pub fn concatenator(&self) -> &str {
        &self.concatenator
    }
}

//! Filter field -> physical column bindings

use std::collections::BTreeMap;

use crate::error::CompileError;
use crate::filters::FilterField;
use crate::schema::{ColumnLocator, ColumnType, TableSchema};

/// The column a filter field compiles against
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBinding {
    pub column: String,
    pub column_type: ColumnType,
}

#[derive(Debug, Clone, PartialEq)]
enum Target {
    Column(ColumnBinding),
    /// Backed by a List/Dict locator; not filterable
    Composite,
}

/// Bindings for every filterable field of one table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnBindings {
    targets: BTreeMap<FilterField, Target>,
}

impl ColumnBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a field explicitly
    pub fn bind(
        mut self,
        field: FilterField,
        column: impl Into<String>,
        column_type: ColumnType,
    ) -> Self {
        self.targets.insert(
            field,
            Target::Column(ColumnBinding {
                column: column.into(),
                column_type,
            }),
        );
        self
    }

    /// Derive bindings from a schema's column mapping
    pub fn from_schema(schema: &TableSchema) -> Self {
        let mut targets = BTreeMap::new();
        for field in FilterField::ALL {
            let target = match schema.locator(field.logical_field()) {
                ColumnLocator::Absent => continue,
                ColumnLocator::Single(index) => match schema.column(*index) {
                    Some(column) => Target::Column(ColumnBinding {
                        column: column.name.clone(),
                        column_type: column.column_type.clone(),
                    }),
                    None => continue,
                },
                ColumnLocator::List(_) | ColumnLocator::Dict(_) => Target::Composite,
            };
            targets.insert(field, target);
        }
        tracing::debug!(
            table = %schema.name(),
            bound = targets.len(),
            "Derived filter bindings from schema"
        );
        Self { targets }
    }

    /// Column behind `field`
    pub fn resolve(&self, field: FilterField) -> Result<&ColumnBinding, CompileError> {
        match self.targets.get(&field) {
            Some(Target::Column(binding)) => Ok(binding),
            Some(Target::Composite) => Err(CompileError::CompositeBinding(field)),
            None => Err(CompileError::Unbound(field)),
        }
    }
}

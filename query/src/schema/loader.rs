//! Schema documents (JSON)
//!
//! ```json
//! {
//!   "table": "events",
//!   "columns": [
//!     {"name": "session_id", "type": "str"},
//!     {"name": "event_params", "type": "json", "description": "raw params"}
//!   ],
//!   "column_map": {
//!     "session_id": "session_id",
//!     "event_data": {"params": "event_params"},
//!     "app_id": null
//!   },
//!   "concatenator": "."
//! }
//! ```
//!
//! Column map entries may name a column or give its 0-based index. Names are
//! resolved to indices here, once.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::SchemaError;

use super::mapping::{ColumnLocator, ColumnMapping};
use super::table::TableSchema;
use super::types::{ColumnDescriptor, ColumnType};

#[derive(Debug, Deserialize)]
struct ColumnEntry {
    name: String,
    #[serde(rename = "type")]
    type_tag: String,
    description: Option<String>,
}

/// Reference to one column inside a column map entry
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ColumnRef {
    Index(usize),
    Name(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LocatorEntry {
    Absent(()),
    Single(ColumnRef),
    List(Vec<ColumnRef>),
    Dict(serde_json::Map<String, JsonValue>),
}

/// On-disk schema document
#[derive(Debug, Deserialize)]
struct SchemaDocument {
    table: String,
    columns: Vec<ColumnEntry>,
    #[serde(default)]
    column_map: serde_json::Map<String, JsonValue>,
    concatenator: Option<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, JsonValue>,
}

impl SchemaDocument {
    /// Warn about unknown top-level keys
    fn warn_unknown_fields(&self) {
        if !self.extra.is_empty() {
            let keys_str = self
                .extra
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                table = %self.table,
                fields = %keys_str,
                "Unknown fields in schema document (possible typos)"
            );
        }
    }

    fn into_schema(self) -> Result<TableSchema, SchemaError> {
        self.warn_unknown_fields();

        let columns = self
            .columns
            .into_iter()
            .map(|entry| {
                let column_type: ColumnType = entry.type_tag.parse()?;
                let mut column = ColumnDescriptor::new(entry.name, column_type);
                column.description = entry.description;
                Ok(column)
            })
            .collect::<Result<Vec<_>, SchemaError>>()?;

        let resolver = Resolver {
            table: &self.table,
            columns: &columns,
        };
        let mut mapping = ColumnMapping::new();
        for (field, raw) in self.column_map {
            let entry: LocatorEntry =
                serde_json::from_value(raw).map_err(|e| SchemaError::InvalidLocator {
                    field: field.clone(),
                    reason: e.to_string(),
                })?;
            let locator = resolver.locator(&field, entry)?;
            tracing::trace!(field = %field, locator = ?locator, "Resolved column map entry");
            mapping.insert(field, locator);
        }

        let schema = TableSchema::new(self.table, columns, mapping)?;
        Ok(match self.concatenator {
            Some(sep) => schema.with_concatenator(sep),
            None => schema,
        })
    }
}

struct Resolver<'a> {
    table: &'a str,
    columns: &'a [ColumnDescriptor],
}

impl Resolver<'_> {
    fn index(&self, field: &str, reference: ColumnRef) -> Result<usize, SchemaError> {
        match reference {
            ColumnRef::Index(i) => Ok(i),
            ColumnRef::Name(name) => self
                .columns
                .iter()
                .position(|c| c.name == name)
                .ok_or_else(|| SchemaError::UnknownColumn {
                    table: self.table.to_string(),
                    field: field.to_string(),
                    column: name,
                }),
        }
    }

    fn locator(&self, field: &str, entry: LocatorEntry) -> Result<ColumnLocator, SchemaError> {
        Ok(match entry {
            LocatorEntry::Absent(()) => ColumnLocator::Absent,
            LocatorEntry::Single(r) => ColumnLocator::Single(self.index(field, r)?),
            LocatorEntry::List(refs) => ColumnLocator::List(
                refs.into_iter()
                    .map(|r| self.index(field, r))
                    .collect::<Result<_, _>>()?,
            ),
            LocatorEntry::Dict(map) => {
                let mut pairs = Vec::with_capacity(map.len());
                for (key, raw) in map {
                    let reference: ColumnRef = serde_json::from_value(raw).map_err(|e| {
                        SchemaError::InvalidLocator {
                            field: field.to_string(),
                            reason: format!("key '{}': {}", key, e),
                        }
                    })?;
                    pairs.push((key, self.index(field, reference)?));
                }
                ColumnLocator::Dict(pairs)
            }
        })
    }
}

/// Parse a schema from a JSON string.
pub fn schema_from_json(content: &str) -> Result<TableSchema, SchemaError> {
    let document: SchemaDocument = serde_json::from_str(content)?;
    document.into_schema()
}

/// Load a schema from a JSON file.
pub fn load_schema(path: &Path) -> Result<TableSchema, SchemaError> {
    tracing::debug!(path = %path.display(), "Loading schema file");
    let content = fs::read_to_string(path)?;
    schema_from_json(&content)
}

//! Row encoder: the inverse of the decoder, where one exists
//!
//! - `Single(i)` writes the field value to column `i`, normalized to the
//!   column's declared type.
//! - `List(..)` splits the text by the concatenator and writes one part per
//!   column, but only when the part count matches; otherwise the columns stay
//!   `Null`.
//! - `Dict(..)` writes each key to its column. Keys with no column of their own
//!   were flattened out of a JSON column and go back to the first JSON column
//!   whose own key is missing from the object.
//!
//! Columns no field maps to are `Null`.

use serde_json::{Map, Value as JsonValue};

use crate::schema::{ColumnLocator, ColumnType, TableSchema};

use super::convert::convert_to_type;
use super::record::DomainRecord;
use super::value::Value;

pub struct RowEncoder<'a> {
    schema: &'a TableSchema,
}

impl<'a> RowEncoder<'a> {
    pub fn new(schema: &'a TableSchema) -> Self {
        Self { schema }
    }

    pub fn encode<R: DomainRecord>(&self, record: &R) -> Vec<Value> {
        let mut row = vec![Value::Null; self.schema.columns().len()];
        for field in R::FIELDS {
            let value = record.field_value(field);
            match self.schema.locator(field) {
                ColumnLocator::Absent => {}
                ColumnLocator::Single(index) => self.write(&mut row, *index, value),
                ColumnLocator::List(indices) => self.write_list(&mut row, field, indices, value),
                ColumnLocator::Dict(pairs) => self.write_dict(&mut row, field, pairs, value),
            }
        }
        row
    }

    /// Normalize to the declared type; a value that does not convert is kept.
    fn write(&self, row: &mut [Value], index: usize, value: Value) {
        let Some(slot) = row.get_mut(index) else {
            return;
        };
        *slot = match self.schema.column_types().get(index) {
            Some(ty) => convert_to_type(&value, ty).unwrap_or(value),
            None => value,
        };
    }

    fn write_list(&self, row: &mut [Value], field: &str, indices: &[usize], value: Value) {
        if value.is_null() {
            return;
        }
        let text = value.to_string();
        let parts: Vec<&str> = text.split(self.schema.concatenator()).collect();
        if parts.len() != indices.len() {
            tracing::trace!(
                field,
                parts = parts.len(),
                columns = indices.len(),
                "Cannot split concatenated value back into its columns"
            );
            return;
        }
        for (index, part) in indices.iter().zip(parts) {
            self.write(row, *index, Value::from(part));
        }
    }

    fn write_dict(&self, row: &mut [Value], field: &str, pairs: &[(String, usize)], value: Value) {
        let Some(object) = value.as_object() else {
            return;
        };

        let mut leftovers = Map::new();
        for (key, item) in object {
            match pairs.iter().find(|(k, _)| k == key) {
                Some((_, index)) => self.write(row, *index, Value::from_json(item.clone())),
                None => {
                    leftovers.insert(key.clone(), item.clone());
                }
            }
        }
        if leftovers.is_empty() {
            return;
        }

        let target = pairs.iter().find(|(key, index)| {
            !object.contains_key(key)
                && matches!(self.schema.column_types().get(*index), Some(ColumnType::Json))
        });
        match target {
            Some((_, index)) => self.write(row, *index, Value::Json(JsonValue::Object(leftovers))),
            None => tracing::trace!(
                field,
                keys = leftovers.len(),
                "No JSON column to hold flattened keys"
            ),
        }
    }
}

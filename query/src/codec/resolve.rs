//! Locator resolution: physical cells -> one logical value

use serde_json::{Map, Value as JsonValue};

use crate::error::ConvertError;
use crate::schema::{ColumnLocator, ColumnType};

use super::convert::convert_to_type;
use super::value::Value;

/// Resolve one locator against a raw row.
///
/// - `Absent` returns `fallback`.
/// - `Single(i)` converts `row[i]` to its declared type.
/// - `List(..)` joins the raw text of each cell with `concatenator`; the
///   result is always text.
/// - `Dict(..)` converts each cell and builds an object. A cell that converts
///   to an object is merged into the top level instead of nested.
///
/// Fails on the first cell that does not convert.
pub fn resolve_locator(
    row: &[Value],
    locator: &ColumnLocator,
    types: &[ColumnType],
    concatenator: &str,
    fallback: Value,
) -> Result<Value, ConvertError> {
    resolve_with(row, locator, types, concatenator, fallback, |_, _, err| Err(err))
}

/// Like `resolve_locator`, but a cell that fails conversion is handed to
/// `on_failure` (index, raw cell, error), which may substitute a value.
pub(crate) fn resolve_with<F>(
    row: &[Value],
    locator: &ColumnLocator,
    types: &[ColumnType],
    concatenator: &str,
    fallback: Value,
    mut on_failure: F,
) -> Result<Value, ConvertError>
where
    F: FnMut(usize, &Value, ConvertError) -> Result<Value, ConvertError>,
{
    let mut convert = |index: usize| -> Result<Value, ConvertError> {
        let raw = row.get(index).ok_or(ConvertError::MissingCell(index))?;
        let ty = types.get(index).ok_or(ConvertError::MissingCell(index))?;
        convert_to_type(raw, ty).or_else(|err| on_failure(index, raw, err))
    };

    match locator {
        ColumnLocator::Absent => Ok(fallback),
        ColumnLocator::Single(index) => convert(*index),
        ColumnLocator::List(indices) => {
            let parts = indices
                .iter()
                .map(|i| {
                    row.get(*i)
                        .map(ToString::to_string)
                        .ok_or(ConvertError::MissingCell(*i))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Text(parts.join(concatenator)))
        }
        ColumnLocator::Dict(pairs) => {
            let mut composed = Map::new();
            for (key, index) in pairs {
                match convert(*index)? {
                    Value::Json(JsonValue::Object(inner)) => composed.extend(inner),
                    other => {
                        composed.insert(key.clone(), other.to_json());
                    }
                }
            }
            Ok(Value::Json(JsonValue::Object(composed)))
        }
    }
}

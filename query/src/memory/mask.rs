//! Boolean mask compilation
//!
//! Each non-trivial filter becomes a predicate over one frame column; a clause
//! keeps a row when every predicate holds. Predicates follow the filter
//! evaluator exactly, so one-sided INCLUDE bounds are inclusive here and
//! version ranges compare semantically, even on columns SQL compares as text.
//! A null or unreadable cell never satisfies a non-trivial filter.

use std::fmt;
use std::sync::Arc;

use crate::codec::Value;
use crate::error::CompileError;
use crate::filters::{
    Filter, FilterCollection, FilterField, FilterShape, FilterValue, FilterVisitor, RangeFilter,
    SetFilter,
};
use crate::sql::ColumnBindings;

use super::frame::Frame;

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A predicate bound to one frame column
#[derive(Clone)]
pub struct ColumnMask {
    column: String,
    predicate: Predicate,
}

impl ColumnMask {
    pub fn new(
        column: impl Into<String>,
        predicate: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            column: column.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// A mask no row satisfies
    pub fn never(column: impl Into<String>) -> Self {
        Self::new(column, |_| false)
    }

    fn from_filter<T: FilterValue>(column: &str, filter: Filter<T>) -> Self {
        Self::new(column, move |cell| {
            T::from_value(cell).is_some_and(|value| filter.is_satisfied_by(&value))
        })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn matches(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }
}

impl fmt::Debug for ColumnMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnMask")
            .field("column", &self.column)
            .finish_non_exhaustive()
    }
}

/// Conjunction of column masks; empty keeps every row
#[derive(Debug, Clone, Default)]
pub struct MaskClause {
    masks: Vec<ColumnMask>,
}

impl MaskClause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, mask: ColumnMask) -> Self {
        self.masks.push(mask);
        self
    }

    pub fn masks(&self) -> &[ColumnMask] {
        &self.masks
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// One flag per frame row
    pub fn evaluate(&self, frame: &Frame) -> Result<Vec<bool>, CompileError> {
        let indexed = self
            .masks
            .iter()
            .map(|mask| {
                frame
                    .column_index(mask.column())
                    .map(|index| (index, mask))
                    .ok_or_else(|| CompileError::MissingFrameColumn(mask.column().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(frame
            .rows()
            .iter()
            .map(|row| {
                indexed
                    .iter()
                    .all(|(index, mask)| row.get(*index).is_some_and(|cell| mask.matches(cell)))
            })
            .collect())
    }
}

/// Compiles filters into masks over bound frame columns
pub struct MaskCompiler<'a> {
    bindings: &'a ColumnBindings,
}

impl<'a> MaskCompiler<'a> {
    pub fn new(bindings: &'a ColumnBindings) -> Self {
        Self { bindings }
    }

    pub fn compile_set_filter<T: FilterValue>(
        &self,
        field: FilterField,
        filter: &SetFilter<T>,
    ) -> Result<ColumnMask, CompileError> {
        check_shape(field, FilterShape::Set)?;
        let column = &self.bindings.resolve(field)?.column;
        if filter.elements.is_empty() && !filter.mode.is_exclude() {
            return Ok(ColumnMask::never(column.as_str()));
        }
        Ok(ColumnMask::from_filter(column, Filter::Set(filter.clone())))
    }

    pub fn compile_range_filter<T: FilterValue>(
        &self,
        field: FilterField,
        filter: &RangeFilter<T>,
    ) -> Result<ColumnMask, CompileError> {
        check_shape(field, FilterShape::Range)?;
        let column = &self.bindings.resolve(field)?.column;
        if filter.is_inverted()
            && let (Some(min), Some(max)) = (&filter.minimum, &filter.maximum)
        {
            return Err(CompileError::InvertedRange {
                column: column.clone(),
                min: min.to_value().to_string(),
                max: max.to_value().to_string(),
            });
        }
        Ok(ColumnMask::from_filter(column, Filter::Range(filter.clone())))
    }

    /// Mask for one filter; `None` when the filter restricts nothing
    pub fn compile_filter<T: FilterValue>(
        &self,
        field: FilterField,
        filter: &Filter<T>,
    ) -> Result<Option<ColumnMask>, CompileError> {
        if filter.is_trivial() {
            return Ok(None);
        }
        match filter {
            Filter::NoFilter => Ok(None),
            Filter::Set(set) => self.compile_set_filter(field, set).map(Some),
            Filter::Range(range) => self.compile_range_filter(field, range).map(Some),
        }
    }

    pub fn compile_collection(
        &self,
        collection: &FilterCollection,
    ) -> Result<MaskClause, CompileError> {
        collection.validate()?;
        let mut pass = MaskPass {
            compiler: self,
            clause: MaskClause::new(),
        };
        collection.accept(&mut pass)?;
        tracing::debug!(masks = pass.clause.masks.len(), "Compiled filter collection to masks");
        Ok(pass.clause)
    }
}

fn check_shape(field: FilterField, shape: FilterShape) -> Result<(), CompileError> {
    if field.allows(shape) {
        Ok(())
    } else {
        Err(CompileError::ShapeNotAllowed {
            field,
            shape: shape.as_str(),
        })
    }
}

struct MaskPass<'c, 'a> {
    compiler: &'c MaskCompiler<'a>,
    clause: MaskClause,
}

impl FilterVisitor for MaskPass<'_, '_> {
    type Error = CompileError;

    fn visit<T: FilterValue>(
        &mut self,
        field: FilterField,
        filter: &Filter<T>,
    ) -> Result<(), CompileError> {
        if let Some(mask) = self.compiler.compile_filter(field, filter)? {
            self.clause.masks.push(mask);
        }
        Ok(())
    }
}

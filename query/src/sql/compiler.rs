//! Clause compiler
//!
//! Turns filters into `ParameterizedClause`s for one SQL dialect.
//!
//! Fragment shapes (`{not}` is empty under INCLUDE and `NOT` under EXCLUDE):
//! - set: `{col} {not} IN {rhs}`
//! - range with both bounds: `{col} {not} BETWEEN {min} AND {max}`
//! - minimum only: `{col} > {min}` (INCLUDE) / `{col} < {min}` (EXCLUDE)
//! - maximum only: `{col} < {max}` (INCLUDE) / `{col} > {max}` (EXCLUDE)
//!
//! One-sided ranges are strict. Version ranges need a column whose own
//! ordering matches theirs; on a text column they are refused. An INCLUDE set with no elements renders the
//! never-true fragment; an EXCLUDE set with no elements and an unbounded range
//! render nothing.

use rustc_hash::FxHashSet;

use crate::codec::{Value, convert_to_type};
use crate::constants::{
    CONJUNCTION, NEVER_TRUE, PARAM_SUFFIX_LIST, PARAM_SUFFIX_MAX, PARAM_SUFFIX_MIN, WHERE_PREFIX,
};
use crate::error::CompileError;
use crate::filters::{
    Filter, FilterCollection, FilterField, FilterShape, FilterValue, FilterVisitor, RangeFilter,
    SetFilter,
};
use crate::schema::ColumnType;
use crate::utils::sql::param_stem;

use super::bindings::{ColumnBinding, ColumnBindings};
use super::dialect::SqlDialect;
use super::params::{ParameterizedClause, QueryParam, SqlType};
use super::Backend;

/// Compiles filters against a set of column bindings
pub struct ClauseCompiler<'a> {
    dialect: &'static dyn SqlDialect,
    bindings: &'a ColumnBindings,
}

impl<'a> ClauseCompiler<'a> {
    pub fn new(backend: Backend, bindings: &'a ColumnBindings) -> Self {
        Self {
            dialect: backend.dialect(),
            bindings,
        }
    }

    pub fn dialect(&self) -> &'static dyn SqlDialect {
        self.dialect
    }

    /// Compile one set filter. The text carries no `WHERE` prefix.
    pub fn compile_set_filter<T: FilterValue>(
        &self,
        field: FilterField,
        filter: &SetFilter<T>,
    ) -> Result<ParameterizedClause, CompileError> {
        check_shape(field, FilterShape::Set)?;
        let binding = self.bindings.resolve(field)?;
        let mut builder = ClauseBuilder::new(self.dialect);
        builder.set(binding, filter)?;
        Ok(builder.finish_fragment())
    }

    /// Compile one range filter. The text carries no `WHERE` prefix.
    pub fn compile_range_filter<T: FilterValue>(
        &self,
        field: FilterField,
        filter: &RangeFilter<T>,
    ) -> Result<ParameterizedClause, CompileError> {
        if filter.is_unbounded() {
            return Ok(ParameterizedClause::default());
        }
        check_shape(field, FilterShape::Range)?;
        let binding = self.bindings.resolve(field)?;
        let mut builder = ClauseBuilder::new(self.dialect);
        builder.range(binding, filter)?;
        Ok(builder.finish_fragment())
    }

    /// Compile one filter of any variant. Trivial filters compile to nothing.
    pub fn compile_filter<T: FilterValue>(
        &self,
        field: FilterField,
        filter: &Filter<T>,
    ) -> Result<ParameterizedClause, CompileError> {
        match filter {
            _ if filter.is_trivial() => Ok(ParameterizedClause::default()),
            Filter::NoFilter => Ok(ParameterizedClause::default()),
            Filter::Set(set) => self.compile_set_filter(field, set),
            Filter::Range(range) => self.compile_range_filter(field, range),
        }
    }

    /// AND every non-trivial filter of the collection into one `WHERE` clause.
    ///
    /// Fragments and parameters follow the collection's visiting order, so the
    /// output is reproducible byte for byte. An empty collection compiles to
    /// empty text.
    pub fn compile_collection(
        &self,
        collection: &FilterCollection,
    ) -> Result<ParameterizedClause, CompileError> {
        collection.validate()?;

        let mut pass = CollectionPass {
            bindings: self.bindings,
            builder: ClauseBuilder::new(self.dialect),
        };
        collection.accept(&mut pass)?;
        let clause = pass.builder.finish_where();

        tracing::debug!(
            dialect = self.dialect.name(),
            parameters = clause.parameters.len(),
            empty = clause.is_empty(),
            "Compiled filter collection"
        );
        Ok(clause)
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

struct CollectionPass<'a> {
    bindings: &'a ColumnBindings,
    builder: ClauseBuilder,
}

impl FilterVisitor for CollectionPass<'_> {
    type Error = CompileError;

    fn visit<T: FilterValue>(
        &mut self,
        field: FilterField,
        filter: &Filter<T>,
    ) -> Result<(), CompileError> {
        if filter.is_trivial() {
            return Ok(());
        }
        let binding = self.bindings.resolve(field)?;
        match filter {
            Filter::NoFilter => Ok(()),
            Filter::Set(set) => self.builder.set(binding, set),
            Filter::Range(range) => self.builder.range(binding, range),
        }
    }
}

/// Accumulates fragments and parameters; placeholders are numbered across the
/// whole clause and parameter names are unique within it.
struct ClauseBuilder {
    dialect: &'static dyn SqlDialect,
    fragments: Vec<String>,
    parameters: Vec<QueryParam>,
    names: FxHashSet<String>,
}

impl ClauseBuilder {
    fn new(dialect: &'static dyn SqlDialect) -> Self {
        Self {
            dialect,
            fragments: Vec::new(),
            parameters: Vec::new(),
            names: FxHashSet::default(),
        }
    }

    fn unique_name(&mut self, column: &str, suffix: &str) -> String {
        let base = format!("{}{}", param_stem(column), suffix);
        let mut name = base.clone();
        let mut n = 2;
        while self.names.contains(&name) {
            name = format!("{}_{}", base, n);
            n += 1;
        }
        self.names.insert(name.clone());
        name
    }

    /// Bind one scalar and return its placeholder
    fn push_scalar(&mut self, name: String, sql_type: SqlType, value: Value) -> String {
        let index = self.parameters.len() + 1;
        let placeholder = self.dialect.placeholder(&name, index);
        let name = self.dialect.named_parameters().then_some(name);
        self.parameters.push(QueryParam::scalar(name, sql_type, value));
        placeholder
    }

    fn push_fragment(&mut self, fragment: String) {
        tracing::trace!(fragment = %fragment, "Clause fragment");
        self.fragments.push(fragment);
    }

    fn set<T: FilterValue>(
        &mut self,
        binding: &ColumnBinding,
        filter: &SetFilter<T>,
    ) -> Result<(), CompileError> {
        if filter.elements.is_empty() {
            if !filter.mode.is_exclude() {
                self.push_fragment(NEVER_TRUE.to_string());
            }
            return Ok(());
        }

        let values = filter
            .elements
            .iter()
            .map(|e| bind_value(binding, e))
            .collect::<Result<Vec<_>, _>>()?;
        let sql_type = SqlType::for_column(&binding.column_type);
        let name = self.unique_name(&binding.column, PARAM_SUFFIX_LIST);

        let rhs = if self.dialect.binds_arrays() {
            let index = self.parameters.len() + 1;
            let placeholder = self.dialect.placeholder(&name, index);
            self.parameters.push(QueryParam::array(name, sql_type, values));
            self.dialect.in_array(&placeholder)
        } else {
            let placeholders: Vec<String> = values
                .into_iter()
                .map(|value| self.push_scalar(name.clone(), sql_type, value))
                .collect();
            self.dialect.in_list(&placeholders)
        };

        let column = self.dialect.quote_identifier(&binding.column);
        let not = if filter.mode.is_exclude() { "NOT" } else { "" };
        self.push_fragment(format!("{} {} IN {}", column, not, rhs));
        Ok(())
    }

    fn range<T: FilterValue>(
        &mut self,
        binding: &ColumnBinding,
        filter: &RangeFilter<T>,
    ) -> Result<(), CompileError> {
        if filter.is_inverted()
            && let (Some(min), Some(max)) = (&filter.minimum, &filter.maximum)
        {
            return Err(CompileError::InvertedRange {
                column: binding.column.clone(),
                min: min.to_value().to_string(),
                max: max.to_value().to_string(),
            });
        }

        if T::SEMANTIC_ORDER
            && matches!(binding.column_type, ColumnType::Str | ColumnType::Enum(_))
        {
            return Err(CompileError::TextOrderedRange {
                column: binding.column.clone(),
            });
        }

        let sql_type = SqlType::for_column(&binding.column_type);
        let column = self.dialect.quote_identifier(&binding.column);
        let exclude = filter.mode.is_exclude();

        let bound = |builder: &mut Self, value: &T, suffix: &str| {
            let converted = bind_value(binding, value)?;
            let name = builder.unique_name(&binding.column, suffix);
            Ok::<_, CompileError>(builder.push_scalar(name, sql_type, converted))
        };

        let fragment = match (&filter.minimum, &filter.maximum) {
            (None, None) => return Ok(()),
            (Some(min), Some(max)) => {
                let min = bound(self, min, PARAM_SUFFIX_MIN)?;
                let max = bound(self, max, PARAM_SUFFIX_MAX)?;
                let not = if exclude { "NOT" } else { "" };
                format!("{} {} BETWEEN {} AND {}", column, not, min, max)
            }
            (Some(min), None) => {
                let min = bound(self, min, PARAM_SUFFIX_MIN)?;
                let op = if exclude { "<" } else { ">" };
                format!("{} {} {}", column, op, min)
            }
            (None, Some(max)) => {
                let max = bound(self, max, PARAM_SUFFIX_MAX)?;
                let op = if exclude { ">" } else { "<" };
                format!("{} {} {}", column, op, max)
            }
        };
        self.push_fragment(fragment);
        Ok(())
    }

    fn finish_fragment(self) -> ParameterizedClause {
        ParameterizedClause {
            text: self.fragments.join(CONJUNCTION),
            parameters: self.parameters,
        }
    }

    fn finish_where(self) -> ParameterizedClause {
        if self.fragments.is_empty() {
            return ParameterizedClause::default();
        }
        ParameterizedClause {
            text: format!("{}{}", WHERE_PREFIX, self.fragments.join(CONJUNCTION)),
            parameters: self.parameters,
        }
    }
}

/// Convert a filter element to the bound column's declared type
fn bind_value<T: FilterValue>(binding: &ColumnBinding, element: &T) -> Result<Value, CompileError> {
    let raw = element.to_value();
    let converted =
        convert_to_type(&raw, &binding.column_type).map_err(|source| CompileError::ElementType {
            column: binding.column.clone(),
            value: raw.to_string(),
            source,
        })?;
    if converted.is_null() {
        return Err(CompileError::NullElement {
            column: binding.column.clone(),
            value: raw.to_string(),
        });
    }
    Ok(converted)
}

#[cfg(test)]
#[path = "compiler_tests.rs"]
mod tests;

//! Materialized tabular data

use crate::codec::Value;
use crate::error::{CompileError, DecodeError};

use super::mask::MaskClause;

/// Named columns plus rows of cells, in column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; its width must match the column count
    pub fn push(&mut self, row: Vec<Value>) -> Result<(), DecodeError> {
        if row.len() != self.columns.len() {
            return Err(DecodeError::RowLength {
                table: "frame".to_string(),
                row: self.rows.len(),
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn with_rows(
        mut self,
        rows: impl IntoIterator<Item = Vec<Value>>,
    ) -> Result<Self, DecodeError> {
        for row in rows {
            self.push(row)?;
        }
        Ok(self)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Rows the clause keeps, in their original order
    pub fn filter(&self, clause: &MaskClause) -> Result<Frame, CompileError> {
        let mask = clause.evaluate(self)?;
        let rows = self
            .rows
            .iter()
            .zip(mask)
            .filter_map(|(row, keep)| keep.then(|| row.clone()))
            .collect();
        Ok(Frame {
            columns: self.columns.clone(),
            rows,
        })
    }
}

//! In-memory filtering
//!
//! Compiles a `FilterCollection` into boolean masks over a materialized
//! `Frame`, for data that never reaches a SQL backend. Column names come from
//! the same `ColumnBindings` the SQL compiler uses.

mod frame;
mod mask;

pub use frame::Frame;
pub use mask::{ColumnMask, MaskClause, MaskCompiler};

//! Filter model, backend clause compiler and schema-driven row codec for
//! telemetry stores.
//!
//! - [`filters`]: set and range filters with include/exclude modes, grouped
//!   into a [`filters::FilterCollection`]
//! - [`sql`]: renders a collection as a parameterized `WHERE` clause for
//!   BigQuery, MySQL or PostgreSQL
//! - [`memory`]: evaluates a collection as boolean masks over a [`memory::Frame`]
//! - [`schema`]: declared column types and the logical-to-physical column map
//! - [`codec`]: decodes raw rows into [`codec::Event`] and [`codec::Feature`]
//!   records and encodes them back

pub mod codec;
pub mod constants;
pub mod error;
pub mod filters;
pub mod memory;
pub mod schema;
pub mod sql;
pub mod utils;

pub use error::{CompileError, ConvertError, DecodeError, FilterParseError, QueryError, SchemaError};

//! Table schemas
//!
//! - `types` - Declared column types and column descriptors
//! - `mapping` - Logical field to physical column locators
//! - `table` - Validated, ordered column list plus mapping
//! - `loader` - JSON schema documents

mod loader;
mod mapping;
mod table;
mod types;

pub use loader::{load_schema, schema_from_json};
pub use mapping::{ColumnLocator, ColumnMapping};
pub use table::TableSchema;
pub use types::{ColumnDescriptor, ColumnType};

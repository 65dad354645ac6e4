//! PostgreSQL SQL dialect implementation

use crate::utils::sql::quote_identifier;

use super::SqlDialect;

/// PostgreSQL SQL dialect
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        quote_identifier(ident, '"')
    }

    fn named_parameters(&self) -> bool {
        false
    }

    fn placeholder(&self, _name: &str, index: usize) -> String {
        format!("${}", index)
    }
}

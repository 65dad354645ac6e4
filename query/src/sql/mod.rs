//! SQL clause compilation for multiple backends
//!
//! This module renders filter collections as parameterized `WHERE` clauses for
//! the supported SQL backends (BigQuery, MySQL, PostgreSQL).

mod bigquery_dialect;
mod bindings;
mod compiler;
mod dialect;
mod mysql_dialect;
mod params;
mod postgres_dialect;

use std::str::FromStr;

pub use bigquery_dialect::BigqueryDialect;
pub use bindings::{ColumnBinding, ColumnBindings};
pub use compiler::ClauseCompiler;
pub use dialect::SqlDialect;
pub use mysql_dialect::MysqlDialect;
pub use params::{ParamValue, ParameterizedClause, QueryParam, SqlType};
pub use postgres_dialect::PostgresDialect;

/// SQL backend identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Bigquery,
    Mysql,
    Postgres,
}

impl Backend {
    /// Get the SQL dialect for this backend
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Backend::Bigquery => &BigqueryDialect,
            Backend::Mysql => &MysqlDialect,
            Backend::Postgres => &PostgresDialect,
        }
    }

    /// Get the backend name
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Bigquery => "bigquery",
            Backend::Mysql => "mysql",
            Backend::Postgres => "postgres",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bigquery" | "bq" => Ok(Backend::Bigquery),
            "mysql" => Ok(Backend::Mysql),
            "postgres" | "postgresql" | "pg" => Ok(Backend::Postgres),
            other => Err(format!(
                "unknown backend '{}' (expected bigquery, mysql or postgres)",
                other
            )),
        }
    }
}

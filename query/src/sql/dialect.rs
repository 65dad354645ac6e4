//! SQL dialect trait for multi-backend clause rendering
//!
//! Clause shapes are shared; a dialect only decides how identifiers are
//! quoted, how a parameter is referenced and how a set is bound.

/// SQL dialect trait for generating backend-specific clause fragments
///
/// Different backends differ in:
/// - Identifier quoting (backticks vs double quotes)
/// - Parameter placeholders (@name vs %s vs $1)
/// - Set binding (one array parameter vs one parameter per element)
pub trait SqlDialect: Send + Sync {
    /// Get the dialect name
    fn name(&self) -> &'static str;

    /// Quote a column identifier
    ///
    /// - BigQuery/MySQL: `` `col` ``
    /// - PostgreSQL: `"col"`
    fn quote_identifier(&self, ident: &str) -> String;

    /// Whether parameters are bound by name rather than position
    fn named_parameters(&self) -> bool;

    /// Generate a parameter placeholder
    ///
    /// `name` is the parameter name, `index` its 1-based position in the
    /// clause's parameter list.
    ///
    /// - BigQuery: `@name`
    /// - MySQL: `%s`
    /// - PostgreSQL: `$1`, `$2`, ...
    fn placeholder(&self, name: &str, index: usize) -> String;

    /// Whether a set is bound as a single array parameter
    fn binds_arrays(&self) -> bool {
        false
    }

    /// Right-hand side of `IN` for a single array parameter
    ///
    /// - BigQuery: `UNNEST(@col_list)`
    fn in_array(&self, placeholder: &str) -> String {
        format!("UNNEST({})", placeholder)
    }

    /// Right-hand side of `IN` for one placeholder per element
    fn in_list(&self, placeholders: &[String]) -> String {
        format!("({})", placeholders.join(", "))
    }
}

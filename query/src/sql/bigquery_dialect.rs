//! BigQuery SQL dialect implementation

use crate::utils::sql::quote_identifier;

use super::SqlDialect;

/// BigQuery (GoogleSQL) dialect: named parameters, arrays bound whole
pub struct BigqueryDialect;

impl SqlDialect for BigqueryDialect {
    fn name(&self) -> &'static str {
        "bigquery"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        quote_identifier(ident, '`')
    }

    fn named_parameters(&self) -> bool {
        true
    }

    fn placeholder(&self, name: &str, _index: usize) -> String {
        format!("@{}", name)
    }

    fn binds_arrays(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder() {
        let dialect = BigqueryDialect;
        assert_eq!(dialect.placeholder("session_id_list", 1), "@session_id_list");
    }

    #[test]
    fn test_in_array() {
        let dialect = BigqueryDialect;
        assert_eq!(dialect.in_array("@user_id_list"), "UNNEST(@user_id_list)");
    }

    #[test]
    fn test_quote_identifier() {
        let dialect = BigqueryDialect;
        assert_eq!(dialect.quote_identifier("session_id"), "`session_id`");
    }
}

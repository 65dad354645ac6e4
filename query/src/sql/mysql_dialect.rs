//! MySQL SQL dialect implementation

use crate::utils::sql::quote_identifier;

use super::SqlDialect;

/// MySQL dialect (format-style `%s` placeholders)
pub struct MysqlDialect;

impl SqlDialect for MysqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        quote_identifier(ident, '`')
    }

    fn named_parameters(&self) -> bool {
        false
    }

    fn placeholder(&self, _name: &str, _index: usize) -> String {
        "%s".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder() {
        let dialect = MysqlDialect;
        assert_eq!(dialect.placeholder("app_version_min", 3), "%s");
    }

    #[test]
    fn test_in_list() {
        let dialect = MysqlDialect;
        let phs = vec!["%s".to_string(), "%s".to_string()];
        assert_eq!(dialect.in_list(&phs), "(%s, %s)");
    }

    #[test]
    fn test_quote_identifier_escapes_backticks() {
        let dialect = MysqlDialect;
        assert_eq!(dialect.quote_identifier("odd`name"), "`odd``name`");
    }
}

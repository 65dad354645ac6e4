//! SQL utility functions

/// Quote an identifier with the given quote character, doubling any embedded
/// quote characters.
///
/// # Example
///
/// ```
/// use telemetry_query::utils::sql::quote_identifier;
///
/// assert_eq!(quote_identifier("session_id", '`'), "`session_id`");
/// assert_eq!(quote_identifier("we\"ird", '"'), "\"we\"\"ird\"");
/// ```
pub fn quote_identifier(ident: &str, quote: char) -> String {
    let mut out = String::with_capacity(ident.len() + 2);
    out.push(quote);
    for c in ident.chars() {
        if c == quote {
            out.push(quote);
        }
        out.push(c);
    }
    out.push(quote);
    out
}

/// Derive a parameter name stem from a column name.
///
/// Anything outside `[A-Za-z0-9_]` becomes `_`, and a leading digit gets a
/// `p_` prefix so the result is a valid named-parameter identifier.
pub fn param_stem(column: &str) -> String {
    let mut stem: String = column
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() || stem.starts_with(|c: char| c.is_ascii_digit()) {
        stem.insert_str(0, "p_");
    }
    stem
}

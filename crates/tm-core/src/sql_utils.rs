//! SQL quoting helpers for statements the engine builds itself
//! (head-table DDL, head writes, `DROP TABLE`).

/// Quote one identifier, doubling embedded double quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a possibly schema-qualified name part by part.
///
/// ```
/// use tm_core::sql_utils::quote_qualified;
/// assert_eq!(quote_qualified("meta.migrations"), r#""meta"."migrations""#);
/// ```
pub fn quote_qualified(name: &str) -> String {
    name.split('.')
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}

/// Split `schema.table` on the last dot; unqualified names live in `main`.
pub fn split_qualified_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) => (&name[..pos], &name[pos + 1..]),
        None => ("main", name),
    }
}

/// Render `value` as a single-quoted SQL string literal.
///
/// ```
/// use tm_core::sql_utils::string_literal;
/// assert_eq!(string_literal("it's.sql"), "'it''s.sql'");
/// ```
pub fn string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

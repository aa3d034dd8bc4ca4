//! Quoting utilities for SQL text.
//!
//! Values are always bound as parameters. The only things spliced into SQL
//! text are identifiers (which must already be `Identifier`s) and column
//! default literals, which PostgreSQL does not accept as parameters in DDL.

use super::Identifier;

/// Quote an identifier for use as a table or column name.
///
/// Embedded double quotes are doubled even though `Identifier` can never
/// contain one.
pub fn quote_ident(ident: &Identifier) -> String {
    let name = ident.as_str();
    let mut result = String::with_capacity(name.len() + 2);
    result.push('"');
    for c in name.chars() {
        if c == '"' {
            result.push('"');
        }
        result.push(c);
    }
    result.push('"');
    result
}

/// Quote a string as a single-quoted SQL literal, doubling embedded quotes.
pub fn quote_literal(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('\'');
    for c in s.chars() {
        if c == '\'' {
            result.push('\'');
        }
        result.push(c);
    }
    result.push('\'');
    result
}

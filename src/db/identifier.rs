//! Validated SQL identifiers.

use std::fmt;

use serde::Serialize;

/// PostgreSQL silently truncates identifiers longer than this (NAMEDATALEN - 1).
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// A collection, field or column name that matched `[A-Za-z_][A-Za-z0-9_]*`.
///
/// This is the only type the SQL renderers accept for table and column names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Validate a user-supplied name.
    ///
    /// Returns `None` for empty names, names starting with a digit, names
    /// containing anything other than ASCII letters, digits and underscores,
    /// and names longer than 63 bytes.
    pub fn parse(name: &str) -> Option<Self> {
        if is_valid_name(name) {
            Some(Self(name.to_string()))
        } else {
            None
        }
    }

    /// Wrap a name written in this crate's own source.
    ///
    /// Only for literals such as system table and column names.
    pub(crate) fn from_static(name: &'static str) -> Self {
        debug_assert!(is_valid_name(name), "invalid static identifier: {name}");
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if name.len() > MAX_IDENTIFIER_LEN {
        return false;
    }
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

//! Table layout for field results.

/// Field columns shown in lists, including the fields nested in
/// `collections get`.
pub(crate) const FIELD_COLUMNS: &[&str] = &[
    "collection",
    "field",
    "interface",
    "special",
    "required",
    "hidden",
    "sort",
];

//! Table layout for item results.

/// Items have no fixed shape; tables use the keys of the first item.
pub(super) const ITEM_COLUMNS: &[&str] = &[];

//! Table layouts for collection results.

use super::CollectionsAction;
use crate::commands::fields::FIELD_COLUMNS;

const COLLECTION_COLUMNS: &[&str] = &["collection", "icon", "hidden", "singleton", "sort", "note"];

pub(super) const SCHEMA_COLUMNS: &[&str] = &["name", "data_type", "max_length", "nullable", "default"];

/// Columns for list-shaped data in the action's response. `get` nests the
/// collection's fields, so it uses the field layout.
pub(super) fn columns(action: &CollectionsAction) -> &'static [&'static str] {
    match action {
        CollectionsAction::List { .. } => COLLECTION_COLUMNS,
        CollectionsAction::Get { .. } => FIELD_COLUMNS,
        CollectionsAction::Describe { .. } => SCHEMA_COLUMNS,
        CollectionsAction::Create { .. }
        | CollectionsAction::Update { .. }
        | CollectionsAction::Delete { .. } => FIELD_COLUMNS,
    }
}

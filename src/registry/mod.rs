//! Collection and field metadata registries.
//!
//! The registries own the `collections` and `fields` system tables and the
//! physical DDL that keeps collection tables in step with them. Every
//! operation that touches both metadata and physical schema runs inside one
//! transaction.

pub mod collections;
pub mod fields;

use chrono::{DateTime, Utc};
use serde::Serializer;

use crate::db::{format_timestamp, Executor, FieldValue, Identifier, Statement};
use crate::error::{db_failure, EngineResult};

pub use collections::{
    require_collection, Collection, CollectionPatch, CollectionRegistry, ColumnInfo,
    NewCollection, RESERVED_COLLECTIONS,
};
pub use fields::{Field, FieldPatch, FieldRegistry, NewField};

pub const INVALID_COLLECTION_NAME: &str =
    "Invalid collection name. Use only letters, numbers, and underscores";
pub const INVALID_FIELD_NAME: &str =
    "Invalid field name. Use only letters, numbers, and underscores";
pub const COLLECTION_NOT_FOUND: &str = "Collection not found";
pub const FIELD_NOT_FOUND: &str = "Field not found";
pub const NOTHING_TO_UPDATE: &str = "No fields to update";

/// Interfaces that render in the admin UI but store no data.
pub const VIRTUAL_INTERFACES: [&str; 5] = [
    "presentation-divider",
    "presentation-notice",
    "group-raw",
    "group-detail",
    "alias",
];

/// Whether a field with this interface has no physical column.
pub fn is_virtual(interface: Option<&str>) -> bool {
    interface.is_some_and(|i| VIRTUAL_INTERFACES.contains(&i))
}

pub(crate) fn col(name: &'static str) -> Identifier {
    Identifier::from_static(name)
}

pub(crate) fn collections_table() -> Identifier {
    col("collections")
}

pub(crate) fn fields_table() -> Identifier {
    col("fields")
}

/// Run a `COUNT(*)` statement.
pub(crate) fn count_rows(exec: &mut dyn Executor, stmt: &Statement) -> EngineResult<i64> {
    let result = exec.query(stmt).map_err(db_failure("Failed to count rows"))?;
    Ok(match result.scalar() {
        Some(FieldValue::Number(n)) => n.as_i64().unwrap_or_default(),
        _ => 0,
    })
}

pub(crate) fn serialize_timestamp<S: Serializer>(
    ts: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match ts {
        Some(ts) => serializer.serialize_str(&format_timestamp(ts)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::mock::MockStore;
    use crate::db::AutoCommit;
    use rstest::rstest;

    #[rstest]
    #[case(Some("alias"), true)]
    #[case(Some("presentation-divider"), true)]
    #[case(Some("group-detail"), true)]
    #[case(Some("input"), false)]
    #[case(None, false)]
    fn test_is_virtual(#[case] interface: Option<&str>, #[case] expected: bool) {
        assert_eq!(is_virtual(interface), expected);
    }

    #[rstest]
    fn test_count_rows_reads_scalar() {
        let store = MockStore::new();
        store.push_count(7);
        let count = count_rows(&mut AutoCommit(&store), &Statement::new("SELECT COUNT(*)")).unwrap();
        assert_eq!(count, 7);
    }

    #[rstest]
    fn test_count_rows_empty_result_is_zero() {
        let store = MockStore::new();
        let count = count_rows(&mut AutoCommit(&store), &Statement::new("SELECT COUNT(*)")).unwrap();
        assert_eq!(count, 0);
    }
}

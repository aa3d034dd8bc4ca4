//! System table bootstrap for PostgreSQL.
//!
//! Creates the `collections` and `fields` metadata tables and tracks a schema
//! version in `_schema_version`. Every statement is idempotent, so `setup`
//! can be run repeatedly.

use tracing::{debug, info};

use crate::db::{DatabaseValue, DbError, Executor, Statement};

/// Current version of the system tables.
pub const SCHEMA_VERSION: i64 = 1;

const VERSION_TABLE: &str = "_schema_version";

/// Tables created by `initialize_schema`, in creation order.
pub const SYSTEM_TABLES: [&str; 3] = [VERSION_TABLE, "collections", "fields"];

const CREATE_COLLECTIONS: &str = r#"CREATE TABLE IF NOT EXISTS collections (
    collection VARCHAR(64) PRIMARY KEY,
    icon VARCHAR(64),
    note TEXT,
    display_template VARCHAR(255),
    hidden BOOLEAN NOT NULL DEFAULT FALSE,
    singleton BOOLEAN NOT NULL DEFAULT FALSE,
    translations JSONB,
    archive_field VARCHAR(64),
    archive_app_filter BOOLEAN NOT NULL DEFAULT TRUE,
    archive_value VARCHAR(255),
    unarchive_value VARCHAR(255),
    sort_field VARCHAR(64),
    accountability VARCHAR(255) DEFAULT 'all',
    color VARCHAR(255),
    item_duplication_fields JSONB,
    sort INTEGER,
    "group" VARCHAR(64),
    collapse VARCHAR(255) NOT NULL DEFAULT 'open',
    preview_url VARCHAR(255),
    versioning BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)"#;

const CREATE_FIELDS: &str = r#"CREATE TABLE IF NOT EXISTS fields (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    collection VARCHAR(64) NOT NULL REFERENCES collections (collection) ON DELETE CASCADE,
    field VARCHAR(64) NOT NULL,
    special TEXT[] NOT NULL DEFAULT '{}',
    interface VARCHAR(64),
    options JSONB,
    display VARCHAR(64),
    display_options JSONB,
    readonly BOOLEAN NOT NULL DEFAULT FALSE,
    hidden BOOLEAN NOT NULL DEFAULT FALSE,
    sort INTEGER,
    width VARCHAR(30) DEFAULT 'full',
    translations JSONB,
    note TEXT,
    conditions JSONB,
    required BOOLEAN NOT NULL DEFAULT FALSE,
    "group" VARCHAR(64),
    validation JSONB,
    validation_message TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (collection, field)
)"#;

/// Initialize the system tables.
///
/// 1. Creates the version table and seeds it with version 0
/// 2. Creates the metadata tables if missing
/// 3. Records `SCHEMA_VERSION`
///
/// Returns the schema version after initialization.
pub fn initialize_schema(exec: &mut dyn Executor) -> Result<i64, DbError> {
    create_version_table(exec)?;
    let current = get_schema_version(exec)?;
    debug!(current, expected = SCHEMA_VERSION, "checked system schema version");

    exec.execute(&Statement::new(CREATE_COLLECTIONS))?;
    exec.execute(&Statement::new(CREATE_FIELDS))?;

    if current < SCHEMA_VERSION {
        set_schema_version(exec, SCHEMA_VERSION)?;
        info!(from = current, to = SCHEMA_VERSION, "system schema initialized");
    }
    Ok(SCHEMA_VERSION)
}

fn create_version_table(exec: &mut dyn Executor) -> Result<(), DbError> {
    exec.execute(&Statement::new(format!(
        "CREATE TABLE IF NOT EXISTS {} (
            id INTEGER PRIMARY KEY DEFAULT 1,
            version INTEGER NOT NULL,
            updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            CONSTRAINT single_row CHECK (id = 1)
        )",
        VERSION_TABLE
    )))?;
    exec.execute(&Statement::new(format!(
        "INSERT INTO {} (id, version) VALUES (1, 0) ON CONFLICT (id) DO NOTHING",
        VERSION_TABLE
    )))?;
    Ok(())
}

/// Current recorded version; 0 when nothing has been recorded.
pub fn get_schema_version(exec: &mut dyn Executor) -> Result<i64, DbError> {
    let result = exec.query(&Statement::new(format!(
        "SELECT version FROM {} WHERE id = 1",
        VERSION_TABLE
    )))?;
    Ok(result
        .scalar()
        .and_then(|v| v.as_i64())
        .unwrap_or(0))
}

fn set_schema_version(exec: &mut dyn Executor, version: i64) -> Result<(), DbError> {
    exec.execute(&Statement::with_params(
        format!(
            "UPDATE {} SET version = $1, updated_at = CURRENT_TIMESTAMP WHERE id = 1",
            VERSION_TABLE
        ),
        vec![version.into()],
    ))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::mock::MockStore;
    use crate::db::{AutoCommit, FieldValue};
    use rstest::rstest;

    #[rstest]
    fn test_fresh_database_records_version() {
        let store = MockStore::new();
        store.push_affected(0); // version table
        store.push_affected(1); // seed row
        store.push_rows(&["version"], vec![vec![FieldValue::from(0i64)]]);
        store.push_affected(0); // collections
        store.push_affected(0); // fields
        store.push_affected(1); // set version

        let version = initialize_schema(&mut AutoCommit(&store)).unwrap();
        assert_eq!(version, SCHEMA_VERSION);

        let statements = store.statements();
        assert_eq!(statements.len(), 6);
        assert!(statements[3].starts_with("CREATE TABLE IF NOT EXISTS collections"));
        assert!(statements[4].starts_with("CREATE TABLE IF NOT EXISTS fields"));
        assert!(statements[5].starts_with("UPDATE _schema_version SET version = $1"));
    }

    #[rstest]
    fn test_current_database_skips_version_update() {
        let store = MockStore::new();
        store.push_affected(0);
        store.push_affected(0);
        store.push_rows(&["version"], vec![vec![FieldValue::from(SCHEMA_VERSION)]]);
        store.push_affected(0);
        store.push_affected(0);

        initialize_schema(&mut AutoCommit(&store)).unwrap();
        assert_eq!(store.statements().len(), 5);
    }

    #[rstest]
    fn test_fields_reference_collections() {
        assert!(CREATE_FIELDS.contains("REFERENCES collections (collection)"));
        assert!(CREATE_FIELDS.contains("UNIQUE (collection, field)"));
    }
}

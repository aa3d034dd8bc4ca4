//! Collection metadata and the physical table behind each collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, info_span};

use super::fields::{insert_prepared, prepare, NewField, PreparedField};
use super::{
    col, collections_table, count_rows, fields_table, serialize_timestamp, COLLECTION_NOT_FOUND,
    INVALID_COLLECTION_NAME, NOTHING_TO_UPDATE,
};
use crate::db::{
    extract_bool, extract_json, extract_string, extract_string_or, extract_timestamp,
    in_transaction, rows_as_records, AutoCommit, DatabaseValue, Datastore, DbError, DeleteBuilder,
    Direction, Executor, FieldValue, Identifier, InsertBuilder, Record, SelectBuilder,
    UpdateBuilder,
};
use crate::error::{db_failure, EngineError, EngineResult};
use crate::pagination::{Page, Paged};
use crate::schema::{ddl, TableSchema};

/// Names of system tables; never creatable or deletable as collections.
pub const RESERVED_COLLECTIONS: [&str; 9] = [
    "users",
    "roles",
    "permissions",
    "collections",
    "fields",
    "sessions",
    "activity",
    "revisions",
    "settings",
];

const COLLECTION_EXISTS: &str = "Collection already exists";

fn is_reserved(name: &str) -> bool {
    RESERVED_COLLECTIONS.contains(&name)
}

/// One row of the `collections` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Collection {
    pub collection: String,
    pub icon: Option<String>,
    pub note: Option<String>,
    pub display_template: Option<String>,
    pub hidden: bool,
    pub singleton: bool,
    pub translations: Option<Value>,
    pub archive_field: Option<String>,
    pub archive_app_filter: bool,
    pub archive_value: Option<String>,
    pub unarchive_value: Option<String>,
    pub sort_field: Option<String>,
    pub accountability: Option<String>,
    pub color: Option<String>,
    pub item_duplication_fields: Option<Value>,
    pub sort: Option<i64>,
    pub group: Option<String>,
    pub collapse: String,
    pub preview_url: Option<String>,
    pub versioning: bool,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Collection {
    fn from_record(row: &Record) -> Self {
        Self {
            collection: extract_string_or(row.get("collection"), ""),
            icon: extract_string(row.get("icon")),
            note: extract_string(row.get("note")),
            display_template: extract_string(row.get("display_template")),
            hidden: extract_bool(row.get("hidden"), false),
            singleton: extract_bool(row.get("singleton"), false),
            translations: extract_json(row.get("translations")),
            archive_field: extract_string(row.get("archive_field")),
            archive_app_filter: extract_bool(row.get("archive_app_filter"), true),
            archive_value: extract_string(row.get("archive_value")),
            unarchive_value: extract_string(row.get("unarchive_value")),
            sort_field: extract_string(row.get("sort_field")),
            accountability: extract_string(row.get("accountability")),
            color: extract_string(row.get("color")),
            item_duplication_fields: extract_json(row.get("item_duplication_fields")),
            sort: row.get("sort").as_i64(),
            group: extract_string(row.get("group")),
            collapse: extract_string_or(row.get("collapse"), "open"),
            preview_url: extract_string(row.get("preview_url")),
            versioning: extract_bool(row.get("versioning"), false),
            created_at: extract_timestamp(row.get("created_at")),
            updated_at: extract_timestamp(row.get("updated_at")),
        }
    }
}

/// Payload for creating a collection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewCollection {
    pub collection: String,
    pub icon: Option<String>,
    pub note: Option<String>,
    pub display_template: Option<String>,
    pub hidden: Option<bool>,
    pub singleton: Option<bool>,
    pub translations: Option<Value>,
    pub archive_field: Option<String>,
    pub archive_app_filter: Option<bool>,
    pub archive_value: Option<String>,
    pub unarchive_value: Option<String>,
    pub sort_field: Option<String>,
    pub accountability: Option<String>,
    pub color: Option<String>,
    pub item_duplication_fields: Option<Value>,
    pub sort: Option<i64>,
    pub group: Option<String>,
    pub collapse: Option<String>,
    pub preview_url: Option<String>,
    pub versioning: Option<bool>,
    /// Fields created together with the collection.
    pub fields: Vec<NewField>,
}

impl NewCollection {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            ..Self::default()
        }
    }

    fn insert(&self, name: &Identifier) -> InsertBuilder {
        InsertBuilder::new(&collections_table())
            .value(col("collection"), name.as_str())
            .value(col("icon"), self.icon.clone())
            .value(col("note"), self.note.clone())
            .value(col("display_template"), self.display_template.clone())
            .value(col("hidden"), self.hidden.unwrap_or(false))
            .value(col("singleton"), self.singleton.unwrap_or(false))
            .value(col("translations"), FieldValue::json(self.translations.clone()))
            .value(col("archive_field"), self.archive_field.clone())
            .value(col("archive_app_filter"), self.archive_app_filter.unwrap_or(true))
            .value(col("archive_value"), self.archive_value.clone())
            .value(col("unarchive_value"), self.unarchive_value.clone())
            .value(col("sort_field"), self.sort_field.clone())
            .value(
                col("accountability"),
                self.accountability.clone().unwrap_or_else(|| "all".to_string()),
            )
            .value(col("color"), self.color.clone())
            .value(
                col("item_duplication_fields"),
                FieldValue::json(self.item_duplication_fields.clone()),
            )
            .value(col("sort"), self.sort)
            .value(col("group"), self.group.clone())
            .value(
                col("collapse"),
                self.collapse.clone().unwrap_or_else(|| "open".to_string()),
            )
            .value(col("preview_url"), self.preview_url.clone())
            .value(col("versioning"), self.versioning.unwrap_or(false))
    }
}

/// Partial update of collection metadata. Absent keys are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CollectionPatch {
    pub icon: Option<String>,
    pub note: Option<String>,
    pub display_template: Option<String>,
    pub hidden: Option<bool>,
    pub singleton: Option<bool>,
    pub translations: Option<Value>,
    pub archive_field: Option<String>,
    pub archive_app_filter: Option<bool>,
    pub archive_value: Option<String>,
    pub unarchive_value: Option<String>,
    pub sort_field: Option<String>,
    pub accountability: Option<String>,
    pub color: Option<String>,
    pub item_duplication_fields: Option<Value>,
    pub sort: Option<i64>,
    pub group: Option<String>,
    pub collapse: Option<String>,
    pub preview_url: Option<String>,
    pub versioning: Option<bool>,
}

impl CollectionPatch {
    fn assignments(&self) -> Vec<(Identifier, FieldValue)> {
        let mut set = Vec::new();
        let mut push = |name: &'static str, value: Option<FieldValue>| {
            if let Some(value) = value {
                set.push((col(name), value));
            }
        };
        push("icon", self.icon.as_ref().map(FieldValue::from));
        push("note", self.note.as_ref().map(FieldValue::from));
        push("display_template", self.display_template.as_ref().map(FieldValue::from));
        push("hidden", self.hidden.map(FieldValue::from));
        push("singleton", self.singleton.map(FieldValue::from));
        push("translations", self.translations.clone().map(FieldValue::Json));
        push("archive_field", self.archive_field.as_ref().map(FieldValue::from));
        push("archive_app_filter", self.archive_app_filter.map(FieldValue::from));
        push("archive_value", self.archive_value.as_ref().map(FieldValue::from));
        push("unarchive_value", self.unarchive_value.as_ref().map(FieldValue::from));
        push("sort_field", self.sort_field.as_ref().map(FieldValue::from));
        push("accountability", self.accountability.as_ref().map(FieldValue::from));
        push("color", self.color.as_ref().map(FieldValue::from));
        push(
            "item_duplication_fields",
            self.item_duplication_fields.clone().map(FieldValue::Json),
        );
        push("sort", self.sort.map(FieldValue::from));
        push("group", self.group.as_ref().map(FieldValue::from));
        push("collapse", self.collapse.as_ref().map(FieldValue::from));
        push("preview_url", self.preview_url.as_ref().map(FieldValue::from));
        push("versioning", self.versioning.map(FieldValue::from));
        set
    }
}

/// One live column of a collection table, as reported by the datastore.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub max_length: Option<i64>,
    pub nullable: bool,
    pub default: Option<String>,
}

/// Parse a collection name from a request path.
///
/// Anything that is not a valid identifier cannot name an existing
/// collection, so it is reported as not found.
fn lookup_name(name: &str) -> EngineResult<Identifier> {
    Identifier::parse(name).ok_or_else(|| EngineError::not_found(COLLECTION_NOT_FOUND))
}

fn fetch(exec: &mut dyn Executor, name: &Identifier) -> EngineResult<Option<Collection>> {
    let stmt = SelectBuilder::new(&collections_table())
        .filter(col("collection"), name.as_str())
        .build();
    let result = exec
        .query(&stmt)
        .map_err(db_failure("Database error while fetching collection"))?;
    Ok(rows_as_records(result).first().map(Collection::from_record))
}

fn exists(exec: &mut dyn Executor, name: &Identifier) -> EngineResult<bool> {
    let stmt = SelectBuilder::new(&collections_table())
        .columns(&[col("collection")])
        .filter(col("collection"), name.as_str())
        .build();
    let result = exec
        .query(&stmt)
        .map_err(db_failure("Database error while checking collection existence"))?;
    Ok(!result.is_empty())
}

/// Resolve a collection name that must already exist.
///
/// Used by the field registry and the item store before they touch a
/// collection's table.
pub fn require_collection(exec: &mut dyn Executor, name: &str) -> EngineResult<Identifier> {
    let ident = lookup_name(name)?;
    if exists(exec, &ident)? {
        Ok(ident)
    } else {
        Err(EngineError::not_found(COLLECTION_NOT_FOUND))
    }
}

fn table_conflict(source: DbError) -> EngineError {
    if source.is_duplicate_table() || source.sqlstate() == Some("23505") {
        EngineError::conflict(COLLECTION_EXISTS)
    } else {
        db_failure("Failed to create collection")(source)
    }
}

/// Reads and writes collection metadata.
pub struct CollectionRegistry<'a> {
    store: &'a dyn Datastore,
}

impl<'a> CollectionRegistry<'a> {
    pub fn new(store: &'a dyn Datastore) -> Self {
        Self { store }
    }

    /// Create the metadata row, the physical table and any inline fields in
    /// one transaction.
    ///
    /// The table starts with only the system columns; inline fields with a
    /// `schema` add theirs in the same transaction.
    ///
    /// # Errors
    /// - `Validation` for a malformed or reserved name, or an invalid inline
    ///   field
    /// - `Conflict` if the collection (or its table) already exists, or an
    ///   inline field is listed twice
    /// - `Constraint` / `Internal` when any statement fails; nothing is kept
    pub fn create(&self, new: NewCollection) -> EngineResult<Collection> {
        let _span = info_span!("create_collection", collection = %new.collection).entered();
        let name = Identifier::parse(&new.collection)
            .ok_or_else(|| EngineError::validation(INVALID_COLLECTION_NAME))?;
        if is_reserved(name.as_str()) {
            return Err(EngineError::validation("Collection name is reserved"));
        }

        let mut prepared: Vec<PreparedField> = Vec::with_capacity(new.fields.len());
        for field in &new.fields {
            let field = prepare(field.clone())?;
            if prepared.iter().any(|p| p.name == field.name) {
                return Err(EngineError::conflict("Field already exists"));
            }
            prepared.push(field);
        }

        if exists(&mut AutoCommit(self.store), &name)? {
            return Err(EngineError::conflict(COLLECTION_EXISTS));
        }

        let metadata = new.insert(&name).build();
        let table = TableSchema::with_system_columns(name.clone());
        in_transaction(self.store, |tx| {
            tx.execute(&metadata).map_err(table_conflict)?;
            tx.execute(&ddl::create_table(&table)).map_err(table_conflict)?;
            for field in &prepared {
                insert_prepared(tx, &name, field)?;
            }
            Ok(())
        })?;

        info!(
            collection = %name,
            fields = prepared.len(),
            "collection created"
        );
        self.fetch_existing(&name)
    }

    pub fn get(&self, name: &str) -> EngineResult<Collection> {
        let _span = info_span!("get_collection", collection = %name).entered();
        let name = lookup_name(name)?;
        self.fetch_existing(&name)
    }

    /// Collections ordered by `sort`, then name.
    pub fn list(&self, page: Page) -> EngineResult<Paged<Collection>> {
        let _span =
            info_span!("list_collections", page = page.page(), limit = page.limit()).entered();
        let mut exec = AutoCommit(self.store);
        let select = SelectBuilder::new(&collections_table())
            .order_by(col("sort"), Direction::Asc)
            .order_by(col("collection"), Direction::Asc);
        let total = count_rows(&mut exec, &select.clone().build_count())?;
        let result = exec
            .query(&select.limit(page.limit()).offset(page.offset()).build())
            .map_err(db_failure("Database error while fetching collections"))?;
        let items = rows_as_records(result)
            .iter()
            .map(Collection::from_record)
            .collect();
        Ok(Paged {
            items,
            meta: page.meta(total),
        })
    }

    /// Patch the supplied metadata keys and touch `updated_at`.
    pub fn update(&self, name: &str, patch: CollectionPatch) -> EngineResult<Collection> {
        let _span = info_span!("update_collection", collection = %name).entered();
        let name = lookup_name(name)?;
        if !exists(&mut AutoCommit(self.store), &name)? {
            return Err(EngineError::not_found(COLLECTION_NOT_FOUND));
        }
        let assignments = patch.assignments();
        if assignments.is_empty() {
            return Err(EngineError::validation(NOTHING_TO_UPDATE));
        }

        let stmt = UpdateBuilder::new(&collections_table())
            .set_all(assignments)
            .touch(col("updated_at"))
            .filter(col("collection"), name.as_str())
            .build();
        self.store
            .execute(&stmt)
            .map_err(db_failure("Database error while updating collection"))?;

        info!(collection = %name, "collection updated");
        self.fetch_existing(&name)
    }

    /// Remove field metadata, the collection row and the physical table
    /// together.
    pub fn delete(&self, name: &str) -> EngineResult<()> {
        let _span = info_span!("delete_collection", collection = %name).entered();
        if is_reserved(name) {
            return Err(EngineError::validation("Cannot delete system collection"));
        }
        let name = lookup_name(name)?;
        if !exists(&mut AutoCommit(self.store), &name)? {
            return Err(EngineError::not_found(COLLECTION_NOT_FOUND));
        }

        let delete_fields = DeleteBuilder::new(&fields_table())
            .filter(col("collection"), name.as_str())
            .build();
        let delete_collection = DeleteBuilder::new(&collections_table())
            .filter(col("collection"), name.as_str())
            .build();
        in_transaction(self.store, |tx| {
            tx.execute(&delete_fields)
                .map_err(db_failure("Database error while deleting fields"))?;
            tx.execute(&delete_collection)
                .map_err(db_failure("Database error while deleting collection"))?;
            tx.execute(&ddl::drop_table(&name))
                .map_err(db_failure("Failed to drop collection table"))?;
            Ok(())
        })?;

        info!(collection = %name, "collection deleted");
        Ok(())
    }

    /// Live column list of the collection's table.
    pub fn describe(&self, name: &str) -> EngineResult<Vec<ColumnInfo>> {
        let _span = info_span!("describe_collection", collection = %name).entered();
        let mut exec = AutoCommit(self.store);
        let name = require_collection(&mut exec, name)?;
        let result = exec
            .query(&ddl::describe_columns(&name))
            .map_err(db_failure("Database error while describing collection"))?;
        Ok(rows_as_records(result)
            .iter()
            .map(|row| ColumnInfo {
                name: extract_string_or(row.get("column_name"), ""),
                data_type: extract_string_or(row.get("data_type"), ""),
                max_length: row.get("character_maximum_length").as_i64(),
                nullable: extract_string_or(row.get("is_nullable"), "YES") == "YES",
                default: extract_string(row.get("column_default")),
            })
            .collect())
    }

    fn fetch_existing(&self, name: &Identifier) -> EngineResult<Collection> {
        fetch(&mut AutoCommit(self.store), name)?
            .ok_or_else(|| EngineError::not_found(COLLECTION_NOT_FOUND))
    }
}

//! Field metadata and the physical columns behind non-virtual fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, info_span};

use super::collections::require_collection;
use super::{
    col, count_rows, fields_table, is_virtual, serialize_timestamp, FIELD_NOT_FOUND,
    INVALID_FIELD_NAME, NOTHING_TO_UPDATE,
};
use crate::db::{
    extract_bool, extract_json, extract_string, extract_string_or, extract_string_vec,
    extract_timestamp, in_transaction, rows_as_records, AutoCommit, DatabaseValue, Datastore,
    DbError, DeleteBuilder, Direction, Executor, FieldValue, Identifier, InsertBuilder, Record,
    SelectBuilder, Statement, UpdateBuilder,
};
use crate::error::{db_failure, EngineError, EngineResult};
use crate::pagination::{Page, Paged};
use crate::schema::{ddl, format_default_value, is_system_column, ColumnDescriptor, ColumnSpec};

/// One row of the `fields` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub id: String,
    pub collection: String,
    pub field: String,
    pub special: Vec<String>,
    pub interface: Option<String>,
    pub options: Option<Value>,
    pub display: Option<String>,
    pub display_options: Option<Value>,
    pub readonly: bool,
    pub hidden: bool,
    pub sort: Option<i64>,
    pub width: String,
    pub translations: Option<Value>,
    pub note: Option<String>,
    pub conditions: Option<Value>,
    pub required: bool,
    pub group: Option<String>,
    pub validation: Option<Value>,
    pub validation_message: Option<String>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Field {
    fn from_record(row: &Record) -> Self {
        Self {
            id: extract_string_or(row.get("id"), ""),
            collection: extract_string_or(row.get("collection"), ""),
            field: extract_string_or(row.get("field"), ""),
            special: extract_string_vec(row.get("special")),
            interface: extract_string(row.get("interface")),
            options: extract_json(row.get("options")),
            display: extract_string(row.get("display")),
            display_options: extract_json(row.get("display_options")),
            readonly: extract_bool(row.get("readonly"), false),
            hidden: extract_bool(row.get("hidden"), false),
            sort: row.get("sort").as_i64(),
            width: extract_string_or(row.get("width"), "full"),
            translations: extract_json(row.get("translations")),
            note: extract_string(row.get("note")),
            conditions: extract_json(row.get("conditions")),
            required: extract_bool(row.get("required"), false),
            group: extract_string(row.get("group")),
            validation: extract_json(row.get("validation")),
            validation_message: extract_string(row.get("validation_message")),
            created_at: extract_timestamp(row.get("created_at")),
            updated_at: extract_timestamp(row.get("updated_at")),
        }
    }
}

fn special_value(special: &[String]) -> FieldValue {
    FieldValue::Json(Value::Array(
        special.iter().cloned().map(Value::String).collect(),
    ))
}

/// Payload for creating a field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewField {
    pub field: String,
    pub special: Option<Vec<String>>,
    pub interface: Option<String>,
    pub options: Option<Value>,
    pub display: Option<String>,
    pub display_options: Option<Value>,
    pub readonly: Option<bool>,
    pub hidden: Option<bool>,
    pub sort: Option<i64>,
    pub width: Option<String>,
    pub translations: Option<Value>,
    pub note: Option<String>,
    pub conditions: Option<Value>,
    pub required: Option<bool>,
    pub group: Option<String>,
    pub validation: Option<Value>,
    pub validation_message: Option<String>,
    /// Column options; without them only metadata is stored.
    pub schema: Option<ColumnSpec>,
}

impl NewField {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            field: name.into(),
            ..Self::default()
        }
    }
}

/// Partial update of field metadata plus optional column changes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FieldPatch {
    pub special: Option<Vec<String>>,
    pub interface: Option<String>,
    pub options: Option<Value>,
    pub display: Option<String>,
    pub display_options: Option<Value>,
    pub readonly: Option<bool>,
    pub hidden: Option<bool>,
    pub sort: Option<i64>,
    pub width: Option<String>,
    pub translations: Option<Value>,
    pub note: Option<String>,
    pub conditions: Option<Value>,
    pub required: Option<bool>,
    pub group: Option<String>,
    pub validation: Option<Value>,
    pub validation_message: Option<String>,
    pub schema: Option<ColumnSpec>,
}

impl FieldPatch {
    fn assignments(&self) -> Vec<(Identifier, FieldValue)> {
        let mut set = Vec::new();
        let mut push = |name: &'static str, value: Option<FieldValue>| {
            if let Some(value) = value {
                set.push((col(name), value));
            }
        };
        push("special", self.special.as_deref().map(special_value));
        push("interface", self.interface.as_ref().map(FieldValue::from));
        push("options", self.options.clone().map(FieldValue::Json));
        push("display", self.display.as_ref().map(FieldValue::from));
        push("display_options", self.display_options.clone().map(FieldValue::Json));
        push("readonly", self.readonly.map(FieldValue::from));
        push("hidden", self.hidden.map(FieldValue::from));
        push("sort", self.sort.map(FieldValue::from));
        push("width", self.width.as_ref().map(FieldValue::from));
        push("translations", self.translations.clone().map(FieldValue::Json));
        push("note", self.note.as_ref().map(FieldValue::from));
        push("conditions", self.conditions.clone().map(FieldValue::Json));
        push("required", self.required.map(FieldValue::from));
        push("group", self.group.as_ref().map(FieldValue::from));
        push("validation", self.validation.clone().map(FieldValue::Json));
        push(
            "validation_message",
            self.validation_message.as_ref().map(FieldValue::from),
        );
        set
    }
}

/// A field payload whose name and column options have been validated.
#[derive(Debug, Clone)]
pub(crate) struct PreparedField {
    pub(crate) name: Identifier,
    new: NewField,
    /// `None` for virtual fields and fields without column options.
    column: Option<ColumnDescriptor>,
}

/// Validate a field payload before any statement runs.
pub(crate) fn prepare(new: NewField) -> EngineResult<PreparedField> {
    let name =
        Identifier::parse(&new.field).ok_or_else(|| EngineError::validation(INVALID_FIELD_NAME))?;
    if is_system_column(name.as_str()) {
        return Err(EngineError::validation("Cannot create system field"));
    }
    let column = match &new.schema {
        Some(spec) if !is_virtual(new.interface.as_deref()) => {
            Some(ColumnDescriptor::from_spec(name.clone(), spec)?)
        }
        _ => None,
    };
    Ok(PreparedField { name, new, column })
}

fn field_conflict(source: DbError) -> EngineError {
    if source.sqlstate() == Some("23505") {
        EngineError::conflict("Field already exists")
    } else {
        db_failure("Database error while creating field")(source)
    }
}

/// Insert the metadata row and, when the field has one, its column.
pub(crate) fn insert_prepared(
    exec: &mut dyn Executor,
    collection: &Identifier,
    field: &PreparedField,
) -> EngineResult<()> {
    let new = &field.new;
    let metadata = InsertBuilder::new(&fields_table())
        .value(col("collection"), collection.as_str())
        .value(col("field"), field.name.as_str())
        .value(col("special"), special_value(new.special.as_deref().unwrap_or_default()))
        .value(col("interface"), new.interface.clone())
        .value(col("options"), FieldValue::json(new.options.clone()))
        .value(col("display"), new.display.clone())
        .value(col("display_options"), FieldValue::json(new.display_options.clone()))
        .value(col("readonly"), new.readonly.unwrap_or(false))
        .value(col("hidden"), new.hidden.unwrap_or(false))
        .value(col("sort"), new.sort)
        .value(col("width"), new.width.clone().unwrap_or_else(|| "full".to_string()))
        .value(col("translations"), FieldValue::json(new.translations.clone()))
        .value(col("note"), new.note.clone())
        .value(col("conditions"), FieldValue::json(new.conditions.clone()))
        .value(col("required"), new.required.unwrap_or(false))
        .value(col("group"), new.group.clone())
        .value(col("validation"), FieldValue::json(new.validation.clone()))
        .value(col("validation_message"), new.validation_message.clone())
        .build();
    exec.execute(&metadata).map_err(field_conflict)?;

    if let Some(column) = &field.column {
        for stmt in ddl::add_column(collection, column) {
            exec.execute(&stmt)
                .map_err(db_failure("Failed to create database column"))?;
        }
    }
    Ok(())
}

/// `ALTER COLUMN` statements for a column options change, in the order
/// type, nullability, default.
fn alter_statements(
    table: &Identifier,
    column: &Identifier,
    spec: &ColumnSpec,
) -> EngineResult<Vec<Statement>> {
    let mut statements = Vec::new();
    if !spec.data_type.trim().is_empty() {
        statements.push(ddl::alter_column_type(table, column, spec.column_type()));
    }
    if let Some(nullable) = spec.is_nullable {
        statements.push(ddl::set_nullable(table, column, nullable));
    }
    if let Some(default) = &spec.default_value {
        statements.push(ddl::set_default(table, column, &format_default_value(default)?));
    }
    Ok(statements)
}

fn field_filter(select: SelectBuilder, collection: &Identifier, field: &str) -> SelectBuilder {
    select
        .filter(col("collection"), collection.as_str())
        .filter(col("field"), field)
}

fn fetch(
    exec: &mut dyn Executor,
    collection: &Identifier,
    field: &str,
) -> EngineResult<Option<Field>> {
    let stmt = field_filter(SelectBuilder::new(&fields_table()), collection, field).build();
    let result = exec
        .query(&stmt)
        .map_err(db_failure("Database error while fetching field"))?;
    Ok(rows_as_records(result).first().map(Field::from_record))
}

/// Fields marked `required` for a collection.
pub(crate) fn required_fields(
    exec: &mut dyn Executor,
    collection: &Identifier,
) -> EngineResult<Vec<String>> {
    let stmt = SelectBuilder::new(&fields_table())
        .columns(&[col("field")])
        .filter(col("collection"), collection.as_str())
        .filter(col("required"), true)
        .order_by(col("sort"), Direction::Asc)
        .order_by(col("field"), Direction::Asc)
        .build();
    let result = exec
        .query(&stmt)
        .map_err(db_failure("Database error while fetching required fields"))?;
    Ok(rows_as_records(result)
        .iter()
        .filter_map(|row| extract_string(row.get("field")))
        .collect())
}

/// Reads and writes field metadata.
pub struct FieldRegistry<'a> {
    store: &'a dyn Datastore,
}

impl<'a> FieldRegistry<'a> {
    pub fn new(store: &'a dyn Datastore) -> Self {
        Self { store }
    }

    /// Store the field and add its column in one transaction.
    pub fn create(&self, collection: &str, new: NewField) -> EngineResult<Field> {
        let _span =
            info_span!("create_field", collection = %collection, field = %new.field).entered();
        let mut exec = AutoCommit(self.store);
        let collection = require_collection(&mut exec, collection)?;
        let field = prepare(new)?;
        if fetch(&mut exec, &collection, field.name.as_str())?.is_some() {
            return Err(EngineError::conflict("Field already exists"));
        }

        in_transaction(self.store, |tx| insert_prepared(tx, &collection, &field))?;

        info!(
            collection = %collection,
            field = %field.name,
            column = field.column.is_some(),
            "field created"
        );
        self.fetch_existing(&collection, field.name.as_str())
    }

    pub fn get(&self, collection: &str, field: &str) -> EngineResult<Field> {
        let _span = info_span!("get_field", collection = %collection, field = %field).entered();
        let mut exec = AutoCommit(self.store);
        let collection = require_collection(&mut exec, collection)?;
        self.fetch_existing(&collection, field)
    }

    /// All fields, optionally restricted to one collection, ordered by
    /// collection, sort and name.
    pub fn list(&self, collection: Option<&str>, page: Page) -> EngineResult<Paged<Field>> {
        let _span =
            info_span!("list_fields", collection = ?collection, page = page.page()).entered();
        let mut exec = AutoCommit(self.store);
        let mut select = SelectBuilder::new(&fields_table());
        if let Some(collection) = collection {
            select = select.filter(col("collection"), collection);
        }
        let select = select
            .order_by(col("collection"), Direction::Asc)
            .order_by(col("sort"), Direction::Asc)
            .order_by(col("field"), Direction::Asc);
        let total = count_rows(&mut exec, &select.clone().build_count())?;
        let result = exec
            .query(&select.limit(page.limit()).offset(page.offset()).build())
            .map_err(db_failure("Database error while fetching fields"))?;
        let items = rows_as_records(result).iter().map(Field::from_record).collect();
        Ok(Paged {
            items,
            meta: page.meta(total),
        })
    }

    /// Every field of one collection, ordered by sort and name.
    pub fn list_for_collection(&self, collection: &str) -> EngineResult<Vec<Field>> {
        let _span = info_span!("list_collection_fields", collection = %collection).entered();
        let mut exec = AutoCommit(self.store);
        let collection = require_collection(&mut exec, collection)?;
        let stmt = SelectBuilder::new(&fields_table())
            .filter(col("collection"), collection.as_str())
            .order_by(col("sort"), Direction::Asc)
            .order_by(col("field"), Direction::Asc)
            .build();
        let result = exec
            .query(&stmt)
            .map_err(db_failure("Database error while fetching fields"))?;
        Ok(rows_as_records(result).iter().map(Field::from_record).collect())
    }

    /// Patch metadata and alter the column in one transaction.
    ///
    /// Type changes are issued without a `USING` clause; a change the
    /// datastore cannot cast fails as a constraint error and nothing is
    /// applied. Moving a virtual field to a storing interface adds its
    /// column.
    pub fn update(&self, collection: &str, field: &str, patch: FieldPatch) -> EngineResult<Field> {
        let _span = info_span!("update_field", collection = %collection, field = %field).entered();
        let mut exec = AutoCommit(self.store);
        let collection = require_collection(&mut exec, collection)?;
        let existing = fetch(&mut exec, &collection, field)?
            .ok_or_else(|| EngineError::not_found(FIELD_NOT_FOUND))?;
        let name = Identifier::parse(&existing.field)
            .ok_or_else(|| EngineError::not_found(FIELD_NOT_FOUND))?;

        let assignments = patch.assignments();
        if assignments.is_empty() && patch.schema.is_none() {
            return Err(EngineError::validation(NOTHING_TO_UPDATE));
        }

        // A field that was virtual has no column yet, so it gets one instead
        // of an ALTER.
        let interface = patch.interface.as_deref().or(existing.interface.as_deref());
        let alters = match &patch.schema {
            Some(_) if is_virtual(interface) => Vec::new(),
            Some(spec) if is_virtual(existing.interface.as_deref()) => {
                ddl::add_column(&collection, &ColumnDescriptor::from_spec(name.clone(), spec)?)
            }
            Some(spec) => alter_statements(&collection, &name, spec)?,
            None => Vec::new(),
        };
        let metadata = (!assignments.is_empty()).then(|| {
            field_filter_update(
                UpdateBuilder::new(&fields_table())
                    .set_all(assignments)
                    .touch(col("updated_at")),
                &collection,
                &name,
            )
            .build()
        });

        in_transaction(self.store, |tx| {
            if let Some(stmt) = &metadata {
                tx.execute(stmt)
                    .map_err(db_failure("Database error while updating field"))?;
            }
            for stmt in &alters {
                tx.execute(stmt)
                    .map_err(db_failure("Failed to alter database column"))?;
            }
            Ok(())
        })?;

        info!(
            collection = %collection,
            field = %name,
            altered = !alters.is_empty(),
            "field updated"
        );
        self.fetch_existing(&collection, name.as_str())
    }

    /// Remove the metadata row and drop the column unless the field is
    /// virtual.
    pub fn delete(&self, collection: &str, field: &str) -> EngineResult<()> {
        let _span = info_span!("delete_field", collection = %collection, field = %field).entered();
        if is_system_column(field) {
            return Err(EngineError::validation("Cannot delete system field"));
        }
        let mut exec = AutoCommit(self.store);
        let collection = require_collection(&mut exec, collection)?;
        let existing = fetch(&mut exec, &collection, field)?
            .ok_or_else(|| EngineError::not_found(FIELD_NOT_FOUND))?;
        let name = Identifier::parse(&existing.field)
            .ok_or_else(|| EngineError::not_found(FIELD_NOT_FOUND))?;

        let metadata = DeleteBuilder::new(&fields_table())
            .filter(col("collection"), collection.as_str())
            .filter(col("field"), name.as_str())
            .build();
        let drop = (!is_virtual(existing.interface.as_deref()))
            .then(|| ddl::drop_column(&collection, &name));

        in_transaction(self.store, |tx| {
            tx.execute(&metadata)
                .map_err(db_failure("Database error while deleting field"))?;
            if let Some(stmt) = &drop {
                tx.execute(stmt)
                    .map_err(db_failure("Failed to drop database column"))?;
            }
            Ok(())
        })?;

        info!(collection = %collection, field = %name, "field deleted");
        Ok(())
    }

    fn fetch_existing(&self, collection: &Identifier, field: &str) -> EngineResult<Field> {
        fetch(&mut AutoCommit(self.store), collection, field)?
            .ok_or_else(|| EngineError::not_found(FIELD_NOT_FOUND))
    }
}

fn field_filter_update(
    update: UpdateBuilder,
    collection: &Identifier,
    field: &Identifier,
) -> UpdateBuilder {
    update
        .filter(col("collection"), collection.as_str())
        .filter(col("field"), field.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::mock::{sql_error, MockStore};
    use crate::test_utils::capture_logs;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn store() -> MockStore {
        MockStore::new()
    }

    fn push_collection_exists(store: &MockStore) {
        store.push_rows(&["collection"], vec![vec!["posts".into()]]);
    }

    fn push_field(store: &MockStore, name: &str, interface: Option<&str>) {
        store.push_rows(
            &[
                "id",
                "collection",
                "field",
                "special",
                "interface",
                "readonly",
                "hidden",
                "width",
                "required",
                "options",
            ],
            vec![vec![
                "5d0c1a54-9c2f-4a3e-bb3d-0b1f3f7d2a10".into(),
                "posts".into(),
                name.into(),
                FieldValue::Json(json!(["cast-json"])),
                FieldValue::from(interface),
                false.into(),
                false.into(),
                "full".into(),
                true.into(),
                FieldValue::Json(json!({"placeholder": "Title"})),
            ]],
        );
    }

    fn string_schema() -> ColumnSpec {
        ColumnSpec {
            data_type: "string".to_string(),
            ..ColumnSpec::default()
        }
    }

    #[rstest]
    fn test_create_adds_metadata_and_column(store: MockStore) {
        push_collection_exists(&store);
        store.push_empty();
        store.push_affected(1);
        store.push_affected(0);
        push_field(&store, "title", None);

        let new = NewField {
            required: Some(true),
            schema: Some(string_schema()),
            ..NewField::named("title")
        };
        let field = FieldRegistry::new(&store).create("posts", new).unwrap();
        assert_eq!(field.field, "title");
        assert_eq!(field.special, vec!["cast-json".to_string()]);

        let sql = store.statements();
        assert_eq!(
            sql[2..],
            [
                "BEGIN".to_string(),
                sql[3].clone(),
                r#"ALTER TABLE "posts" ADD COLUMN "title" VARCHAR(255)"#.to_string(),
                "COMMIT".to_string(),
                sql[6].clone(),
            ]
        );
        assert!(sql[3].starts_with(r#"INSERT INTO "fields""#));
    }

    #[rstest]
    fn test_create_binds_defaults(store: MockStore) {
        push_collection_exists(&store);
        let _ = FieldRegistry::new(&store).create("posts", NewField::named("title"));

        let insert = store.find(r#"INSERT INTO "fields""#).unwrap();
        assert_eq!(insert.params[0], FieldValue::from("posts"));
        assert_eq!(insert.params[1], FieldValue::from("title"));
        assert_eq!(insert.params[2], FieldValue::Json(json!([])));
        assert!(insert.params.contains(&FieldValue::from("full")));
        assert!(!store.statements().iter().any(|s| s.contains("ADD COLUMN")));
    }

    #[rstest]
    fn test_create_virtual_field_has_no_column(store: MockStore) {
        push_collection_exists(&store);
        let new = NewField {
            interface: Some("alias".to_string()),
            schema: Some(string_schema()),
            ..NewField::named("related")
        };
        let _ = FieldRegistry::new(&store).create("posts", new);
        assert!(!store.statements().iter().any(|s| s.starts_with("ALTER TABLE")));
    }

    #[rstest]
    fn test_create_unknown_type_falls_back_to_text(store: MockStore) {
        push_collection_exists(&store);
        let new = NewField {
            schema: Some(ColumnSpec {
                data_type: "unknown_type".to_string(),
                ..ColumnSpec::default()
            }),
            ..NewField::named("body")
        };
        let _ = FieldRegistry::new(&store).create("posts", new);
        assert!(store
            .find(r#"ALTER TABLE "posts" ADD COLUMN "body" TEXT"#)
            .is_some());
    }

    #[rstest]
    fn test_create_in_missing_collection(store: MockStore) {
        store.push_empty();
        let err = FieldRegistry::new(&store)
            .create("posts", NewField::named("title"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Collection not found");
    }

    #[rstest]
    #[case("")]
    #[case("2fast")]
    #[case("has space")]
    #[case("semi;colon")]
    fn test_create_rejects_bad_names(store: MockStore, #[case] name: &str) {
        push_collection_exists(&store);
        let err = FieldRegistry::new(&store)
            .create("posts", NewField::named(name))
            .unwrap_err();
        assert_eq!(err.to_string(), INVALID_FIELD_NAME);
    }

    #[rstest]
    #[case("id")]
    #[case("created_at")]
    #[case("updated_at")]
    fn test_create_rejects_system_columns(store: MockStore, #[case] name: &str) {
        push_collection_exists(&store);
        let err = FieldRegistry::new(&store)
            .create("posts", NewField::named(name))
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[rstest]
    fn test_create_duplicate_is_conflict(store: MockStore) {
        push_collection_exists(&store);
        push_field(&store, "title", None);
        let err = FieldRegistry::new(&store)
            .create("posts", NewField::named("title"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Field already exists");
    }

    #[rstest]
    fn test_create_column_failure_rolls_back(store: MockStore) {
        push_collection_exists(&store);
        store.push_empty();
        store.push_affected(1);
        store.push_error(sql_error("23502"));
        let new = NewField {
            schema: Some(ColumnSpec {
                is_nullable: Some(false),
                ..string_schema()
            }),
            ..NewField::named("title")
        };
        let err = FieldRegistry::new(&store).create("posts", new).unwrap_err();
        assert_eq!(err.to_string(), "Failed to create database column");
        assert!(matches!(err, EngineError::Constraint { .. }));
        assert_eq!(store.statements().last().unwrap(), "ROLLBACK");
    }

    #[rstest]
    fn test_list_filters_and_orders(store: MockStore) {
        store.push_count(1);
        push_field(&store, "title", None);
        let page = FieldRegistry::new(&store)
            .list(Some("posts"), Page::default())
            .unwrap();
        assert_eq!(page.meta.total, 1);
        assert_eq!(page.items[0].options, Some(json!({"placeholder": "Title"})));

        let executed = store.executed();
        assert_eq!(
            executed[0].sql,
            r#"SELECT COUNT(*) FROM "fields" WHERE "collection" = $1"#
        );
        assert_eq!(
            executed[1].sql,
            r#"SELECT * FROM "fields" WHERE "collection" = $1 ORDER BY "collection" ASC, "sort" ASC, "field" ASC LIMIT $2 OFFSET $3"#
        );
    }

    #[rstest]
    fn test_list_for_collection(store: MockStore) {
        push_collection_exists(&store);
        push_field(&store, "title", None);
        let fields = FieldRegistry::new(&store).list_for_collection("posts").unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(
            store.statements()[1],
            r#"SELECT * FROM "fields" WHERE "collection" = $1 ORDER BY "sort" ASC, "field" ASC"#
        );
    }

    #[rstest]
    fn test_get_missing_field(store: MockStore) {
        push_collection_exists(&store);
        store.push_empty();
        let err = FieldRegistry::new(&store).get("posts", "nope").unwrap_err();
        assert_eq!(err.to_string(), FIELD_NOT_FOUND);
    }

    #[rstest]
    fn test_update_alters_in_order(store: MockStore) {
        push_collection_exists(&store);
        push_field(&store, "views", None);
        let patch = FieldPatch {
            note: Some("Page views".to_string()),
            schema: Some(ColumnSpec {
                data_type: "bigint".to_string(),
                is_nullable: Some(false),
                default_value: Some(json!(0)),
                ..ColumnSpec::default()
            }),
            ..FieldPatch::default()
        };
        let _ = FieldRegistry::new(&store).update("posts", "views", patch);

        let sql = store.statements();
        let begin = sql.iter().position(|s| s == "BEGIN").unwrap();
        assert_eq!(
            sql[begin + 1],
            r#"UPDATE "fields" SET "note" = $1, "updated_at" = CURRENT_TIMESTAMP WHERE "collection" = $2 AND "field" = $3"#
        );
        assert_eq!(
            sql[begin + 2..begin + 6],
            [
                r#"ALTER TABLE "posts" ALTER COLUMN "views" TYPE BIGINT"#.to_string(),
                r#"ALTER TABLE "posts" ALTER COLUMN "views" SET NOT NULL"#.to_string(),
                r#"ALTER TABLE "posts" ALTER COLUMN "views" SET DEFAULT 0"#.to_string(),
                "COMMIT".to_string(),
            ]
        );
    }

    #[rstest]
    fn test_update_schema_only(store: MockStore) {
        push_collection_exists(&store);
        push_field(&store, "views", None);
        let patch = FieldPatch {
            schema: Some(ColumnSpec {
                is_nullable: Some(true),
                ..ColumnSpec::default()
            }),
            ..FieldPatch::default()
        };
        let _ = FieldRegistry::new(&store).update("posts", "views", patch);
        let sql = store.statements();
        assert!(!sql.iter().any(|s| s.starts_with("UPDATE")));
        assert!(sql.contains(&r#"ALTER TABLE "posts" ALTER COLUMN "views" DROP NOT NULL"#.to_string()));
    }

    #[rstest]
    fn test_update_bad_cast_is_constraint_and_rolls_back(store: MockStore) {
        push_collection_exists(&store);
        push_field(&store, "title", None);
        store.push_error(sql_error("42804"));
        let patch = FieldPatch {
            schema: Some(ColumnSpec {
                data_type: "integer".to_string(),
                ..ColumnSpec::default()
            }),
            ..FieldPatch::default()
        };
        let err = FieldRegistry::new(&store)
            .update("posts", "title", patch)
            .unwrap_err();
        assert!(matches!(err, EngineError::Constraint { .. }));
        assert_eq!(err.to_string(), "Failed to alter database column");
        assert_eq!(store.statements().last().unwrap(), "ROLLBACK");
    }

    #[rstest]
    fn test_update_virtual_uses_effective_interface(store: MockStore) {
        push_collection_exists(&store);
        push_field(&store, "divider", Some("presentation-divider"));
        let patch = FieldPatch {
            schema: Some(string_schema()),
            ..FieldPatch::default()
        };
        let _ = FieldRegistry::new(&store).update("posts", "divider", patch);
        assert!(!store.statements().iter().any(|s| s.starts_with("ALTER TABLE")));
    }

    #[rstest]
    fn test_update_virtual_to_storing_adds_column(store: MockStore) {
        push_collection_exists(&store);
        push_field(&store, "divider", Some("presentation-divider"));
        let patch = FieldPatch {
            interface: Some("input".to_string()),
            schema: Some(string_schema()),
            ..FieldPatch::default()
        };
        let _ = FieldRegistry::new(&store).update("posts", "divider", patch);

        let sql = store.statements();
        assert!(sql.contains(&r#"ALTER TABLE "posts" ADD COLUMN "divider" VARCHAR(255)"#.to_string()));
        assert!(!sql.iter().any(|s| s.contains("ALTER COLUMN")));
        assert!(sql.contains(&"COMMIT".to_string()));
    }

    #[rstest]
    fn test_column_failure_is_logged_with_collection_and_field(store: MockStore) {
        push_collection_exists(&store);
        store.push_empty();
        store.push_affected(1);
        store.push_error(sql_error("23502"));
        let new = NewField {
            schema: Some(string_schema()),
            ..NewField::named("title")
        };

        let logs = capture_logs(|| {
            let _ = FieldRegistry::new(&store).create("posts", new);
        });
        let line = logs
            .lines()
            .find(|l| l.contains("Failed to create database column"))
            .unwrap();
        assert!(line.contains("ERROR"));
        assert!(line.contains("collection=posts"));
        assert!(line.contains("field=title"));
        assert!(line.contains("sqlstate=\"23502\""));
    }

    #[rstest]
    fn test_update_nothing_is_validation(store: MockStore) {
        push_collection_exists(&store);
        push_field(&store, "title", None);
        let err = FieldRegistry::new(&store)
            .update("posts", "title", FieldPatch::default())
            .unwrap_err();
        assert_eq!(err.to_string(), NOTHING_TO_UPDATE);
    }

    #[rstest]
    fn test_delete_drops_column(store: MockStore) {
        push_collection_exists(&store);
        push_field(&store, "title", None);
        FieldRegistry::new(&store).delete("posts", "title").unwrap();
        assert_eq!(
            store.statements()[2..],
            [
                "BEGIN".to_string(),
                r#"DELETE FROM "fields" WHERE "collection" = $1 AND "field" = $2"#.to_string(),
                r#"ALTER TABLE "posts" DROP COLUMN IF EXISTS "title" CASCADE"#.to_string(),
                "COMMIT".to_string(),
            ]
        );
    }

    #[rstest]
    fn test_delete_virtual_keeps_table(store: MockStore) {
        push_collection_exists(&store);
        push_field(&store, "notice", Some("presentation-notice"));
        FieldRegistry::new(&store).delete("posts", "notice").unwrap();
        assert!(!store.statements().iter().any(|s| s.contains("DROP COLUMN")));
    }

    #[rstest]
    #[case("id")]
    #[case("created_at")]
    #[case("updated_at")]
    fn test_system_fields_never_deletable(store: MockStore, #[case] name: &str) {
        let err = FieldRegistry::new(&store).delete("posts", name).unwrap_err();
        assert_eq!(err.to_string(), "Cannot delete system field");
        assert!(store.statements().is_empty());
    }

    #[rstest]
    fn test_required_fields_query(store: MockStore) {
        store.push_rows(&["field"], vec![vec!["title".into()], vec!["slug".into()]]);
        let collection = Identifier::parse("posts").unwrap();
        let required = required_fields(&mut AutoCommit(&store), &collection).unwrap();
        assert_eq!(required, vec!["title".to_string(), "slug".to_string()]);
        let stmt = &store.executed()[0];
        assert_eq!(
            stmt.sql,
            r#"SELECT "field" FROM "fields" WHERE "collection" = $1 AND "required" = $2 ORDER BY "sort" ASC, "field" ASC"#
        );
    }

    #[rstest]
    fn test_patch_deserializes_special() {
        let patch: FieldPatch =
            serde_json::from_value(json!({"special": ["uuid"], "hidden": true})).unwrap();
        let assignments = patch.assignments();
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].1, FieldValue::Json(json!(["uuid"])));
    }
}

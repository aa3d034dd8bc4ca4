//! Generic record store over collection tables.
//!
//! Items have no static shape: column names come from the live result set
//! and every cell is decoded into a `FieldValue`. Item statements are not
//! transactional; each one autocommits.

use serde_json::{Map, Value};
use tracing::{info, info_span};
use uuid::Uuid;

use crate::db::{
    column_index, extract_string, rows_as_records, AutoCommit, Datastore, DeleteBuilder,
    Direction, Executor, FieldValue, Identifier, InsertBuilder, Record, SelectBuilder,
    UpdateBuilder,
};
use crate::error::{db_failure, EngineError, EngineResult, DATABASE_ERROR};
use crate::pagination::{Page, Paged};
use crate::registry::fields::required_fields;
use crate::registry::{col, count_rows, require_collection, INVALID_FIELD_NAME};
use crate::schema::is_system_column;

pub const ITEM_NOT_FOUND: &str = "Item not found";

/// A request body for item create and update.
pub type Payload = Map<String, Value>;

/// Drop system columns and convert the remaining keys to bindable pairs.
fn assignments(payload: &Payload) -> EngineResult<Vec<(Identifier, FieldValue)>> {
    payload
        .iter()
        .filter(|(key, _)| !is_system_column(key))
        .map(|(key, value)| {
            let column =
                Identifier::parse(key).ok_or_else(|| EngineError::validation(INVALID_FIELD_NAME))?;
            Ok((column, FieldValue::from_json(value.clone())))
        })
        .collect()
}

/// Item ids are UUIDs; anything else cannot match a row.
fn parse_id(id: &str) -> EngineResult<String> {
    Uuid::parse_str(id)
        .map(|id| id.to_string())
        .map_err(|_| EngineError::not_found(ITEM_NOT_FOUND))
}

fn missing_required(payload: &Payload, required: &[String]) -> Option<String> {
    required
        .iter()
        .find(|field| payload.get(field.as_str()).is_none_or(Value::is_null))
        .cloned()
}

fn fetch(exec: &mut dyn Executor, table: &Identifier, id: &str) -> EngineResult<Option<Record>> {
    let stmt = SelectBuilder::new(table).filter(col("id"), id).build();
    let result = exec
        .query(&stmt)
        .map_err(db_failure("Database error while fetching item"))?;
    Ok(rows_as_records(result).into_iter().next())
}

/// CRUD over the rows of any collection table.
///
/// Every operation first resolves the collection through the registry, so
/// a table that exists without a `collections` row is never reached. Payload
/// keys become quoted identifiers only after `Identifier::parse`; values are
/// always bound parameters.
///
/// # Example
/// ```ignore
/// let items = ItemStore::new(store.as_ref());
/// let post = items.create("posts", payload)?;
/// let page = items.list("posts", Page::new(1, 20))?;
/// ```
pub struct ItemStore<'a> {
    store: &'a dyn Datastore,
}

impl<'a> ItemStore<'a> {
    pub fn new(store: &'a dyn Datastore) -> Self {
        Self { store }
    }

    /// Rows newest first; ties on `created_at` are broken by id so pages
    /// never overlap.
    pub fn list(&self, collection: &str, page: Page) -> EngineResult<Paged<Record>> {
        let _span =
            info_span!("list_items", collection = %collection, page = page.page()).entered();
        let mut exec = AutoCommit(self.store);
        let table = require_collection(&mut exec, collection)?;
        let select = SelectBuilder::new(&table)
            .order_by(col("created_at"), Direction::Desc)
            .order_by(col("id"), Direction::Desc);
        let total = count_rows(&mut exec, &select.clone().build_count())?;
        let result = exec
            .query(&select.limit(page.limit()).offset(page.offset()).build())
            .map_err(db_failure("Database error while fetching items"))?;
        Ok(Paged {
            items: rows_as_records(result),
            meta: page.meta(total),
        })
    }

    pub fn get(&self, collection: &str, id: &str) -> EngineResult<Record> {
        let _span = info_span!("get_item", collection = %collection, item_id = %id).entered();
        let mut exec = AutoCommit(self.store);
        let table = require_collection(&mut exec, collection)?;
        let id = parse_id(id)?;
        fetch(&mut exec, &table, &id)?.ok_or_else(|| EngineError::not_found(ITEM_NOT_FOUND))
    }

    /// Insert a row and return it as stored.
    ///
    /// System columns in `payload` are ignored; nested objects and arrays are
    /// bound as JSON.
    ///
    /// # Errors
    /// - `NotFound` if the collection does not exist
    /// - `Validation` naming the first required field that is absent or null,
    ///   or "No data provided" when nothing is left to insert
    /// - `Validation` for a key that is not a valid column name
    /// - `Constraint` when the datastore rejects the row (unique, foreign key,
    ///   type mismatch, unknown column)
    pub fn create(&self, collection: &str, payload: Payload) -> EngineResult<Record> {
        let _span = info_span!("create_item", collection = %collection).entered();
        let mut exec = AutoCommit(self.store);
        let table = require_collection(&mut exec, collection)?;

        let mut payload = payload;
        payload.retain(|key, _| !is_system_column(key));
        // Required fields are checked first so `{}` names the missing field.
        let required = required_fields(&mut exec, &table)?;
        if let Some(field) = missing_required(&payload, &required) {
            return Err(EngineError::validation(format!(
                "Required field '{}' is missing",
                field
            )));
        }
        if payload.is_empty() {
            return Err(EngineError::validation("No data provided"));
        }

        let stmt = InsertBuilder::new(&table)
            .values(assignments(&payload)?)
            .returning(&[col("id"), col("created_at"), col("updated_at")])
            .build();
        let result = exec
            .query(&stmt)
            .map_err(db_failure("Failed to create item"))?;
        let index = column_index(&result, "id")
            .map_err(|e| EngineError::internal(DATABASE_ERROR, Some(e)))?;
        let id = result
            .rows
            .first()
            .and_then(|row| row.get(index))
            .and_then(extract_string)
            .ok_or_else(|| EngineError::internal(DATABASE_ERROR, None))?;

        info!(collection = %table, item_id = %id, "item created");
        fetch(&mut exec, &table, &id)?.ok_or_else(|| EngineError::not_found(ITEM_NOT_FOUND))
    }

    /// Update the supplied columns and touch `updated_at`.
    pub fn update(&self, collection: &str, id: &str, payload: Payload) -> EngineResult<Record> {
        let _span = info_span!("update_item", collection = %collection, item_id = %id).entered();
        let mut exec = AutoCommit(self.store);
        let table = require_collection(&mut exec, collection)?;
        let id = parse_id(id)?;
        if fetch(&mut exec, &table, &id)?.is_none() {
            return Err(EngineError::not_found(ITEM_NOT_FOUND));
        }

        let assignments = assignments(&payload)?;
        if assignments.is_empty() {
            return Err(EngineError::validation("No data provided for update"));
        }
        let stmt = UpdateBuilder::new(&table)
            .set_all(assignments)
            .touch(col("updated_at"))
            .filter(col("id"), id.as_str())
            .build();
        exec.execute(&stmt)
            .map_err(db_failure("Failed to update item"))?;

        info!(collection = %table, item_id = %id, "item updated");
        fetch(&mut exec, &table, &id)?.ok_or_else(|| EngineError::not_found(ITEM_NOT_FOUND))
    }

    pub fn delete(&self, collection: &str, id: &str) -> EngineResult<()> {
        let _span = info_span!("delete_item", collection = %collection, item_id = %id).entered();
        let mut exec = AutoCommit(self.store);
        let table = require_collection(&mut exec, collection)?;
        let id = parse_id(id)?;
        if fetch(&mut exec, &table, &id)?.is_none() {
            return Err(EngineError::not_found(ITEM_NOT_FOUND));
        }
        let stmt = DeleteBuilder::new(&table)
            .filter(col("id"), id.as_str())
            .build();
        exec.execute(&stmt)
            .map_err(db_failure("Database error while deleting item"))?;

        info!(collection = %table, item_id = %id, "item deleted");
        Ok(())
    }
}

//! `/collections` handlers.

use serde_json::json;

use super::{parse_body, require_privileged, respond, ApiResponse, Caller};
use crate::db::Datastore;
use crate::pagination::Page;
use crate::registry::{CollectionPatch, CollectionRegistry, FieldRegistry, NewCollection};

/// `GET /collections`
pub fn list(store: &dyn Datastore, page: Page) -> ApiResponse {
    respond(CollectionRegistry::new(store).list(page), ApiResponse::paged)
}

/// `GET /collections/:name`, with the collection's fields.
pub fn get(store: &dyn Datastore, name: &str) -> ApiResponse {
    let result = CollectionRegistry::new(store).get(name).and_then(|collection| {
        let fields = FieldRegistry::new(store).list_for_collection(name)?;
        Ok(json!({ "collection": collection, "fields": fields }))
    });
    respond(result, ApiResponse::ok)
}

/// `GET /collections/:name/schema`
pub fn schema(store: &dyn Datastore, name: &str) -> ApiResponse {
    respond(CollectionRegistry::new(store).describe(name), ApiResponse::ok)
}

/// `POST /collections`
pub fn create(store: &dyn Datastore, caller: Caller, body: &str) -> ApiResponse {
    if let Err(denied) = require_privileged(caller) {
        return denied;
    }
    let new: NewCollection = match parse_body(body) {
        Ok(new) => new,
        Err(bad) => return bad,
    };
    respond(CollectionRegistry::new(store).create(new), ApiResponse::created)
}

/// `PATCH /collections/:name`
pub fn update(store: &dyn Datastore, caller: Caller, name: &str, body: &str) -> ApiResponse {
    if let Err(denied) = require_privileged(caller) {
        return denied;
    }
    let patch: CollectionPatch = match parse_body(body) {
        Ok(patch) => patch,
        Err(bad) => return bad,
    };
    respond(CollectionRegistry::new(store).update(name, patch), ApiResponse::ok)
}

/// `DELETE /collections/:name`
pub fn delete(store: &dyn Datastore, caller: Caller, name: &str) -> ApiResponse {
    if let Err(denied) = require_privileged(caller) {
        return denied;
    }
    respond(CollectionRegistry::new(store).delete(name), |()| {
        ApiResponse::message("Collection deleted successfully")
    })
}

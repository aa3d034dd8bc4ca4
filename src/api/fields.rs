//! `/fields` handlers.

use super::{parse_body, require_privileged, respond, ApiResponse, Caller};
use crate::db::Datastore;
use crate::pagination::Page;
use crate::registry::{FieldPatch, FieldRegistry, NewField};

/// `GET /fields?collection=`
pub fn list(store: &dyn Datastore, collection: Option<&str>, page: Page) -> ApiResponse {
    respond(
        FieldRegistry::new(store).list(collection, page),
        ApiResponse::paged,
    )
}

/// `GET /fields/:collection`
pub fn list_for_collection(store: &dyn Datastore, collection: &str) -> ApiResponse {
    respond(
        FieldRegistry::new(store).list_for_collection(collection),
        ApiResponse::ok,
    )
}

/// `GET /fields/:collection/:field`
pub fn get(store: &dyn Datastore, collection: &str, field: &str) -> ApiResponse {
    respond(FieldRegistry::new(store).get(collection, field), ApiResponse::ok)
}

/// `POST /fields/:collection`
pub fn create(store: &dyn Datastore, caller: Caller, collection: &str, body: &str) -> ApiResponse {
    if let Err(denied) = require_privileged(caller) {
        return denied;
    }
    let new: NewField = match parse_body(body) {
        Ok(new) => new,
        Err(bad) => return bad,
    };
    respond(
        FieldRegistry::new(store).create(collection, new),
        ApiResponse::created,
    )
}

/// `PATCH /fields/:collection/:field`
pub fn update(
    store: &dyn Datastore,
    caller: Caller,
    collection: &str,
    field: &str,
    body: &str,
) -> ApiResponse {
    if let Err(denied) = require_privileged(caller) {
        return denied;
    }
    let patch: FieldPatch = match parse_body(body) {
        Ok(patch) => patch,
        Err(bad) => return bad,
    };
    respond(
        FieldRegistry::new(store).update(collection, field, patch),
        ApiResponse::ok,
    )
}

/// `DELETE /fields/:collection/:field`
pub fn delete(store: &dyn Datastore, caller: Caller, collection: &str, field: &str) -> ApiResponse {
    if let Err(denied) = require_privileged(caller) {
        return denied;
    }
    respond(FieldRegistry::new(store).delete(collection, field), |()| {
        ApiResponse::message("Field deleted successfully")
    })
}

//! `/items` handlers.

use super::{parse_body, require_privileged, respond, ApiResponse, Caller};
use crate::db::Datastore;
use crate::items::{ItemStore, Payload};
use crate::pagination::Page;

/// `GET /items/:collection`
pub fn list(store: &dyn Datastore, collection: &str, page: Page) -> ApiResponse {
    respond(ItemStore::new(store).list(collection, page), ApiResponse::paged)
}

/// `GET /items/:collection/:id`
pub fn get(store: &dyn Datastore, collection: &str, id: &str) -> ApiResponse {
    respond(ItemStore::new(store).get(collection, id), ApiResponse::ok)
}

/// `POST /items/:collection`
pub fn create(store: &dyn Datastore, caller: Caller, collection: &str, body: &str) -> ApiResponse {
    if let Err(denied) = require_privileged(caller) {
        return denied;
    }
    let payload: Payload = match parse_body(body) {
        Ok(payload) => payload,
        Err(bad) => return bad,
    };
    respond(
        ItemStore::new(store).create(collection, payload),
        ApiResponse::created,
    )
}

/// `PATCH /items/:collection/:id`
pub fn update(
    store: &dyn Datastore,
    caller: Caller,
    collection: &str,
    id: &str,
    body: &str,
) -> ApiResponse {
    if let Err(denied) = require_privileged(caller) {
        return denied;
    }
    let payload: Payload = match parse_body(body) {
        Ok(payload) => payload,
        Err(bad) => return bad,
    };
    respond(
        ItemStore::new(store).update(collection, id, payload),
        ApiResponse::ok,
    )
}

/// `DELETE /items/:collection/:id`
pub fn delete(store: &dyn Datastore, caller: Caller, collection: &str, id: &str) -> ApiResponse {
    if let Err(denied) = require_privileged(caller) {
        return denied;
    }
    respond(ItemStore::new(store).delete(collection, id), |()| {
        ApiResponse::message("Item deleted successfully")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::mock::MockStore;
    use rstest::rstest;
    use serde_json::json;

    const ID: &str = "0b6f7f4e-2c59-4d0c-9a57-0f5a2f3c7e11";

    #[rstest]
    fn test_reads_do_not_require_privilege() {
        let store = MockStore::new();
        store.push_rows(&["collection"], vec![vec!["posts".into()]]);
        store.push_count(0);
        let response = list(&store, "posts", Page::default());
        assert_eq!(response.status, 200);
    }

    #[rstest]
    fn test_create_requires_privilege() {
        let store = MockStore::new();
        let response = create(&store, Caller::user(), "posts", r#"{"title":"x"}"#);
        assert_eq!(response.status, 403);
        assert_eq!(response.body, json!({"error": "Admin access required"}));
    }

    #[rstest]
    fn test_create_non_object_is_invalid_payload() {
        let store = MockStore::new();
        let response = create(&store, Caller::admin(), "posts", "[1, 2]");
        assert_eq!(response.status, 400);
        assert_eq!(response.body, json!({"error": "Invalid request payload"}));
    }

    #[rstest]
    fn test_create_missing_required_is_400() {
        let store = MockStore::new();
        store.push_rows(&["collection"], vec![vec!["posts".into()]]);
        store.push_rows(&["field"], vec![vec!["title".into()]]);
        let response = create(&store, Caller::admin(), "posts", r#"{"body":"x"}"#);
        assert_eq!(response.status, 400);
        assert_eq!(
            response.body,
            json!({"error": "Required field 'title' is missing"})
        );
    }

    #[rstest]
    fn test_get_missing_item_is_404() {
        let store = MockStore::new();
        store.push_rows(&["collection"], vec![vec!["posts".into()]]);
        let response = get(&store, "posts", ID);
        assert_eq!(response.status, 404);
        assert_eq!(response.body, json!({"error": "Item not found"}));
    }

    #[rstest]
    fn test_delete_message() {
        let store = MockStore::new();
        store.push_rows(&["collection"], vec![vec!["posts".into()]]);
        store.push_rows(&["id"], vec![vec![ID.into()]]);
        let response = delete(&store, Caller::admin(), "posts", ID);
        assert_eq!(response.body, json!({"message": "Item deleted successfully"}));
    }
}

//! Execute tests for the items command.

#[cfg(test)]
mod tests {
    use super::super::{ItemsAction, ItemsCmd};
    use crate::commands::Execute;
    use crate::output::ApiOutput;
    use crate::db::mock::MockStore;
    use crate::output::Outputable;
    use rstest::rstest;
    use serde_json::json;

    const ID: &str = "0b6f7f4e-2c59-4d0c-9a57-0f5a2f3c7e11";

    fn run(store: &MockStore, action: ItemsAction) -> ApiOutput {
        ItemsCmd { action }.execute(store).unwrap()
    }

    #[rstest]
    fn test_get_unknown_collection() {
        let store = MockStore::new();
        let output = run(
            &store,
            ItemsAction::Get {
                collection: "ghosts".to_string(),
                id: ID.to_string(),
            },
        );
        assert_eq!(output.to_table(), "Error (404): Collection not found");
    }

    #[rstest]
    fn test_get_non_uuid_is_not_found() {
        let store = MockStore::new();
        store.push_rows(&["collection"], vec![vec!["posts".into()]]);
        let output = run(
            &store,
            ItemsAction::Get {
                collection: "posts".to_string(),
                id: "42".to_string(),
            },
        );
        assert_eq!(output.response.body, json!({"error": "Item not found"}));
    }

    #[rstest]
    fn test_create_without_data() {
        let store = MockStore::new();
        store.push_rows(&["collection"], vec![vec!["posts".into()]]);
        let output = run(
            &store,
            ItemsAction::Create {
                collection: "posts".to_string(),
                data: r#"{"id": "x", "created_at": "now"}"#.to_string(),
            },
        );
        assert_eq!(output.to_table(), "Error (400): No data provided");
    }

    #[rstest]
    fn test_delete_message() {
        let store = MockStore::new();
        store.push_rows(&["collection"], vec![vec!["posts".into()]]);
        store.push_rows(&["id"], vec![vec![ID.into()]]);
        let output = run(
            &store,
            ItemsAction::Delete {
                collection: "posts".to_string(),
                id: ID.to_string(),
            },
        );
        assert!(output.succeeded());
        assert_eq!(output.to_table(), "Item deleted successfully");
    }
}

//! Output formatting tests for item results.

#[cfg(test)]
mod tests {
    use super::super::output::ITEM_COLUMNS;
    use crate::api::ApiResponse;
    use crate::output::ApiOutput;
    use rstest::fixture;
    use rstest::rstest;
    use serde_json::json;

    #[fixture]
    fn item_page() -> ApiOutput {
        ApiOutput::new(
            ApiResponse {
                status: 200,
                body: json!({
                    "data": [
                        {"id": "b1", "created_at": "2024-05-01T10:00:00.000Z", "updated_at": null, "title": "Second", "meta": {"tags": ["a"]}},
                        {"id": "a1", "created_at": "2024-04-01T10:00:00.000Z", "updated_at": null, "title": "First", "meta": null}
                    ],
                    "meta": {"page": 1, "limit": 2, "total": 7}
                }),
            },
            ITEM_COLUMNS,
        )
    }

    #[fixture]
    fn one_item() -> ApiOutput {
        ApiOutput::new(
            ApiResponse::ok(json!({
                "id": "a1",
                "title": "First",
                "meta": {"tags": ["a", "b"], "views": 3}
            })),
            ITEM_COLUMNS,
        )
    }

    crate::output_table_contains_test! {
        test_name: test_page_table,
        fixture: item_page,
        fixture_type: ApiOutput,
        contains: [
            "Showing 2 of 7 (page 1, limit 2)",
            "created_at",
            "{\"tags\":[\"a\"]}",
            "First",
        ],
    }

    crate::output_table_contains_test! {
        test_name: test_item_table,
        fixture: one_item,
        fixture_type: ApiOutput,
        contains: ["id: a1", "meta:\n  tags: [\"a\",\"b\"]\n  views: 3", "title: First"],
    }

    crate::output_json_test! {
        test_name: test_item_json_round_trips_nested,
        fixture: one_item,
        fixture_type: ApiOutput,
        assertions: {
            "data": json!({"id": "a1", "title": "First", "meta": {"tags": ["a", "b"], "views": 3}}),
        },
    }
}

//! Declarative macros for generating CLI parsing and output tests.
//!
//! Instead of writing repetitive test functions, declare the test cases and
//! let the macro generate the actual test code.

/// Generate a test that parses `args` and compares the parsed subcommand
/// action with `expected`.
///
/// # Example
///
/// ```ignore
/// cli_action_test! {
///     test_name: test_get,
///     args: ["collections", "get", "posts"],
///     variant: Collections,
///     expected: CollectionsAction::Get { name: "posts".to_string() },
/// }
/// ```
#[macro_export]
macro_rules! cli_action_test {
    (
        test_name: $test_name:ident,
        args: [$($arg:literal),+],
        variant: $variant:ident,
        expected: $expected:expr $(,)?
    ) => {
        #[rstest]
        fn $test_name() {
            let args = Args::try_parse_from(["rectus", $($arg),+]).unwrap();
            match args.command {
                crate::commands::Command::$variant(cmd) => {
                    assert_eq!(cmd.action, $expected);
                }
                _ => panic!(concat!("Expected ", stringify!($variant), " command")),
            }
        }
    };
}

/// Generate page/limit validation tests for a list command (zero page,
/// zero limit and limit above the maximum are all rejected).
#[macro_export]
macro_rules! cli_limit_tests {
    (
        args: [$($arg:literal),+],
        max: $limit_max:expr $(,)?
    ) => {
        #[rstest]
        fn test_page_zero_rejected() {
            let result = Args::try_parse_from(["rectus", $($arg,)+ "--page", "0"]);
            assert!(result.is_err(), "Page 0 should be rejected");
        }

        #[rstest]
        fn test_limit_zero_rejected() {
            let result = Args::try_parse_from(["rectus", $($arg,)+ "--limit", "0"]);
            assert!(result.is_err(), "Limit of 0 should be rejected");
        }

        #[rstest]
        fn test_limit_exceeds_max_rejected() {
            let max_plus_one = ($limit_max + 1).to_string();
            let result = Args::try_parse_from(["rectus", $($arg,)+ "--limit", &max_plus_one]);
            assert!(result.is_err(),
                concat!("Limit exceeding ", stringify!($limit_max), " should be rejected"));
        }
    };
}

/// Generate a test that verifies a command requires a specific argument.
///
/// # Example
///
/// ```ignore
/// cli_required_arg_test! {
///     test_name: test_create_requires_data,
///     args: ["collections", "create"],
///     required_arg: "--data",
/// }
/// ```
#[macro_export]
macro_rules! cli_required_arg_test {
    (
        test_name: $test_name:ident,
        args: [$($arg:literal),+],
        required_arg: $required:literal $(,)?
    ) => {
        #[rstest]
        fn $test_name() {
            let result = Args::try_parse_from(["rectus", $($arg),+]);
            assert!(result.is_err(), concat!("Command should require ", $required));
            assert!(
                result.unwrap_err().to_string().contains($required),
                concat!("Error should mention ", $required)
            );
        }
    };
}

/// Generate a test that verifies parsing fails with specific invalid args.
///
/// # Example
///
/// ```ignore
/// cli_error_test! {
///     test_name: test_unknown_action,
///     args: ["collections", "rename", "posts"],
/// }
/// ```
#[macro_export]
macro_rules! cli_error_test {
    (
        test_name: $test_name:ident,
        args: [$($arg:literal),+] $(,)?
    ) => {
        #[rstest]
        fn $test_name() {
            let result = Args::try_parse_from(["rectus", $($arg),+]);
            assert!(result.is_err());
        }
    };
}

// =============================================================================
// Output Test Macros
// =============================================================================

/// Generate a test that verifies table output matches expected string.
///
/// Works with rstest fixtures by accepting a fixture parameter.
///
/// # Example
/// ```ignore
/// output_table_test! {
///     test_name: test_to_table_ready,
///     fixture: ready_result,
///     fixture_type: SetupResult,
///     expected: EXPECTED_TABLE,
/// }
/// ```
#[macro_export]
macro_rules! output_table_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        expected: $expected:expr $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use crate::output::Outputable;
            assert_eq!($fixture.to_table(), $expected);
        }
    };
}

/// Generate a test that verifies table output contains expected strings.
///
/// Use this when exact string matching is too brittle.
#[macro_export]
macro_rules! output_table_contains_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        contains: [$($needle:literal),* $(,)?] $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use crate::output::Outputable;
            let output = $fixture.to_table();
            $(
                assert!(output.contains($needle), "Table output should contain: {}", $needle);
            )*
        }
    };
}

/// Generate a test that verifies JSON output is valid and contains expected fields.
///
/// # Example
/// ```ignore
/// output_json_test! {
///     test_name: test_format_json,
///     fixture: ready_result,
///     fixture_type: SetupResult,
///     assertions: {
///         "schema_version": 1,
///     },
/// }
/// ```
#[macro_export]
macro_rules! output_json_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        assertions: { $($field:literal : $expected:expr),* $(,)? } $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use crate::output::{Outputable, OutputFormat};
            let output = $fixture.format(OutputFormat::Json);
            let parsed: serde_json::Value = serde_json::from_str(&output)
                .expect("Should produce valid JSON");
            $(
                assert_eq!(parsed[$field], $expected, "JSON field mismatch: {}", $field);
            )*
        }
    };
}

/// Generate a test that verifies Toon output contains expected strings.
#[macro_export]
macro_rules! output_toon_test {
    (
        test_name: $test_name:ident,
        fixture: $fixture:ident,
        fixture_type: $fixture_type:ty,
        contains: [$($needle:literal),* $(,)?] $(,)?
    ) => {
        #[rstest]
        fn $test_name($fixture: $fixture_type) {
            use crate::output::{Outputable, OutputFormat};
            let output = $fixture.format(OutputFormat::Toon);
            $(
                assert!(output.contains($needle), "Toon output should contain: {}", $needle);
            )*
        }
    };
}

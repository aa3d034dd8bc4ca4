//! Command definitions and implementations.
//!
//! Each command is defined in its own module with:
//! - `mod.rs`: the clap arguments and the `CommandRunner` impl
//! - `execute.rs`: the `Execute` impl and its tests
//! - `output.rs`: table layout for the command's results

mod collections;
mod fields;
mod items;
mod setup;

pub use collections::{CollectionsAction, CollectionsCmd};
pub use fields::{FieldsAction, FieldsCmd};
pub use items::{ItemsAction, ItemsCmd};
pub use setup::SetupCmd;

use clap::{Args, Subcommand};
use std::error::Error;
use std::fs;

use crate::db::Datastore;
use crate::output::{OutputFormat, Outputable};
use crate::pagination::{Page, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};

/// Trait for executing commands with command-specific result types.
pub trait Execute {
    type Output: Outputable;

    fn execute(self, db: &dyn Datastore) -> Result<Self::Output, Box<dyn Error>>;
}

/// Formatted command output plus whether the command succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub success: bool,
}

/// Execute a command and format its result.
pub trait CommandRunner {
    fn run(self, db: &dyn Datastore, format: OutputFormat) -> Result<CommandOutput, Box<dyn Error>>;
}

impl<C: Execute> CommandRunner for C {
    fn run(self, db: &dyn Datastore, format: OutputFormat) -> Result<CommandOutput, Box<dyn Error>> {
        let result = self.execute(db)?;
        Ok(CommandOutput {
            text: result.format(format),
            success: result.succeeded(),
        })
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the system tables (idempotent)
    Setup(SetupCmd),

    /// Manage collections and their physical tables
    Collections(CollectionsCmd),

    /// Manage fields and their columns
    Fields(FieldsCmd),

    /// Read and write items in a collection
    Items(ItemsCmd),
}

impl Command {
    /// Execute the command and return formatted output
    pub fn run(self, db: &dyn Datastore, format: OutputFormat) -> Result<CommandOutput, Box<dyn Error>> {
        match self {
            Command::Setup(cmd) => cmd.run(db, format),
            Command::Collections(cmd) => cmd.run(db, format),
            Command::Fields(cmd) => cmd.run(db, format),
            Command::Items(cmd) => cmd.run(db, format),
        }
    }
}

/// `--page` and `--limit` for list commands.
#[derive(Args, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageArgs {
    /// Page number (1-based)
    #[arg(long, default_value_t = DEFAULT_PAGE, value_parser = clap::value_parser!(i64).range(1..))]
    pub page: i64,

    /// Items per page
    #[arg(long, default_value_t = DEFAULT_LIMIT, value_parser = clap::value_parser!(i64).range(1..=MAX_LIMIT))]
    pub limit: i64,
}

impl From<PageArgs> for Page {
    fn from(args: PageArgs) -> Self {
        Page::new(args.page, args.limit)
    }
}

/// Request body given on the command line: inline JSON, or `@path` to read
/// it from a file.
pub(crate) fn read_payload(data: &str) -> Result<String, Box<dyn Error>> {
    match data.strip_prefix('@') {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("Failed to read payload file {}: {}", path, e).into()),
        None => Ok(data.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::temp_file;
    use rstest::rstest;

    #[rstest]
    fn test_read_payload_inline() {
        assert_eq!(read_payload(r#"{"a":1}"#).unwrap(), r#"{"a":1}"#);
    }

    #[rstest]
    fn test_read_payload_from_file() {
        let (_dir, path) = temp_file("body.json", r#"{"title":"Hello"}"#);
        let arg = format!("@{}", path.display());
        assert_eq!(read_payload(&arg).unwrap(), r#"{"title":"Hello"}"#);
    }

    #[rstest]
    fn test_read_payload_missing_file() {
        let err = read_payload("@/nonexistent/rectus/body.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read payload file"));
    }

    #[rstest]
    fn test_page_args_into_page() {
        let page: Page = PageArgs { page: 3, limit: 20 }.into();
        assert_eq!(page.offset(), 40);
    }
}

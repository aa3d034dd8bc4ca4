mod execute;
mod output;

use clap::{Args, Subcommand};

use crate::commands::PageArgs;

pub(crate) use output::FIELD_COLUMNS;

/// Manage fields
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  rectus fields list                           # Fields of every collection
  rectus fields list --collection posts        # Paged, one collection
  rectus fields get posts title
  rectus fields create posts --data '{\"field\": \"title\", \"schema\": {\"data_type\": \"string\", \"is_nullable\": false}}'
  rectus fields update posts title --data '{\"note\": \"Headline\"}'
  rectus fields delete posts title")]
pub struct FieldsCmd {
    #[command(subcommand)]
    pub action: FieldsAction,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum FieldsAction {
    /// List fields, optionally for one collection
    List {
        /// Only fields of this collection
        #[arg(long)]
        collection: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show one field
    Get {
        /// Collection name
        collection: String,

        /// Field name
        field: String,
    },

    /// Create a field and, when a schema is given, its column
    Create {
        /// Collection name
        collection: String,

        /// JSON body, or @path to a JSON file
        #[arg(long)]
        data: String,
    },

    /// Update field metadata and column type, nullability or default
    Update {
        /// Collection name
        collection: String,

        /// Field name
        field: String,

        /// JSON body, or @path to a JSON file
        #[arg(long)]
        data: String,
    },

    /// Delete a field and its column
    Delete {
        /// Collection name
        collection: String,

        /// Field name
        field: String,
    },
}

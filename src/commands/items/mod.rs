mod execute;
mod execute_tests;
mod output;
mod output_tests;

use clap::{Args, Subcommand};

use crate::commands::PageArgs;

/// Read and write items
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  rectus items list posts --page 2
  rectus items get posts 0b6f7f4e-2c59-4d0c-9a57-0f5a2f3c7e11
  rectus items create posts --data '{\"title\": \"Hello\"}'
  rectus items update posts 0b6f7f4e-2c59-4d0c-9a57-0f5a2f3c7e11 --data '{\"title\": \"Hi\"}'
  rectus items delete posts 0b6f7f4e-2c59-4d0c-9a57-0f5a2f3c7e11")]
pub struct ItemsCmd {
    #[command(subcommand)]
    pub action: ItemsAction,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ItemsAction {
    /// List items, newest first
    List {
        /// Collection name
        collection: String,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show one item
    Get {
        /// Collection name
        collection: String,

        /// Item id
        id: String,
    },

    /// Create an item
    Create {
        /// Collection name
        collection: String,

        /// JSON object, or @path to a JSON file
        #[arg(long)]
        data: String,
    },

    /// Update an item
    Update {
        /// Collection name
        collection: String,

        /// Item id
        id: String,

        /// JSON object, or @path to a JSON file
        #[arg(long)]
        data: String,
    },

    /// Delete an item
    Delete {
        /// Collection name
        collection: String,

        /// Item id
        id: String,
    },
}

mod execute;
mod output;

use clap::{Args, Subcommand};

use crate::commands::PageArgs;

/// Manage collections
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  rectus collections list --page 2 --limit 20
  rectus collections get posts
  rectus collections describe posts            # Physical column layout
  rectus collections create --data '{\"collection\": \"posts\", \"note\": \"Blog posts\"}'
  rectus collections create --data @posts.json
  rectus collections update posts --data '{\"icon\": \"article\"}'
  rectus collections delete posts")]
pub struct CollectionsCmd {
    #[command(subcommand)]
    pub action: CollectionsAction,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum CollectionsAction {
    /// List collections ordered by sort, then name
    List {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Show a collection with its fields
    Get {
        /// Collection name
        name: String,
    },

    /// Show the physical columns of a collection's table
    Describe {
        /// Collection name
        name: String,
    },

    /// Create a collection, its table and any inline fields
    Create {
        /// JSON body, or @path to a JSON file
        #[arg(long)]
        data: String,
    },

    /// Update collection metadata
    Update {
        /// Collection name
        name: String,

        /// JSON body, or @path to a JSON file
        #[arg(long)]
        data: String,
    },

    /// Delete a collection, its fields and its table
    Delete {
        /// Collection name
        name: String,
    },
}

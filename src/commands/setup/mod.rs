mod execute;
mod output;

use clap::Args;

/// Create the system tables without touching any collection
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  rectus setup                                    # Create system tables
  rectus setup --dry-run                          # Show what would be created
  rectus --database-url postgres://localhost/cms setup")]
pub struct SetupCmd {
    /// Show what would be created without doing it
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

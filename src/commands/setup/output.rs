//! Output formatting for setup command results.

use super::execute::{SetupResult, TableState};
use crate::output::Outputable;

impl Outputable for SetupResult {
    fn to_table(&self) -> String {
        let mut output = String::new();

        output.push_str("Database Setup\n\n");

        if self.dry_run {
            output.push_str("System tables (dry-run):\n");
        } else {
            output.push_str("System tables:\n");
        }

        for table in &self.tables {
            let (symbol, status_text) = match table.status {
                TableState::Ready => ("✓", "ready"),
                TableState::WouldCreate => ("→", "would create"),
            };
            output.push_str(&format!("  {} {} ({})\n", symbol, table.name, status_text));
        }

        if self.dry_run {
            output.push_str("\nNo changes made (dry-run mode).");
        } else {
            output.push_str(&format!(
                "\nDatabase ready (schema version {}).",
                self.schema_version
            ));
        }
        output
    }
}

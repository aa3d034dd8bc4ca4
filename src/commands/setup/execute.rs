use std::error::Error;

use serde::Serialize;
use tracing::info;

use super::SetupCmd;
use crate::commands::Execute;
use crate::db::postgres::{initialize_schema, SCHEMA_VERSION, SYSTEM_TABLES};
use crate::db::{in_transaction, Datastore};
use crate::error::db_failure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableState {
    Ready,
    WouldCreate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableStatus {
    pub name: String,
    pub status: TableState,
}

/// Result of the setup command execution
#[derive(Debug, Serialize)]
pub struct SetupResult {
    pub tables: Vec<TableStatus>,
    pub schema_version: i64,
    pub dry_run: bool,
}

fn statuses(status: TableState) -> Vec<TableStatus> {
    SYSTEM_TABLES
        .iter()
        .map(|name| TableStatus {
            name: name.to_string(),
            status,
        })
        .collect()
}

impl Execute for SetupCmd {
    type Output = SetupResult;

    fn execute(self, db: &dyn Datastore) -> Result<Self::Output, Box<dyn Error>> {
        if self.dry_run {
            return Ok(SetupResult {
                tables: statuses(TableState::WouldCreate),
                schema_version: SCHEMA_VERSION,
                dry_run: true,
            });
        }

        let schema_version = in_transaction(db, |tx| {
            initialize_schema(tx).map_err(db_failure("Failed to initialize system tables"))
        })?;
        info!(backend = db.backend_name(), schema_version, "setup complete");

        Ok(SetupResult {
            tables: statuses(TableState::Ready),
            schema_version,
            dry_run: false,
        })
    }
}

//! Database connection management.

use tracing::info;

use super::postgres::PostgresBackend;
use super::{Datastore, DatabaseConfig, DbError};

/// Open the datastore described by `config`.
pub fn open_datastore(config: &DatabaseConfig) -> Result<Box<dyn Datastore>, DbError> {
    info!(
        source = config.source.as_str(),
        target_db = %config.postgres.describe(),
        "opening datastore"
    );
    let backend = PostgresBackend::connect(&config.postgres)?;
    Ok(Box::new(backend))
}

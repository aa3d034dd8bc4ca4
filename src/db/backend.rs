//! Datastore trait for abstracting the SQL backend.
//!
//! The registries and the item store are written against `Executor`, so the
//! same code runs inside a transaction or in autocommit mode.

use super::{DbError, FieldValue, Statement};
use crate::error::{EngineError, DATABASE_ERROR};

/// Result of a query execution.
///
/// Column names come from the result set itself, which is what lets the item
/// store work without a static schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<FieldValue>>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// First cell of the first row, for scalar queries such as `COUNT(*)`.
    pub fn scalar(&self) -> Option<&FieldValue> {
        self.rows.first().and_then(|row| row.first())
    }
}

/// Runs statements against an open connection or transaction.
pub trait Executor {
    /// Run a statement that returns rows.
    fn query(&mut self, stmt: &Statement) -> Result<QueryResult, DbError>;

    /// Run a statement and return the number of affected rows.
    fn execute(&mut self, stmt: &Statement) -> Result<u64, DbError>;
}

/// Work run inside `Datastore::transaction`.
pub type TransactionWork<'a> = dyn FnMut(&mut dyn Executor) -> Result<(), EngineError> + 'a;

/// A transactional SQL datastore.
///
/// The registries and the item store only see this trait. The production
/// implementation is `PostgresBackend`; unit tests script a `MockStore`.
///
/// Statements passed to `query` and `execute` run in autocommit mode. Work
/// that must be atomic (metadata plus DDL) goes through `transaction`, or
/// the `in_transaction` helper when the closure produces a value.
///
/// # Example
/// ```ignore
/// let removed = in_transaction(store, |tx| {
///     tx.execute(&delete_fields).map_err(db_failure("Database error while deleting fields"))?;
///     tx.execute(&ddl::drop_table(&name)).map_err(db_failure("Failed to drop collection table"))
/// })?;
/// ```
pub trait Datastore: Send + Sync {
    /// Run a statement that returns rows, in autocommit mode.
    fn query(&self, stmt: &Statement) -> Result<QueryResult, DbError>;

    /// Run a statement in autocommit mode, returning affected rows.
    fn execute(&self, stmt: &Statement) -> Result<u64, DbError>;

    /// Run `work` inside a single transaction.
    ///
    /// Commits when `work` returns `Ok`; rolls back when it returns `Err` or
    /// when the transaction is dropped before commit.
    fn transaction(&self, work: &mut TransactionWork<'_>) -> Result<(), EngineError>;

    /// Backend name for logging.
    fn backend_name(&self) -> &'static str;
}

/// Run `work` in a transaction and hand back its result.
pub fn in_transaction<T, F>(store: &dyn Datastore, mut work: F) -> Result<T, EngineError>
where
    F: FnMut(&mut dyn Executor) -> Result<T, EngineError>,
{
    let mut output = None;
    store.transaction(&mut |tx| {
        output = Some(work(tx)?);
        Ok(())
    })?;
    output.ok_or_else(|| EngineError::internal(DATABASE_ERROR, None))
}

/// Adapts a `Datastore` to `Executor` so autocommit reads and writes can share
/// code with transactional ones.
pub struct AutoCommit<'a>(pub &'a dyn Datastore);

impl Executor for AutoCommit<'_> {
    fn query(&mut self, stmt: &Statement) -> Result<QueryResult, DbError> {
        self.0.query(stmt)
    }

    fn execute(&mut self, stmt: &Statement) -> Result<u64, DbError> {
        self.0.execute(stmt)
    }
}

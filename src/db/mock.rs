//! Scripted in-memory datastore for unit tests.
//!
//! Responses are replayed in the order they were pushed. Every statement,
//! including `BEGIN`/`COMMIT`/`ROLLBACK`, is recorded so tests can assert on
//! the exact sequence. An exhausted script yields empty results.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::backend::{Datastore, Executor, QueryResult, TransactionWork};
use super::{DbError, FieldValue, Statement};
use crate::error::EngineError;

enum Response {
    Rows(QueryResult),
    Affected(u64),
    Fail(DbError),
}

#[derive(Default)]
pub struct MockStore {
    responses: Mutex<VecDeque<Response>>,
    log: Mutex<Vec<Statement>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_rows(&self, headers: &[&str], rows: Vec<Vec<FieldValue>>) {
        self.push_result(QueryResult {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        });
    }

    pub fn push_result(&self, result: QueryResult) {
        self.push(Response::Rows(result));
    }

    /// A single-cell result, as returned by `COUNT(*)`.
    pub fn push_count(&self, count: i64) {
        self.push_rows(&["count"], vec![vec![FieldValue::from(count)]]);
    }

    /// A result with zero rows.
    pub fn push_empty(&self) {
        self.push_result(QueryResult::default());
    }

    pub fn push_affected(&self, rows: u64) {
        self.push(Response::Affected(rows));
    }

    pub fn push_error(&self, error: DbError) {
        self.push(Response::Fail(error));
    }

    /// Recorded SQL text in execution order.
    pub fn statements(&self) -> Vec<String> {
        self.log
            .lock()
            .map(|log| log.iter().map(|s| s.sql.clone()).collect())
            .unwrap_or_default()
    }

    /// Recorded statements with their parameters.
    pub fn executed(&self) -> Vec<Statement> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// First recorded statement whose SQL starts with `prefix`.
    pub fn find(&self, prefix: &str) -> Option<Statement> {
        self.executed()
            .into_iter()
            .find(|s| s.sql.starts_with(prefix))
    }

    fn push(&self, response: Response) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(response);
        }
    }

    fn record(&self, stmt: Statement) {
        if let Ok(mut log) = self.log.lock() {
            log.push(stmt);
        }
    }

    fn next(&self) -> Option<Response> {
        self.responses.lock().ok().and_then(|mut q| q.pop_front())
    }

    fn run_query(&self, stmt: &Statement) -> Result<QueryResult, DbError> {
        self.record(stmt.clone());
        match self.next() {
            Some(Response::Rows(result)) => Ok(result),
            Some(Response::Fail(e)) => Err(e),
            Some(Response::Affected(_)) | None => Ok(QueryResult::default()),
        }
    }

    fn run_execute(&self, stmt: &Statement) -> Result<u64, DbError> {
        self.record(stmt.clone());
        match self.next() {
            Some(Response::Affected(n)) => Ok(n),
            Some(Response::Rows(result)) => Ok(result.len() as u64),
            Some(Response::Fail(e)) => Err(e),
            None => Ok(0),
        }
    }
}

struct MockExecutor<'a>(&'a MockStore);

impl Executor for MockExecutor<'_> {
    fn query(&mut self, stmt: &Statement) -> Result<QueryResult, DbError> {
        self.0.run_query(stmt)
    }

    fn execute(&mut self, stmt: &Statement) -> Result<u64, DbError> {
        self.0.run_execute(stmt)
    }
}

impl Datastore for MockStore {
    fn query(&self, stmt: &Statement) -> Result<QueryResult, DbError> {
        self.run_query(stmt)
    }

    fn execute(&self, stmt: &Statement) -> Result<u64, DbError> {
        self.run_execute(stmt)
    }

    fn transaction(&self, work: &mut TransactionWork<'_>) -> Result<(), EngineError> {
        self.record(Statement::new("BEGIN"));
        match work(&mut MockExecutor(self)) {
            Ok(()) => {
                self.record(Statement::new("COMMIT"));
                Ok(())
            }
            Err(e) => {
                self.record(Statement::new("ROLLBACK"));
                Err(e)
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "Mock"
    }
}

/// Shorthand for a datastore error carrying a SQLSTATE.
pub fn sql_error(code: &str) -> DbError {
    DbError::Query {
        message: format!("scripted failure {}", code),
        sqlstate: Some(code.to_string()),
    }
}

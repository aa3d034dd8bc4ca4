//! Database access layer for the dynamic schema engine.
//!
//! This module provides everything between the registries and PostgreSQL:
//! - Validated identifiers and the single identifier-quoting routine
//! - The `FieldValue` sum type used for every bound parameter and decoded cell
//! - A query builder that renders positional `$n` parameters
//! - The `Datastore` trait (query, execute, scoped transactions)
//! - The PostgreSQL implementation of that trait
//!
//! # Type Decisions
//!
//! **Why decode into `FieldValue` instead of typed rows?**
//! Collection tables have no compile-time shape. Every result set is decoded
//! column by column using the column type the server reports, so the same
//! path serves both the metadata tables and user collections.
//!
//! **Why does `Identifier` exist when PostgreSQL can quote anything?**
//! Identifiers cannot be bound as parameters. Renderers only accept
//! `&Identifier`, which can only be obtained through `Identifier::parse`,
//! so an unvalidated name never reaches SQL text.

mod backend;
mod config;
mod connection;
mod escape;
mod extraction;
mod identifier;
pub mod postgres;
mod query;
mod value;

#[cfg(test)]
pub mod mock;

pub use backend::{in_transaction, AutoCommit, Datastore, Executor, QueryResult, TransactionWork};
pub use config::{ConfigSource, DatabaseConfig, PostgresConfig};
pub use connection::open_datastore;
pub use escape::{quote_ident, quote_literal};
pub use extraction::{
    column_index, extract_bool, extract_json, extract_string, extract_string_or,
    extract_string_vec, extract_timestamp, rows_as_records, Record,
};
pub use identifier::{Identifier, MAX_IDENTIFIER_LEN};
pub use query::{DeleteBuilder, Direction, InsertBuilder, SelectBuilder, Statement, UpdateBuilder};
pub use value::{format_timestamp, DatabaseValue, FieldValue};

use thiserror::Error;

/// Database error types
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to connect to database: {message}")]
    Connect { message: String },

    #[error("Query failed: {message}")]
    Query {
        message: String,
        sqlstate: Option<String>,
    },

    #[error("Failed to encode parameter: {message}")]
    Encode { message: String },

    #[error("Failed to acquire database connection: {message}")]
    Lock { message: String },

    #[error("Missing column '{name}' in query result")]
    MissingColumn { name: String },
}

impl DbError {
    /// SQLSTATE code reported by the server, if any.
    pub fn sqlstate(&self) -> Option<&str> {
        match self {
            DbError::Query { sqlstate, .. } => sqlstate.as_deref(),
            _ => None,
        }
    }

    /// True for failures caused by the data or schema rather than the
    /// datastore itself: bad casts, unique/FK/not-null violations, columns
    /// that do not exist and values that could not be encoded for their
    /// column.
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            DbError::Encode { .. } => true,
            DbError::Query {
                sqlstate: Some(code),
                ..
            } => {
                code.starts_with("22")
                    || code.starts_with("23")
                    || code == "42804"
                    || code == "42703"
            }
            _ => false,
        }
    }

    /// `42P07`: the relation already exists.
    pub fn is_duplicate_table(&self) -> bool {
        self.sqlstate() == Some("42P07")
    }
}

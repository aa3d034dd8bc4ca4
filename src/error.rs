//! Engine error taxonomy.
//!
//! Every public registry and item operation returns `EngineError`. The
//! `Display` output is the client-safe message; the datastore error that
//! caused a `Constraint` or `Internal` failure is only reachable through
//! `source()` and the server-side logs.

use thiserror::Error;
use tracing::error;

use crate::db::DbError;

/// Message used for unexpected datastore failures.
pub const DATABASE_ERROR: &str = "Database error";

#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed name, missing required field, empty patch, reserved name.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Duplicate collection or field.
    #[error("{0}")]
    Conflict(String),

    /// The datastore rejected DDL or DML because of the data or schema:
    /// bad cast, unique or foreign-key violation, NOT NULL on existing rows.
    #[error("{message}")]
    Constraint {
        message: String,
        #[source]
        source: DbError,
    },

    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: Option<DbError>,
    },
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>, source: Option<DbError>) -> Self {
        Self::Internal {
            message: message.into(),
            source,
        }
    }

    /// Classify a datastore failure.
    ///
    /// Constraint-class failures keep `message`; anything else is reported
    /// as a generic database error.
    pub fn from_db(message: impl Into<String>, source: DbError) -> Self {
        if source.is_constraint_violation() {
            Self::Constraint {
                message: message.into(),
                source,
            }
        } else {
            Self::internal(DATABASE_ERROR, Some(source))
        }
    }

    /// Short category name used in logs and the CLI.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Constraint { .. } => "constraint",
            Self::Internal { .. } => "internal",
        }
    }
}

/// Build a `map_err` closure that logs the datastore failure with `context`
/// and classifies it.
///
/// ```ignore
/// tx.execute(&stmt).map_err(db_failure("Failed to create database column"))?;
/// ```
pub fn db_failure(message: &'static str) -> impl FnOnce(DbError) -> EngineError {
    move |source| {
        error!(error = %source, sqlstate = source.sqlstate().unwrap_or(""), "{message}");
        EngineError::from_db(message, source)
    }
}

/// Shorthand for engine operation results.
pub type EngineResult<T> = Result<T, EngineError>;

//! rectus library - collection and field registry over PostgreSQL
//!
//! Provides the datastore layer, the collection/field registries with their
//! physical DDL, the generic item store, REST-shaped handlers, and the CLI
//! command and output formatting infrastructure.

#[macro_use]
pub mod test_macros;

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod items;
pub mod logging;
pub mod output;
pub mod pagination;
pub mod registry;
pub mod schema;

#[cfg(test)]
pub mod test_utils;

//! Physical schema of collection tables.
//!
//! - `types`: abstract field type names to column types, default literals
//! - `definition`: `TableSchema` / `ColumnDescriptor`, the ordered column
//!   list of one collection
//! - `ddl`: renders `CREATE TABLE`, `ALTER TABLE` and `DROP` statements from
//!   descriptors
//!
//! Collection tables are created with the system columns only. Fields add
//! columns one at a time through `ddl::add_column`.

pub mod ddl;
mod definition;
mod types;

pub use definition::{
    is_system_column, ColumnDescriptor, ColumnSpec, ForeignKey, TableSchema, SYSTEM_COLUMNS,
};
pub use types::{format_default_value, ColumnType, DEFAULT_VARCHAR_LENGTH};

//! DDL renderers.
//!
//! Every table and column name passes through `quote_ident`, so only
//! validated `Identifier`s can reach the generated SQL.

use super::definition::{ColumnDescriptor, ForeignKey, TableSchema};
use super::types::ColumnType;
use crate::db::{quote_ident, Identifier, Statement, MAX_IDENTIFIER_LEN};

fn column_definition(column: &ColumnDescriptor) -> String {
    let mut def = format!("{} {}", quote_ident(&column.name), column.column_type.sql());
    if column.primary_key {
        def.push_str(" PRIMARY KEY");
    } else if !column.nullable {
        def.push_str(" NOT NULL");
    }
    if let Some(default) = &column.default {
        def.push_str(" DEFAULT ");
        def.push_str(default);
    }
    def
}

/// Derive an index or constraint name, cut to the identifier length limit.
///
/// Table and column names are already identifiers, so the result only
/// contains identifier characters.
pub fn constraint_name(prefix: &str, table: &Identifier, column: &Identifier, suffix: &str) -> Identifier {
    let mut name = format!("{}_{}_{}", prefix, table, column);
    if !suffix.is_empty() {
        name.push('_');
        name.push_str(suffix);
    }
    name.truncate(MAX_IDENTIFIER_LEN);
    Identifier::parse(&name).unwrap_or_else(|| Identifier::from_static("constraint"))
}

pub fn create_table(table: &TableSchema) -> Statement {
    let columns: Vec<String> = table.columns.iter().map(column_definition).collect();
    Statement::new(format!(
        "CREATE TABLE {} ({})",
        quote_ident(&table.name),
        columns.join(", ")
    ))
}

pub fn drop_table(table: &Identifier) -> Statement {
    Statement::new(format!("DROP TABLE IF EXISTS {} CASCADE", quote_ident(table)))
}

/// `ADD COLUMN` plus the unique index and foreign key the column asks for.
pub fn add_column(table: &Identifier, column: &ColumnDescriptor) -> Vec<Statement> {
    let mut statements = vec![Statement::new(format!(
        "ALTER TABLE {} ADD COLUMN {}",
        quote_ident(table),
        column_definition(column)
    ))];
    if column.unique {
        statements.push(create_unique_index(table, &column.name));
    }
    if let Some(fk) = &column.references {
        statements.push(add_foreign_key(table, &column.name, fk));
    }
    statements
}

pub fn create_unique_index(table: &Identifier, column: &Identifier) -> Statement {
    let index = constraint_name("idx", table, column, "unique");
    Statement::new(format!(
        "CREATE UNIQUE INDEX {} ON {} ({})",
        quote_ident(&index),
        quote_ident(table),
        quote_ident(column)
    ))
}

pub fn add_foreign_key(table: &Identifier, column: &Identifier, fk: &ForeignKey) -> Statement {
    let constraint = constraint_name("fk", table, column, "");
    Statement::new(format!(
        "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
        quote_ident(table),
        quote_ident(&constraint),
        quote_ident(column),
        quote_ident(&fk.table),
        quote_ident(&fk.column)
    ))
}

/// `ALTER COLUMN .. TYPE`, applied without a `USING` clause.
pub fn alter_column_type(table: &Identifier, column: &Identifier, column_type: ColumnType) -> Statement {
    Statement::new(format!(
        "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
        quote_ident(table),
        quote_ident(column),
        column_type.sql()
    ))
}

pub fn set_nullable(table: &Identifier, column: &Identifier, nullable: bool) -> Statement {
    let clause = if nullable { "DROP NOT NULL" } else { "SET NOT NULL" };
    Statement::new(format!(
        "ALTER TABLE {} ALTER COLUMN {} {}",
        quote_ident(table),
        quote_ident(column),
        clause
    ))
}

/// `default_sql` must come from `format_default_value`.
pub fn set_default(table: &Identifier, column: &Identifier, default_sql: &str) -> Statement {
    Statement::new(format!(
        "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT {}",
        quote_ident(table),
        quote_ident(column),
        default_sql
    ))
}

/// Fields created without column options have no column, hence `IF EXISTS`.
pub fn drop_column(table: &Identifier, column: &Identifier) -> Statement {
    Statement::new(format!(
        "ALTER TABLE {} DROP COLUMN IF EXISTS {} CASCADE",
        quote_ident(table),
        quote_ident(column)
    ))
}

/// Live column list of a table, in ordinal order.
pub fn describe_columns(table: &Identifier) -> Statement {
    Statement::with_params(
        "SELECT column_name, data_type, character_maximum_length, is_nullable, column_default \
         FROM information_schema.columns \
         WHERE table_schema = current_schema() AND table_name = $1 \
         ORDER BY ordinal_position",
        vec![table.as_str().into()],
    )
}

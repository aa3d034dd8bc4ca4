//! Physical schema of a collection table.
//!
//! A `TableSchema` is the ordered list of column descriptors for one
//! collection. DDL is rendered from these descriptors only.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{format_default_value, ColumnType};
use crate::db::Identifier;
use crate::error::EngineError;

/// Columns present on every collection table.
pub const SYSTEM_COLUMNS: [&str; 3] = ["id", "created_at", "updated_at"];

pub fn is_system_column(name: &str) -> bool {
    SYSTEM_COLUMNS.contains(&name)
}

/// Column options supplied with a field definition (`schema` in requests).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    #[serde(default)]
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_unique: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_column: Option<String>,
}

impl ColumnSpec {
    pub fn column_type(&self) -> ColumnType {
        ColumnType::from_abstract(&self.data_type, self.max_length)
    }

    /// The foreign-key target, when both table and column are given.
    pub fn foreign_key(&self) -> Result<Option<ForeignKey>, EngineError> {
        match (&self.foreign_table, &self.foreign_column) {
            (Some(table), Some(column)) => {
                let table = Identifier::parse(table)
                    .ok_or_else(|| EngineError::validation("Invalid foreign table name"))?;
                let column = Identifier::parse(column)
                    .ok_or_else(|| EngineError::validation("Invalid foreign column name"))?;
                Ok(Some(ForeignKey { table, column }))
            }
            _ => Ok(None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: Identifier,
    pub column: Identifier,
}

/// One column of a collection table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    pub name: Identifier,
    pub column_type: ColumnType,
    pub primary_key: bool,
    pub nullable: bool,
    /// Rendered SQL default expression.
    pub default: Option<String>,
    pub unique: bool,
    pub references: Option<ForeignKey>,
}

impl ColumnDescriptor {
    pub fn new(name: Identifier, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            primary_key: false,
            nullable: true,
            default: None,
            unique: false,
            references: None,
        }
    }

    /// Build a user column from a field's column options.
    pub fn from_spec(name: Identifier, spec: &ColumnSpec) -> Result<Self, EngineError> {
        let default = spec
            .default_value
            .as_ref()
            .map(format_default_value)
            .transpose()?;
        Ok(Self {
            name,
            column_type: spec.column_type(),
            primary_key: false,
            nullable: spec.is_nullable.unwrap_or(true),
            default,
            unique: spec.is_unique.unwrap_or(false),
            references: spec.foreign_key()?,
        })
    }

    fn with_default(mut self, expr: &str) -> Self {
        self.default = Some(expr.to_string());
        self
    }

    fn primary(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }
}

/// Ordered column list of one collection table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub name: Identifier,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableSchema {
    /// A table with only the system columns.
    pub fn with_system_columns(name: Identifier) -> Self {
        Self {
            name,
            columns: system_columns(),
        }
    }
}

fn system_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new(Identifier::from_static("id"), ColumnType::Uuid)
            .primary()
            .with_default("gen_random_uuid()"),
        ColumnDescriptor::new(Identifier::from_static("created_at"), ColumnType::Timestamp)
            .with_default("CURRENT_TIMESTAMP"),
        ColumnDescriptor::new(Identifier::from_static("updated_at"), ColumnType::Timestamp)
            .with_default("CURRENT_TIMESTAMP"),
    ]
}

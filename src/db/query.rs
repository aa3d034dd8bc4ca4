//! SQL statements and builders.
//!
//! Builders accumulate `(column, value)` pairs and assign placeholder
//! numbers while rendering, so callers never count `$n` by hand.

use super::{quote_ident, FieldValue, Identifier};

/// A rendered SQL statement with its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<FieldValue>,
}

impl Statement {
    /// A statement without parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(sql: impl Into<String>, params: Vec<FieldValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Sort direction for `ORDER BY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Tracks the parameter list while rendering.
#[derive(Default)]
struct Params {
    values: Vec<FieldValue>,
}

impl Params {
    /// Push a value and return its placeholder.
    fn bind(&mut self, value: FieldValue) -> String {
        self.values.push(value);
        format!("${}", self.values.len())
    }
}

fn render_filters(filters: Vec<(Identifier, FieldValue)>, params: &mut Params) -> String {
    if filters.is_empty() {
        return String::new();
    }
    let conditions: Vec<String> = filters
        .into_iter()
        .map(|(col, val)| format!("{} = {}", quote_ident(&col), params.bind(val)))
        .collect();
    format!(" WHERE {}", conditions.join(" AND "))
}

/// `INSERT INTO t (..) VALUES (..) [RETURNING ..]`
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table: Identifier,
    values: Vec<(Identifier, FieldValue)>,
    returning: Vec<Identifier>,
}

impl InsertBuilder {
    pub fn new(table: &Identifier) -> Self {
        Self {
            table: table.clone(),
            values: Vec::new(),
            returning: Vec::new(),
        }
    }

    pub fn value(mut self, column: Identifier, value: impl Into<FieldValue>) -> Self {
        self.values.push((column, value.into()));
        self
    }

    pub fn values<I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (Identifier, FieldValue)>,
    {
        self.values.extend(pairs);
        self
    }

    pub fn returning(mut self, columns: &[Identifier]) -> Self {
        self.returning.extend(columns.iter().cloned());
        self
    }

    pub fn build(self) -> Statement {
        let mut params = Params::default();
        let mut columns = Vec::with_capacity(self.values.len());
        let mut placeholders = Vec::with_capacity(self.values.len());
        for (col, val) in self.values {
            columns.push(quote_ident(&col));
            placeholders.push(params.bind(val));
        }

        let mut sql = if columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", quote_ident(&self.table))
        } else {
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote_ident(&self.table),
                columns.join(", "),
                placeholders.join(", ")
            )
        };
        if !self.returning.is_empty() {
            let cols: Vec<String> = self.returning.iter().map(quote_ident).collect();
            sql.push_str(" RETURNING ");
            sql.push_str(&cols.join(", "));
        }
        Statement::with_params(sql, params.values)
    }
}

/// `UPDATE t SET .. WHERE ..`
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: Identifier,
    assignments: Vec<(Identifier, FieldValue)>,
    touch: Option<Identifier>,
    filters: Vec<(Identifier, FieldValue)>,
}

impl UpdateBuilder {
    pub fn new(table: &Identifier) -> Self {
        Self {
            table: table.clone(),
            assignments: Vec::new(),
            touch: None,
            filters: Vec::new(),
        }
    }

    pub fn set_all<I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (Identifier, FieldValue)>,
    {
        self.assignments.extend(pairs);
        self
    }

    /// Also set `column = CURRENT_TIMESTAMP`.
    pub fn touch(mut self, column: Identifier) -> Self {
        self.touch = Some(column);
        self
    }

    pub fn filter(mut self, column: Identifier, value: impl Into<FieldValue>) -> Self {
        self.filters.push((column, value.into()));
        self
    }

    pub fn build(self) -> Statement {
        let mut params = Params::default();
        let mut sets: Vec<String> = self
            .assignments
            .into_iter()
            .map(|(col, val)| format!("{} = {}", quote_ident(&col), params.bind(val)))
            .collect();
        if let Some(col) = &self.touch {
            sets.push(format!("{} = CURRENT_TIMESTAMP", quote_ident(col)));
        }
        let where_clause = render_filters(self.filters, &mut params);
        let sql = format!(
            "UPDATE {} SET {}{}",
            quote_ident(&self.table),
            sets.join(", "),
            where_clause
        );
        Statement::with_params(sql, params.values)
    }
}

/// `SELECT .. FROM t [WHERE ..] [ORDER BY ..] [LIMIT $n OFFSET $m]`
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    table: Identifier,
    columns: Vec<Identifier>,
    filters: Vec<(Identifier, FieldValue)>,
    order_by: Vec<(Identifier, Direction)>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl SelectBuilder {
    pub fn new(table: &Identifier) -> Self {
        Self {
            table: table.clone(),
            columns: Vec::new(),
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Select specific columns; without this every column is selected.
    pub fn columns(mut self, columns: &[Identifier]) -> Self {
        self.columns.extend(columns.iter().cloned());
        self
    }

    pub fn filter(mut self, column: Identifier, value: impl Into<FieldValue>) -> Self {
        self.filters.push((column, value.into()));
        self
    }

    pub fn order_by(mut self, column: Identifier, direction: Direction) -> Self {
        self.order_by.push((column, direction));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn build(self) -> Statement {
        let projection = if self.columns.is_empty() {
            "*".to_string()
        } else {
            let cols: Vec<String> = self.columns.iter().map(quote_ident).collect();
            cols.join(", ")
        };
        self.render(&projection, true)
    }

    /// `SELECT COUNT(*)` with the same filters, ignoring order and paging.
    pub fn build_count(self) -> Statement {
        self.render("COUNT(*)", false)
    }

    fn render(self, projection: &str, with_paging: bool) -> Statement {
        let mut params = Params::default();
        let mut sql = format!("SELECT {} FROM {}", projection, quote_ident(&self.table));
        sql.push_str(&render_filters(self.filters, &mut params));

        if with_paging {
            if !self.order_by.is_empty() {
                let order: Vec<String> = self
                    .order_by
                    .iter()
                    .map(|(col, dir)| format!("{} {}", quote_ident(col), dir.as_sql()))
                    .collect();
                sql.push_str(" ORDER BY ");
                sql.push_str(&order.join(", "));
            }
            if let Some(limit) = self.limit {
                sql.push_str(&format!(" LIMIT {}", params.bind(FieldValue::from(limit))));
            }
            if let Some(offset) = self.offset {
                sql.push_str(&format!(" OFFSET {}", params.bind(FieldValue::from(offset))));
            }
        }
        Statement::with_params(sql, params.values)
    }
}

/// `DELETE FROM t WHERE ..`
#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    table: Identifier,
    filters: Vec<(Identifier, FieldValue)>,
}

impl DeleteBuilder {
    pub fn new(table: &Identifier) -> Self {
        Self {
            table: table.clone(),
            filters: Vec::new(),
        }
    }

    pub fn filter(mut self, column: Identifier, value: impl Into<FieldValue>) -> Self {
        self.filters.push((column, value.into()));
        self
    }

    pub fn build(self) -> Statement {
        let mut params = Params::default();
        let where_clause = render_filters(self.filters, &mut params);
        let sql = format!("DELETE FROM {}{}", quote_ident(&self.table), where_clause);
        Statement::with_params(sql, params.values)
    }
}

//! Output formatting for command results.
//!
//! Supports multiple output formats: table (human-readable), JSON, and toon.

use clap::ValueEnum;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::api::ApiResponse;

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Token-efficient toon format
    Toon,
}

/// Trait for types that can be formatted for output
pub trait Outputable: Serialize {
    /// Format as a human-readable table
    fn to_table(&self) -> String;

    /// Whether the result represents a successful operation. Drives the exit code.
    fn succeeded(&self) -> bool {
        true
    }

    /// Format according to the specified output format
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => self.to_table(),
            OutputFormat::Json => serde_json::to_string_pretty(self).unwrap_or_default(),
            OutputFormat::Toon => {
                let json_value = serde_json::to_value(self).unwrap_or_default();
                toon::encode(&json_value, None)
            }
        }
    }
}

/// Cells wider than this are cut in tables.
const MAX_CELL_WIDTH: usize = 40;

/// A handler response rendered for the terminal.
///
/// JSON and toon output are the response body as-is. The table view picks a
/// layout from the body's shape: errors and messages print as one line, lists
/// print as aligned columns, single records print as `key: value` lines.
#[derive(Debug, Clone)]
pub struct ApiOutput {
    pub response: ApiResponse,
    /// Columns for any list of records in the body. Empty means every key of
    /// the first record.
    pub columns: &'static [&'static str],
}

impl ApiOutput {
    pub fn new(response: ApiResponse, columns: &'static [&'static str]) -> Self {
        Self { response, columns }
    }
}

impl Serialize for ApiOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.response.body.serialize(serializer)
    }
}

impl Outputable for ApiOutput {
    fn succeeded(&self) -> bool {
        self.response.is_success()
    }

    fn to_table(&self) -> String {
        let body = &self.response.body;
        if let Some(error) = body.get("error") {
            return format!("Error ({}): {}", self.response.status, display(error));
        }
        if let Some(message) = body.get("message") {
            return display(message);
        }

        let mut lines = Vec::new();
        let data = body.get("data");
        if let Some(meta) = body.get("meta") {
            let shown = data.and_then(Value::as_array).map_or(0, Vec::len);
            lines.push(page_summary(meta, shown));
            lines.push(String::new());
        }
        match data {
            Some(Value::Array(rows)) => lines.extend(render_rows(rows, self.columns)),
            Some(Value::Object(map)) => render_object(map, self.columns, 0, &mut lines),
            Some(other) => lines.push(display(other)),
            None => {}
        }
        lines.join("\n")
    }
}

fn page_summary(meta: &Value, shown: usize) -> String {
    let field = |key: &str| meta.get(key).and_then(Value::as_i64).unwrap_or(0);
    format!(
        "Showing {} of {} (page {}, limit {})",
        shown,
        field("total"),
        field("page"),
        field("limit")
    )
}

/// Full text of a value: strings unquoted, null as `-`, the rest as compact JSON.
fn display(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn cell(value: Option<&Value>) -> String {
    let text = value.map_or_else(|| "-".to_string(), display);
    if text.chars().count() > MAX_CELL_WIDTH {
        let cut: String = text.chars().take(MAX_CELL_WIDTH - 3).collect();
        format!("{}...", cut)
    } else {
        text
    }
}

fn render_rows(rows: &[Value], columns: &[&str]) -> Vec<String> {
    if rows.is_empty() {
        return vec!["No results found.".to_string()];
    }

    let headers: Vec<String> = if columns.is_empty() {
        match rows.first() {
            Some(Value::Object(first)) => first.keys().cloned().collect(),
            _ => return rows.iter().map(display).collect(),
        }
    } else {
        columns.iter().map(|c| c.to_string()).collect()
    };

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| headers.iter().map(|h| cell(row.get(h.as_str()))).collect())
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: &[String]| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(line(&headers));
    lines.push(line(&widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>()));
    lines.extend(cells.iter().map(|r| line(r)));
    lines
}

fn render_object(map: &Map<String, Value>, columns: &[&str], indent: usize, lines: &mut Vec<String>) {
    let pad = " ".repeat(indent);
    for (key, value) in map {
        match value {
            Value::Object(inner) => {
                lines.push(format!("{}{}:", pad, key));
                render_object(inner, columns, indent + 2, lines);
            }
            Value::Array(rows) if !rows.is_empty() && rows.iter().all(Value::is_object) => {
                lines.push(format!("{}{}:", pad, key));
                let inner_pad = " ".repeat(indent + 2);
                lines.extend(
                    render_rows(rows, columns)
                        .into_iter()
                        .map(|l| format!("{}{}", inner_pad, l)),
                );
            }
            other => lines.push(format!("{}{}: {}", pad, key, display(other))),
        }
    }
}

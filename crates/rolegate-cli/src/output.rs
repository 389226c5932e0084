//! Rendering of command results.
//!
//! Renderers return the text instead of printing it, so commands decide
//! where it goes and serialization failures surface as errors.

use serde::Serialize;
use tabled::{Table, Tabled};

use rolegate_core::AppResult;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Outcome marker for a one-line status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The change was applied.
    Done,
    /// Nothing needed to change.
    Unchanged,
    /// The command failed.
    Failed,
}

impl Notice {
    fn prefix(self) -> &'static str {
        match self {
            Self::Done => "ok",
            Self::Unchanged => "unchanged",
            Self::Failed => "error",
        }
    }
}

/// Renders rows as a table, or as a JSON array.
pub fn rows<T: Serialize + Tabled>(items: &[T], format: OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Table if items.is_empty() => Ok("No results found.".to_string()),
        OutputFormat::Table => Ok(Table::new(items).to_string()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(items)?),
    }
}

/// Renders one value as labelled fields, or as JSON.
///
/// `fields` is only used for the table format; JSON always serializes
/// the whole `item`.
pub fn item<T: Serialize>(
    item: &T,
    format: OutputFormat,
    fields: &[(&str, String)],
) -> AppResult<String> {
    match format {
        OutputFormat::Table => Ok(field_list(fields)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(item)?),
    }
}

/// Labelled fields, one per line, values aligned after the widest label.
pub fn field_list(fields: &[(&str, String)]) -> String {
    let width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0) + 1;
    fields
        .iter()
        .map(|(label, value)| format!("  {:<width$} {value}", format!("{label}:")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prints a status line. Failures go to stderr so stdout stays parseable.
pub fn notice(kind: Notice, message: &str) {
    let line = format!("{}: {message}", kind.prefix());
    match kind {
        Notice::Failed => eprintln!("{line}"),
        Notice::Done | Notice::Unchanged => println!("{line}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Tabled)]
    struct Row {
        role: &'static str,
        count: usize,
    }

    #[test]
    fn test_empty_table() {
        let out = rows::<Row>(&[], OutputFormat::Table).unwrap();
        assert_eq!(out, "No results found.");
    }

    #[test]
    fn test_table_has_headers_and_values() {
        let out = rows(&[Row { role: "Manager", count: 2 }], OutputFormat::Table).unwrap();
        assert!(out.contains("role"));
        assert!(out.contains("Manager"));
    }

    #[test]
    fn test_json_rows_are_an_array() {
        let out = rows(&[Row { role: "Staff", count: 0 }], OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["role"], "Staff");
        assert_eq!(value[0]["count"], 0);

        let empty = rows::<Row>(&[], OutputFormat::Json).unwrap();
        assert_eq!(empty, "[]");
    }

    #[test]
    fn test_fields_align_to_widest_label() {
        let out = field_list(&[
            ("Role", "Manager".to_string()),
            ("Effective", "VIEW_REPORTS".to_string()),
        ]);
        assert_eq!(out, "  Role:      Manager\n  Effective: VIEW_REPORTS");
    }

    #[test]
    fn test_item_json_ignores_fields() {
        let out = item(
            &Row { role: "Admin", count: 1 },
            OutputFormat::Json,
            &[("Unused", String::new())],
        )
        .unwrap();
        assert!(!out.contains("Unused"));
        assert!(out.contains("\"Admin\""));
    }
}

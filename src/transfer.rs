//! JSON export and import, and CSV export.

use crate::error::TransferError;
use crate::model::Expense;
use crate::storage::DATA_VERSION;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

const CSV_HEADER: [&str; 7] = [
    "Date",
    "Description",
    "Amount",
    "Category",
    "Recurring",
    "Frequency",
    "Notes",
];

/// The file formats that expenses can be exported to.
#[derive(
    Default, Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

serde_plain::derive_display_from_serialize!(ExportFormat);
serde_plain::derive_fromstr_from_deserialize!(ExportFormat);

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    /// The default export file name, e.g. `budget-tracker-1754006400000.json`.
    pub fn file_name(&self, at: DateTime<Utc>) -> String {
        format!("budget-tracker-{}.{}", at.timestamp_millis(), self.extension())
    }

    /// Renders `expenses` in this format.
    pub fn render(&self, expenses: &[Expense], at: DateTime<Utc>) -> crate::Result<String> {
        match self {
            ExportFormat::Json => export_json(expenses, at),
            ExportFormat::Csv => export_csv(expenses),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    version: &'a str,
    exported_at: DateTime<Utc>,
    expenses: &'a [Expense],
}

/// Serializes every expense into the pretty-printed export document.
pub fn export_json(expenses: &[Expense], exported_at: DateTime<Utc>) -> crate::Result<String> {
    let doc = ExportDocument {
        version: DATA_VERSION,
        exported_at,
        expenses,
    };
    let json = serde_json::to_string_pretty(&doc).context("Unable to serialize the export")?;
    debug!("Exported {} expenses as JSON", expenses.len());
    Ok(json)
}

/// Writes one CSV row per expense. Every field is quoted, with embedded quotes doubled.
pub fn export_csv(expenses: &[Expense]) -> crate::Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());
    writer
        .write_record(CSV_HEADER)
        .context("Unable to write the CSV header")?;
    for e in expenses {
        writer
            .write_record([
                e.date().to_string(),
                e.description().to_string(),
                e.amount().to_string(),
                e.category_key().to_string(),
                e.recurring().to_string(),
                e.frequency().to_string(),
                e.notes().to_string(),
            ])
            .with_context(|| format!("Unable to write expense {} as CSV", e.id()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to flush the CSV writer: {e}"))?;
    debug!("Exported {} expenses as CSV", expenses.len());
    String::from_utf8(bytes).context("The CSV output is not valid UTF-8")
}

/// Only the `expenses` array is required. `version` and `exportedAt` are informational.
#[derive(Deserialize)]
struct ImportDocument {
    #[serde(default)]
    version: Option<String>,
    expenses: serde_json::Value,
}

/// Parses an exported document into the expenses it contains.
///
/// Fails with `InvalidFormat` when the text is not JSON, when `expenses` is missing or is not an
/// array, when an element is not a valid expense, or when two elements share an id.
pub fn parse_import(data: &str) -> Result<Vec<Expense>, TransferError> {
    let doc: ImportDocument = serde_json::from_str(data)
        .map_err(|e| TransferError::InvalidFormat(format!("not an export document: {e}")))?;
    if let Some(version) = doc.version.as_deref().filter(|v| *v != DATA_VERSION) {
        debug!("Importing a document with version '{version}'");
    }

    let serde_json::Value::Array(items) = doc.expenses else {
        return Err(TransferError::InvalidFormat(
            "'expenses' is not an array".to_string(),
        ));
    };

    let mut expenses = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let expense: Expense = serde_json::from_value(item)
            .map_err(|e| TransferError::InvalidFormat(format!("expense {i} is invalid: {e}")))?;
        expenses.push(expense);
    }

    let mut seen = HashSet::new();
    for expense in &expenses {
        if !expense.id().is_empty() && !seen.insert(expense.id()) {
            return Err(TransferError::InvalidFormat(format!(
                "the id '{}' appears more than once",
                expense.id()
            )));
        }
    }
    Ok(expenses)
}

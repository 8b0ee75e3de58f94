//! The persistence capability behind the expense store.
//!
//! The store only ever talks to a `Storage`. `FileStorage` keeps the data in a JSON file in the
//! data directory; `MemoryStorage` holds it in memory, which lets the whole app run top-to-bottom
//! without touching the disk.

mod file;
mod memory;

use crate::error::StorageError;
use crate::model::Expense;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// The version written into the stored document.
pub const DATA_VERSION: &str = "1.0";

/// A place where the full list of expenses is kept between runs.
pub trait Storage {
    /// Reads all stored expenses. An absent, unreadable or corrupt store yields an empty list and a
    /// record that is not a valid expense is left out; the failure is logged, never returned.
    fn load(&self) -> Vec<Expense>;

    /// Replaces the stored expenses with `expenses`.
    fn save(&mut self, expenses: &[Expense]) -> Result<(), StorageError>;

    /// Reports how much is stored.
    fn info(&self) -> StorageInfo;
}

/// Storage usage, as shown on the settings screen.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct StorageInfo {
    pub item_count: usize,
    pub size_bytes: u64,
}

impl StorageInfo {
    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }

    pub fn size_mb(&self) -> f64 {
        self.size_kb() / 1024.0
    }
}

/// The stored document: `{ "version": "1.0", "expenses": [...] }`.
#[derive(Serialize)]
struct Document<'a> {
    version: &'a str,
    expenses: &'a [Expense],
}

/// Accepts the current document layout and the older layout, which is a bare array. Elements are
/// kept as raw values so that one bad record does not cost the rest.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredData {
    Document {
        #[serde(default)]
        version: Option<String>,
        expenses: Vec<serde_json::Value>,
    },
    Legacy(Vec<serde_json::Value>),
}

/// The records read from a stored document and how many could not be read.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct Decoded {
    pub(crate) expenses: Vec<Expense>,
    pub(crate) skipped: usize,
}

/// Serializes `expenses` into the stored document layout.
pub(crate) fn encode(expenses: &[Expense]) -> crate::Result<String> {
    let doc = Document {
        version: DATA_VERSION,
        expenses,
    };
    serde_json::to_string(&doc).context("Unable to serialize expenses")
}

/// Parses either stored document layout. Fails only when the document as a whole is unreadable;
/// records that are not valid expenses are skipped and counted.
pub(crate) fn decode(data: &str) -> crate::Result<Decoded> {
    let stored: StoredData =
        serde_json::from_str(data).context("The stored expense data is not valid")?;
    let items = match stored {
        StoredData::Document { version, expenses } => {
            if let Some(version) = version.filter(|v| v != DATA_VERSION) {
                warn!("Stored data has version '{version}', expected '{DATA_VERSION}'");
            }
            expenses
        }
        StoredData::Legacy(expenses) => {
            debug!("Reading {} expenses from the legacy layout", expenses.len());
            expenses
        }
    };

    let mut decoded = Decoded {
        expenses: Vec::with_capacity(items.len()),
        skipped: 0,
    };
    for (i, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Expense>(item) {
            Ok(expense) => decoded.expenses.push(expense),
            Err(e) => {
                warn!("Skipping stored expense {i}, it is not valid: {e}");
                decoded.skipped += 1;
            }
        }
    }
    Ok(decoded)
}

/// Fails with `QuotaExceeded` when `needed` exceeds `quota`.
pub(crate) fn check_quota(needed: usize, quota: Option<u64>) -> Result<(), StorageError> {
    let needed = needed as u64;
    match quota {
        Some(limit) if needed > limit => Err(StorageError::QuotaExceeded { needed, limit }),
        _ => Ok(()),
    }
}

//! Implements the `Storage` trait using in-memory data.
//!
//! Note: this is compiled even in the "production" version of this crate so that callers can run
//! the store and tracker without a data directory.

use crate::error::StorageError;
use crate::model::Expense;
use crate::storage::{check_quota, decode, encode, Storage, StorageInfo};
use tracing::error;

/// Holds the serialized document in memory, exactly as `FileStorage` would write it to disk.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    data: Option<String>,
    quota: Option<u64>,
    unavailable: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `raw` as the stored document, which need not be valid.
    pub fn with_contents(raw: impl Into<String>) -> Self {
        Self {
            data: Some(raw.into()),
            ..Self::default()
        }
    }

    /// Limits the stored document to `quota` bytes.
    pub fn with_quota(mut self, quota: u64) -> Self {
        self.quota = Some(quota);
        self
    }

    /// When `unavailable` is true every save is rejected.
    pub fn set_unavailable(&mut self, unavailable: bool) {
        self.unavailable = unavailable;
    }

    /// The stored document, if anything has been stored.
    pub fn contents(&self) -> Option<&str> {
        self.data.as_deref()
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Vec<Expense> {
        let Some(data) = &self.data else {
            return Vec::new();
        };
        match decode(data) {
            Ok(decoded) => {
                if decoded.skipped > 0 {
                    error!("Skipped {} unreadable expenses", decoded.skipped);
                }
                decoded.expenses
            }
            Err(e) => {
                error!("Failed to load expenses: {e:#}");
                Vec::new()
            }
        }
    }

    fn save(&mut self, expenses: &[Expense]) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable(
                "in-memory storage is switched off".to_string(),
            ));
        }
        let data = encode(expenses).map_err(|e| StorageError::Unavailable(format!("{e:#}")))?;
        check_quota(data.len(), self.quota)?;
        self.data = Some(data);
        Ok(())
    }

    fn info(&self) -> StorageInfo {
        StorageInfo {
            item_count: self.load().len(),
            size_bytes: self.data.as_ref().map(|d| d.len() as u64).unwrap_or_default(),
        }
    }
}

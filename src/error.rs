//! Error types for the budget tracker.
//!
//! Library internals propagate `anyhow::Error` with context. The domain failures a caller may want
//! to match on (`StoreError`, `StorageError`, `TransferError`) are typed. At the public boundary,
//! `IntoResult::pub_result` tags a failure with an `ErrorType` so the user gets an actionable
//! message.

use crate::model::ExpenseId;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the persistence medium.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum StorageError {
    /// The serialized document is larger than the medium accepts.
    #[error("storage is full: {needed} bytes needed but the limit is {limit} bytes")]
    QuotaExceeded { needed: u64, limit: u64 },
    /// The medium rejected the write.
    #[error("storage is unavailable: {0}")]
    Unavailable(String),
}

/// Failures of the expense store's mutating operations.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("no expense with id '{0}'")]
    NotFound(ExpenseId),
    #[error("an expense with id '{0}' already exists")]
    DuplicateId(ExpenseId),
    /// The in-memory change was applied but could not be persisted.
    #[error("the change was not saved: {0}")]
    Storage(#[from] StorageError),
}

/// Failures when reading an import payload.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum TransferError {
    #[error("invalid import format: {0}")]
    InvalidFormat(String),
}

/// The category of a failure that is reported to the user.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The data directory or its configuration is missing or invalid.
    Config,
    /// The expense data could not be read or saved.
    Storage,
    /// The requested expense does not exist.
    NotFound,
    /// An import file was rejected.
    Import,
    /// An export file could not be written.
    Export,
    /// The user supplied an argument that cannot be acted upon.
    Request,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

impl ErrorType {
    fn hint(&self) -> &'static str {
        match self {
            ErrorType::Config => "run 'budget init' to create the data directory",
            ErrorType::Storage => "check free disk space and the storage quota in config.json",
            ErrorType::NotFound => "run 'budget list' to see expense ids",
            ErrorType::Import => "the file must be a JSON export containing an 'expenses' array",
            ErrorType::Export => "check that the output directory exists and is writable",
            ErrorType::Request => "run 'budget --help' for usage",
        }
    }
}

/// Converts an internal result into one that is fit to be shown to the user.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| {
            let e: Error = e.into();
            e.context(PublicError(error_type))
        })
    }
}

/// The outermost context of a public error.
#[derive(Debug, Clone, Copy)]
struct PublicError(ErrorType);

impl Display for PublicError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error ({})", self.0, self.0.hint())
    }
}

/// Returns the `ErrorType` attached by `pub_result`, if any.
pub fn error_type(e: &Error) -> Option<ErrorType> {
    e.downcast_ref::<PublicError>().map(|p| p.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pub_result_tags_error() {
        let result: std::result::Result<(), StoreError> =
            Err(StoreError::NotFound(ExpenseId::new("abc")));
        let e = result.pub_result(ErrorType::NotFound).unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::NotFound));
        let message = format!("{e:#}");
        assert!(message.contains("not_found error"), "{message}");
        assert!(message.contains("no expense with id 'abc'"), "{message}");
    }

    #[test]
    fn test_untagged_error_has_no_type() {
        let e = anyhow::anyhow!("boom");
        assert_eq!(error_type(&e), None);
    }

    #[test]
    fn test_storage_error_converts_to_store_error() {
        let e: StoreError = StorageError::QuotaExceeded {
            needed: 10,
            limit: 5,
        }
        .into();
        assert_eq!(
            e.to_string(),
            "the change was not saved: storage is full: 10 bytes needed but the limit is 5 bytes"
        );
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::Import.to_string(), "import");
        assert_eq!("storage".parse::<ErrorType>().unwrap(), ErrorType::Storage);
    }
}

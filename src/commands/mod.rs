//! Command handlers for the budget CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod data;
mod expenses;
mod init;
mod reports;

use crate::args::ViewArgs;
use crate::error::{ErrorType, IntoResult, StoreError};
use crate::model::YearMonth;
use crate::storage::FileStorage;
use crate::store::StoreResult;
use crate::tracker::{ImportError, Tracker};
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{info, trace};

pub use data::{clear, export, import, info, StorageReport};
pub use expenses::{add, delete, update};
pub use init::init;
pub use reports::{breakdown, list, summary, Breakdown, MonthSummary};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to stdout.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            match serde_json::to_string_pretty(structure) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::error!("Unable to serialize the command output: {e}"),
            }
        }
    }
}

/// Opens the tracker over the configured data file, looking at the current month.
pub(crate) fn open(config: &Config) -> Tracker<FileStorage> {
    Tracker::open(config.storage(), YearMonth::current())
}

/// Opens the tracker over the configured data file with the view described by `args`.
pub(crate) fn open_tracker(config: &Config, args: &ViewArgs) -> Tracker<FileStorage> {
    trace!("{args:?}");
    let mut tracker = open(config);
    if let Some(month) = args.month() {
        tracker.go_to_month(month);
    }
    tracker.set_month(args.shift());
    if let Some(filter) = args.category() {
        tracker.set_filter(filter.clone());
    }
    if let Some(search) = args.search() {
        tracker.set_search(search);
    }
    tracker
}

/// Tags a store failure with the `ErrorType` that matches its cause.
pub(crate) fn store_result<T>(result: StoreResult<T>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) => {
            let error_type = match &e {
                StoreError::NotFound(_) => ErrorType::NotFound,
                StoreError::DuplicateId(_) => ErrorType::Request,
                StoreError::Storage(_) => ErrorType::Storage,
            };
            Err(e).pub_result(error_type)
        }
    }
}

/// Tags an import failure: a rejected document is an `Import` error, a failed write is whatever
/// the store reports.
pub(crate) fn import_result<T>(result: std::result::Result<T, ImportError>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(ImportError::Format(e)) => Err(e).pub_result(ErrorType::Import),
        Err(ImportError::Store(e)) => store_result(Err(e)),
    }
}

fn plural(count: usize, one: &str, many: &str) -> String {
    format!("{count} {}", if count == 1 { one } else { many })
}

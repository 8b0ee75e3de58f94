//! budget-tracker: a local personal expense tracker.
//!
//! The library holds the expense store, the view state, and the pure filter and aggregation
//! engine that turns them into month summaries and category breakdowns. Persistence goes through
//! the `Storage` trait; the `budget` binary wires it to a JSON file in the data directory.

pub mod args;
mod backup;
pub mod commands;
mod config;
pub mod engine;
mod error;
pub mod model;
pub mod storage;
pub mod store;
pub mod tracker;
pub mod transfer;
mod utils;
pub mod view;


pub use config::Config;
pub use error::{
    error_type, Error, ErrorType, IntoResult, Result, StorageError, StoreError, TransferError,
};
pub use store::ExpenseStore;
pub use tracker::{Snapshot, Tracker};

//! The tracker owns one expense store and one view state and exposes every user action. After any
//! action the caller asks for a `Snapshot`, which is everything a screen needs to redraw.

use crate::engine::{self, CategorySlice, Summary};
use crate::error::{StoreError, TransferError};
use crate::model::{Expense, ExpenseId, ExpenseUpdates, NewExpense, YearMonth};
use crate::storage::{Storage, StorageInfo};
use crate::store::{ExpenseStore, StoreResult};
use crate::transfer;
use crate::view::{CategoryFilter, ViewMode, ViewState};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// The visible expenses, newest first, with their summary and category breakdown.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub view: ViewState,
    pub month_name: String,
    pub visible: Vec<Expense>,
    pub summary: Summary,
    pub breakdown: Vec<CategorySlice>,
}

/// Failures of `Tracker::import`.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Format(#[from] TransferError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug)]
pub struct Tracker<S: Storage> {
    store: ExpenseStore<S>,
    view: ViewState,
}

impl<S: Storage> Tracker<S> {
    /// Loads the store from `storage` and starts with a view of `month`.
    pub fn open(storage: S, month: YearMonth) -> Self {
        Self {
            store: ExpenseStore::open(storage),
            view: ViewState::new(month),
        }
    }

    pub fn store(&self) -> &ExpenseStore<S> {
        &self.store
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn storage_info(&self) -> StorageInfo {
        self.store.storage_info()
    }

    pub fn add(&mut self, new: NewExpense) -> StoreResult<Expense> {
        self.store.add(new)
    }

    pub fn update(&mut self, id: &ExpenseId, updates: ExpenseUpdates) -> StoreResult<Expense> {
        self.store.update(id, updates)
    }

    pub fn remove(&mut self, id: &ExpenseId) -> StoreResult<Option<Expense>> {
        self.store.remove(id)
    }

    /// Replaces all expenses with those in the export document `data` and returns how many were
    /// imported. Nothing changes when the document is rejected.
    pub fn import(&mut self, data: &str) -> Result<usize, ImportError> {
        let expenses = transfer::parse_import(data)?;
        let count = expenses.len();
        self.store.replace_all(expenses)?;
        info!("Imported {count} expenses");
        Ok(count)
    }

    pub fn clear_all(&mut self) -> StoreResult<()> {
        self.store.clear()
    }

    pub fn set_month(&mut self, delta: i32) {
        self.view.set_month(delta);
    }

    pub fn go_to_month(&mut self, month: YearMonth) {
        self.view.go_to_month(month);
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.view.set_filter(filter);
    }

    pub fn toggle_filter(&mut self, key: &str) {
        self.view.toggle_filter(key);
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.view.set_search(query);
    }

    pub fn clear_filters(&mut self) {
        self.view.clear_filters();
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.view.set_view(view);
    }

    /// Runs the engine against the current store and view.
    pub fn snapshot(&self) -> Snapshot {
        let mut visible = engine::select_visible(self.store.expenses(), &self.view);
        engine::sort_newest_first(&mut visible);
        let summary = engine::summarize(&visible);
        let breakdown = engine::breakdown(&visible);
        debug!(
            "{} of {} expenses visible in {}",
            visible.len(),
            self.store.len(),
            self.view.current_month()
        );
        Snapshot {
            view: self.view.clone(),
            month_name: self.view.current_month().long_name(),
            visible,
            summary,
            breakdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Category};
    use crate::storage::MemoryStorage;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::str::FromStr;

    fn new(date: &str, description: &str, amount: &str, category: &str) -> NewExpense {
        NewExpense::new(
            NaiveDate::from_str(date).unwrap(),
            description,
            Amount::from_str(amount).unwrap(),
            category,
        )
    }

    fn tracker() -> Tracker<MemoryStorage> {
        let mut tracker = Tracker::open(MemoryStorage::new(), YearMonth::new(2025, 8).unwrap());
        tracker
            .add(new("2025-08-01", "Rent Payment", "1500", "housing").recurring(None))
            .unwrap();
        tracker
            .add(new("2025-08-05", "DOLLARAMA # 741", "24.58", "shopping"))
            .unwrap();
        tracker
            .add(new("2025-09-08", "Netflix", "17.99", "subscriptions").recurring(None))
            .unwrap();
        tracker
    }

    #[test]
    fn test_snapshot_scenario() {
        let tracker = tracker();
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.month_name, "August 2025");
        assert_eq!(snapshot.visible.len(), 2);
        assert_eq!(snapshot.visible[0].description(), "DOLLARAMA # 741");
        assert_eq!(snapshot.summary.total, Amount::from_str("1524.58").unwrap());
        assert_eq!(snapshot.summary.top_category, Some(Category::Housing));
        assert_eq!(snapshot.breakdown.len(), 2);
    }

    #[test]
    fn test_month_navigation_changes_snapshot() {
        let mut tracker = tracker();
        tracker.set_month(1);
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.visible.len(), 1);
        assert_eq!(snapshot.visible[0].description(), "Netflix");
        tracker.set_month(-1);
        assert_eq!(tracker.snapshot().visible.len(), 2);
    }

    #[test]
    fn test_toggle_breakdown_slice() {
        let mut tracker = tracker();
        let key = tracker.snapshot().breakdown[1].key.clone();
        tracker.toggle_filter(&key);
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.summary.total, Amount::from_str("24.58").unwrap());
        assert_eq!(snapshot.summary.transaction_count, 1);
        tracker.toggle_filter(&key);
        assert_eq!(tracker.snapshot().visible.len(), 2);
    }

    #[test]
    fn test_remove_unknown_id_leaves_snapshot() {
        let mut tracker = tracker();
        let before = tracker.snapshot();
        assert!(tracker.remove(&ExpenseId::new("missing")).unwrap().is_none());
        assert_eq!(tracker.snapshot(), before);
    }

    #[test]
    fn test_export_import_round_trip() {
        let source = tracker();
        let at = Utc.with_ymd_and_hms(2025, 8, 31, 0, 0, 0).unwrap();
        let json = transfer::export_json(source.store().expenses(), at).unwrap();

        let mut target = Tracker::open(MemoryStorage::new(), YearMonth::new(2025, 8).unwrap());
        target.add(new("2020-01-01", "Gone", "1", "other")).unwrap();
        assert_eq!(target.import(&json).unwrap(), 3);
        assert_eq!(target.store().expenses(), source.store().expenses());
        assert_eq!(target.storage_info().item_count, 3);
    }

    #[test]
    fn test_rejected_import_changes_nothing() {
        let mut tracker = tracker();
        let err = tracker.import(r#"{"expenses": "nope"}"#).unwrap_err();
        assert!(matches!(err, ImportError::Format(_)));
        assert_eq!(tracker.store().len(), 3);
    }

    #[test]
    fn test_clear_all() {
        let mut tracker = tracker();
        tracker.clear_all().unwrap();
        assert!(tracker.store().is_empty());
        assert_eq!(tracker.snapshot().summary, Summary::default());
        assert_eq!(tracker.storage_info().item_count, 0);
    }
}

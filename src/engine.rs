//! Filtering and aggregation.
//!
//! These functions are pure: given the same expenses and view state they return the same result
//! and touch nothing else, so they can be called after every change without bookkeeping.

use crate::model::{Amount, Category, Expense};
use crate::view::ViewState;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Returns the expenses in the view's month that pass its category filter and search text, in
/// store order.
///
/// The search text is trimmed and matched as a substring of the description (case-insensitive),
/// the amount's decimal text, or the category's display name (case-insensitive).
pub fn select_visible(expenses: &[Expense], view: &ViewState) -> Vec<Expense> {
    let month = view.current_month();
    let query = view.search().trim().to_lowercase();
    expenses
        .iter()
        .filter(|e| month.contains(e.date()))
        .filter(|e| view.filter().matches(e.category_key()))
        .filter(|e| query.is_empty() || matches_search(e, &query))
        .cloned()
        .collect()
}

/// `query` must already be lowercase.
fn matches_search(expense: &Expense, query: &str) -> bool {
    expense.description().to_lowercase().contains(query)
        || expense.amount().search_text().contains(query)
        || expense.category().name().to_lowercase().contains(query)
}

/// Sorts newest first. The sort is stable, so expenses on the same date keep their store order.
pub fn sort_newest_first(expenses: &mut [Expense]) {
    expenses.sort_by(|a, b| b.date().cmp(&a.date()));
}

/// The total and number of expenses in one category.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub total: Amount,
    pub count: usize,
}

/// Statistics for a set of visible expenses.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total: Amount,
    pub transaction_count: usize,
    pub recurring_total: Amount,
    pub recurring_count: usize,
    /// Only categories with at least one visible expense appear. Unknown category keys are
    /// counted under `Category::Other`.
    pub per_category: BTreeMap<Category, CategoryTotal>,
    /// The category with the largest total. Ties go to the alphabetically first category key.
    pub top_category: Option<Category>,
}

impl Summary {
    /// The total of the top category, or zero when there is none.
    pub fn top_category_total(&self) -> Amount {
        self.top_category
            .and_then(|c| self.per_category.get(&c))
            .map(|t| t.total)
            .unwrap_or_default()
    }
}

/// Computes the summary of `visible` in a single pass.
pub fn summarize(visible: &[Expense]) -> Summary {
    let mut summary = Summary::default();
    for expense in visible {
        let amount = expense.amount();
        summary.total += amount;
        summary.transaction_count += 1;
        if expense.recurring() {
            summary.recurring_total += amount;
            summary.recurring_count += 1;
        }
        let entry = summary.per_category.entry(expense.category()).or_default();
        entry.total += amount;
        entry.count += 1;
    }
    summary.top_category = top_category(&summary.per_category);
    summary
}

fn top_category(per_category: &BTreeMap<Category, CategoryTotal>) -> Option<Category> {
    per_category
        .iter()
        .max_by(|(a_cat, a), (b_cat, b)| {
            // larger total wins; on a tie the smaller key is considered greater
            a.total
                .cmp(&b.total)
                .then_with(|| b_cat.key().cmp(a_cat.key()))
        })
        .map(|(category, _)| *category)
}

/// One category's share of the visible spending. A treemap sizes a rectangle by `total`; a ranked
/// list shows the slices in order.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CategorySlice {
    pub category: Category,
    /// The key to pass to `ViewState::toggle_filter` when this slice is selected.
    pub key: String,
    pub name: String,
    pub emoji: String,
    pub color: String,
    pub total: Amount,
    pub count: usize,
    /// Percent of the overall total, rounded to one decimal place.
    pub percent: Decimal,
}

/// Builds the per-category slices for `visible`, largest total first, ties by category key.
pub fn breakdown(visible: &[Expense]) -> Vec<CategorySlice> {
    let summary = summarize(visible);
    let overall = summary.total.value();
    let mut slices: Vec<CategorySlice> = summary
        .per_category
        .iter()
        .map(|(category, t)| CategorySlice {
            category: *category,
            key: category.key().to_string(),
            name: category.name().to_string(),
            emoji: category.emoji().to_string(),
            color: category.color().to_string(),
            total: t.total,
            count: t.count,
            percent: percent_of(t.total.value(), overall),
        })
        .collect();
    slices.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.key.cmp(&b.key))
    });
    slices
}

fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part * Decimal::ONE_HUNDRED / whole).round_dp(1)
}

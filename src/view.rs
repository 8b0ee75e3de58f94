//! The view state: which month, category and search text the user is looking at, and how the
//! category breakdown is displayed. The view state is ephemeral and is never persisted.

use crate::model::{Category, YearMonth};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const ALL: &str = "all";

/// Restricts the visible expenses to one category key, or shows all of them.
#[derive(Default, Debug, Clone, Eq, PartialEq, Hash)]
pub enum CategoryFilter {
    #[default]
    All,
    /// A category key, compared exactly against the key stored on each expense.
    Only(String),
}

impl CategoryFilter {
    pub fn only(category: Category) -> Self {
        CategoryFilter::Only(category.key().to_string())
    }

    /// Returns true if an expense with `key` passes the filter.
    pub fn matches(&self, key: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(only) => only == key,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, CategoryFilter::All)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str(ALL),
            CategoryFilter::Only(key) => f.write_str(key),
        }
    }
}

/// `all` is the sentinel for no filter; anything else is taken as a category key.
impl FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(if s.is_empty() || s == ALL {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(s.to_string())
        })
    }
}

impl Serialize for CategoryFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CategoryFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or_default())
    }
}

/// How the category breakdown is presented. This never affects which expenses are visible.
#[derive(
    Default, Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Proportional rectangles, one per category.
    #[default]
    Treemap,
    /// Categories ranked by total.
    List,
}

serde_plain::derive_display_from_serialize!(ViewMode);
serde_plain::derive_fromstr_from_deserialize!(ViewMode);

/// The current month, category filter, search text and view mode.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    current_month: YearMonth,
    filter: CategoryFilter,
    search: String,
    view: ViewMode,
}

impl ViewState {
    /// A view of `month` with no filter or search.
    pub fn new(month: YearMonth) -> Self {
        Self {
            current_month: month,
            filter: CategoryFilter::All,
            search: String::new(),
            view: ViewMode::default(),
        }
    }

    pub fn current_month(&self) -> YearMonth {
        self.current_month
    }

    pub fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    /// Moves the month cursor by `delta` whole months.
    pub fn set_month(&mut self, delta: i32) {
        self.current_month = self.current_month.shift(delta);
    }

    /// Jumps straight to `month`.
    pub fn go_to_month(&mut self, month: YearMonth) {
        self.current_month = month;
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.filter = filter;
    }

    /// Selects `key`, or clears all filters when `key` is already selected. This is what clicking
    /// a category in the breakdown does.
    pub fn toggle_filter(&mut self, key: &str) {
        if self.filter.matches(key) && !self.filter.is_all() {
            self.clear_filters();
        } else {
            self.filter = CategoryFilter::Only(key.to_string());
        }
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    /// Resets the category filter and search text. The month is left alone.
    pub fn clear_filters(&mut self) {
        self.filter = CategoryFilter::All;
        self.search.clear();
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.view = view;
    }
}

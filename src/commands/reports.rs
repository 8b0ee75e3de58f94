//! The list, summary and breakdown commands. Each one looks at a single month, optionally narrowed
//! by category and search text.

use crate::args::{BreakdownArgs, ViewArgs};
use crate::commands::{open_tracker, plural, Out};
use crate::engine::CategorySlice;
use crate::model::{Amount, Category, Expense};
use crate::view::{CategoryFilter, ViewMode};
use crate::{Config, Result};
use serde::{Deserialize, Serialize};

/// Lists the visible expenses, newest first.
pub async fn list(config: Config, args: ViewArgs) -> Result<Out<Vec<Expense>>> {
    let snapshot = open_tracker(&config, &args).snapshot();
    let message = format!(
        "{} in {}{}",
        plural(snapshot.visible.len(), "expense", "expenses"),
        snapshot.month_name,
        narrowing(snapshot.view.filter(), snapshot.view.search())
    );
    Ok(Out::new(message, snapshot.visible))
}

/// The summary cards for one month.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub month: String,
    pub total: Amount,
    pub transaction_count: usize,
    pub recurring_total: Amount,
    pub recurring_count: usize,
    pub top_category: Option<Category>,
    pub top_category_total: Amount,
}

/// Summarizes the visible expenses.
pub async fn summary(config: Config, args: ViewArgs) -> Result<Out<MonthSummary>> {
    let snapshot = open_tracker(&config, &args).snapshot();
    let s = &snapshot.summary;
    let top = match s.top_category {
        Some(c) => format!(
            ", most on {} {} ({})",
            c.emoji(),
            c.name(),
            s.top_category_total().currency()
        ),
        None => String::new(),
    };
    let message = format!(
        "{}: {} spent over {}, {} of it recurring{top}",
        snapshot.month_name,
        s.total.currency(),
        plural(s.transaction_count, "transaction", "transactions"),
        s.recurring_total.currency(),
    );
    let structure = MonthSummary {
        month: snapshot.view.current_month().to_string(),
        total: s.total,
        transaction_count: s.transaction_count,
        recurring_total: s.recurring_total,
        recurring_count: s.recurring_count,
        top_category: s.top_category,
        top_category_total: s.top_category_total(),
    };
    Ok(Out::new(message, structure))
}

/// The category breakdown and how it is meant to be displayed.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub month: String,
    pub view: ViewMode,
    pub slices: Vec<CategorySlice>,
}

/// Divides the visible spending between categories, largest first.
pub async fn breakdown(config: Config, args: BreakdownArgs) -> Result<Out<Breakdown>> {
    let mut tracker = open_tracker(&config, args.view_args());
    tracker.set_view(args.view());
    let snapshot = tracker.snapshot();
    let message = if snapshot.breakdown.is_empty() {
        format!("No expenses in {}", snapshot.month_name)
    } else {
        let lines: Vec<String> = snapshot
            .breakdown
            .iter()
            .map(|s| {
                format!(
                    "{} {}: {} ({}%)",
                    s.emoji,
                    s.name,
                    s.total.currency(),
                    s.percent
                )
            })
            .collect();
        format!("{}\n{}", snapshot.month_name, lines.join("\n"))
    };
    let structure = Breakdown {
        month: snapshot.view.current_month().to_string(),
        view: snapshot.view.view(),
        slices: snapshot.breakdown,
    };
    Ok(Out::new(message, structure))
}

fn narrowing(filter: &CategoryFilter, search: &str) -> String {
    let mut s = String::new();
    if let CategoryFilter::Only(key) = filter {
        s.push_str(&format!(" in category '{}'", key));
    }
    if !search.trim().is_empty() {
        s.push_str(&format!(" matching '{}'", search.trim()));
    }
    s
}

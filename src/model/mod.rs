//! Types that represent the core data model, such as `Expense` and `Category`.
mod amount;
mod category;
mod expense;
mod month;

pub use amount::{Amount, AmountError};
pub use category::Category;
pub use expense::{Expense, ExpenseId, ExpenseUpdates, NewExpense, DEFAULT_FREQUENCY};
pub use month::YearMonth;

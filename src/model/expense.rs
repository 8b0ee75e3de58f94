use crate::model::{Amount, Category};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The cadence assumed for a recurring expense when none is given.
pub const DEFAULT_FREQUENCY: &str = "monthly";

/// The opaque, unique identifier of an expense.
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(String);

impl ExpenseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a fresh id from the current time in milliseconds followed by a random base-36
    /// suffix, e.g. `1754000000000k3j9x0q2mz`. Collisions are not prevented, only improbable.
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis();
        let random = uuid::Uuid::new_v4().as_u64_pair().0;
        Self(format!("{millis}{}", to_base36(random)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An id that was never assigned, e.g. a record imported without one.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExpenseId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// One recorded expense.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(default)]
    pub(crate) id: ExpenseId,
    pub(crate) date: NaiveDate,
    #[serde(default)]
    pub(crate) description: String,
    pub(crate) amount: Amount,
    /// The category key as written. See `Category::resolve`.
    pub(crate) category: String,
    #[serde(default)]
    pub(crate) recurring: bool,
    #[serde(default = "default_frequency", deserialize_with = "frequency_or_default")]
    pub(crate) frequency: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub(crate) notes: String,
}

fn default_frequency() -> String {
    DEFAULT_FREQUENCY.to_string()
}

fn frequency_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(default_frequency))
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Expense {
    pub fn id(&self) -> &ExpenseId {
        &self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// The category key exactly as stored.
    pub fn category_key(&self) -> &str {
        &self.category
    }

    /// The resolved category. Unknown keys resolve to `Category::Other`.
    pub fn category(&self) -> Category {
        Category::resolve(&self.category)
    }

    pub fn recurring(&self) -> bool {
        self.recurring
    }

    pub fn frequency(&self) -> &str {
        &self.frequency
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub(crate) fn set_id(&mut self, id: ExpenseId) {
        self.id = id;
    }
}

/// The fields of an expense that is about to be added. When `id` is `None` the store assigns one.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub id: Option<ExpenseId>,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Amount,
    pub category: String,
    pub recurring: bool,
    pub frequency: Option<String>,
    pub notes: Option<String>,
}

impl NewExpense {
    /// A non-recurring expense with no notes.
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Amount,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            date,
            description: description.into(),
            amount,
            category: category.into(),
            recurring: false,
            frequency: None,
            notes: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<ExpenseId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn recurring(mut self, frequency: Option<String>) -> Self {
        self.recurring = true;
        self.frequency = frequency;
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub(crate) fn into_expense(self, id: ExpenseId) -> Expense {
        Expense {
            id,
            date: self.date,
            description: self.description,
            amount: self.amount,
            category: self.category,
            recurring: self.recurring,
            frequency: self
                .frequency
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(default_frequency),
            notes: self.notes.unwrap_or_default(),
        }
    }
}

/// Field changes for an existing expense. Fields that are `None` keep their current value. The id
/// cannot be changed.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExpenseUpdates {
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub amount: Option<Amount>,
    pub category: Option<String>,
    pub recurring: Option<bool>,
    pub frequency: Option<String>,
    pub notes: Option<String>,
}

impl ExpenseUpdates {
    /// Builds the replacement record for `current`.
    pub(crate) fn apply(self, current: &Expense) -> Expense {
        Expense {
            id: current.id.clone(),
            date: self.date.unwrap_or(current.date),
            description: self
                .description
                .unwrap_or_else(|| current.description.clone()),
            amount: self.amount.unwrap_or(current.amount),
            category: self.category.unwrap_or_else(|| current.category.clone()),
            recurring: self.recurring.unwrap_or(current.recurring),
            frequency: self
                .frequency
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| current.frequency.clone()),
            notes: self.notes.unwrap_or_else(|| current.notes.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &ExpenseUpdates::default()
    }
}

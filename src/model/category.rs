use serde::{Deserialize, Serialize};
use tracing::debug;

/// The closed set of expense categories.
///
/// Expenses store the category key exactly as it was written, so data that references a key
/// outside this set survives a load/save cycle. For aggregation and display such keys resolve to
/// `Category::Other`.
#[derive(
    Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Housing,
    Utilities,
    Groceries,
    Dining,
    Transportation,
    Subscriptions,
    Healthcare,
    Shopping,
    Entertainment,
    #[default]
    Other,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

impl Category {
    /// All categories in their display order.
    pub const ALL: [Category; 10] = [
        Category::Housing,
        Category::Utilities,
        Category::Groceries,
        Category::Dining,
        Category::Transportation,
        Category::Subscriptions,
        Category::Healthcare,
        Category::Shopping,
        Category::Entertainment,
        Category::Other,
    ];

    /// Resolves a stored category key. Unknown keys fall back to `Other`.
    pub fn resolve(key: &str) -> Category {
        match key.parse::<Category>() {
            Ok(category) => category,
            Err(_) => {
                debug!("Unknown category key '{key}' grouped under '{}'", Category::Other);
                Category::Other
            }
        }
    }

    /// Returns true if `key` names one of the known categories.
    pub fn is_known(key: &str) -> bool {
        key.parse::<Category>().is_ok()
    }

    /// The stable key used in stored data, e.g. `dining`.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Housing => "housing",
            Category::Utilities => "utilities",
            Category::Groceries => "groceries",
            Category::Dining => "dining",
            Category::Transportation => "transportation",
            Category::Subscriptions => "subscriptions",
            Category::Healthcare => "healthcare",
            Category::Shopping => "shopping",
            Category::Entertainment => "entertainment",
            Category::Other => "other",
        }
    }

    /// The human readable name, e.g. `Eating Out`.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Housing => "Housing",
            Category::Utilities => "Utilities",
            Category::Groceries => "Groceries",
            Category::Dining => "Eating Out",
            Category::Transportation => "Transportation",
            Category::Subscriptions => "Subscriptions",
            Category::Healthcare => "Healthcare",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::Other => "Other",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Category::Housing => "🏠",
            Category::Utilities => "⚡",
            Category::Groceries => "🛒",
            Category::Dining => "🍔",
            Category::Transportation => "🚗",
            Category::Subscriptions => "📺",
            Category::Healthcare => "🏥",
            Category::Shopping => "🛍️",
            Category::Entertainment => "🎬",
            Category::Other => "📦",
        }
    }

    /// The display color as a hex string, e.g. `#3B82F6`.
    pub fn color(&self) -> &'static str {
        match self {
            Category::Housing => "#3B82F6",
            Category::Utilities => "#EAB308",
            Category::Groceries => "#10B981",
            Category::Dining => "#EC4899",
            Category::Transportation => "#F97316",
            Category::Subscriptions => "#8B5CF6",
            Category::Healthcare => "#14B8A6",
            Category::Shopping => "#A855F7",
            Category::Entertainment => "#F43F5E",
            Category::Other => "#64748B",
        }
    }
}

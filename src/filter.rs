//! Filtering the expense list by category, date range and search text.

use std::fmt::Display;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;

use crate::{
    category::Category,
    date_range::{DateRangeToken, InstantRange, range_for},
    expense::{Expense, ExpenseDate},
};

/// The category selector of the filter bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    /// Show every category.
    #[default]
    All,
    /// Only show expenses in this category.
    Only(Category),
}

impl CategoryFilter {
    /// Parse the selector value, where "all" (or nothing) means every category.
    ///
    /// Unknown categories also mean every category, so a stale selection
    /// never hides the user's data.
    pub fn parse_lenient(value: &str) -> Self {
        let value = value.trim();

        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            return Self::All;
        }

        match value.parse() {
            Ok(category) => Self::Only(category),
            Err(_) => {
                tracing::warn!("Unknown category filter \"{value}\", showing all categories");
                Self::All
            }
        }
    }

    fn matches(self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == category,
        }
    }
}

impl Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Only(category) => write!(f, "{category}"),
        }
    }
}

impl Serialize for CategoryFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CategoryFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(CategoryFilter::parse_lenient(&value))
    }
}

/// The current state of the filter bar.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Which category to show.
    #[serde(default)]
    pub category: CategoryFilter,
    /// Which dates to show.
    #[serde(default)]
    pub date_range: DateRangeToken,
    /// Text to look for in the title or notes.
    #[serde(default)]
    pub search: String,
}

impl FilterCriteria {
    /// Whether any filter differs from its default.
    pub fn is_filtering(&self) -> bool {
        self.category != CategoryFilter::All
            || self.date_range != DateRangeToken::All
            || !self.search.is_empty()
    }

    /// Clear all filters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Select the expenses that match every filter in `criteria`, keeping their order.
///
/// `now` anchors relative date ranges such as "last 7 days".
pub fn filter_expenses<'a>(
    expenses: &'a [Expense],
    criteria: &FilterCriteria,
    now: OffsetDateTime,
) -> Vec<&'a Expense> {
    let predicate = ExpensePredicate::new(criteria, now);

    expenses
        .iter()
        .filter(|expense| predicate.matches(expense))
        .collect()
}

/// The filter criteria resolved against a point in time, ready to test expenses.
struct ExpensePredicate {
    category: CategoryFilter,
    range: Option<InstantRange>,
    search: Option<String>,
}

impl ExpensePredicate {
    fn new(criteria: &FilterCriteria, now: OffsetDateTime) -> Self {
        let search = (!criteria.search.is_empty()).then(|| criteria.search.to_lowercase());

        Self {
            category: criteria.category,
            range: range_for(criteria.date_range, now),
            search,
        }
    }

    fn matches(&self, expense: &Expense) -> bool {
        self.category.matches(expense.category)
            && self.in_range(expense)
            && self.matches_search(expense)
    }

    fn in_range(&self, expense: &Expense) -> bool {
        let Some(range) = &self.range else {
            return true;
        };

        match &expense.date {
            ExpenseDate::Calendar(date) => range.includes_date(*date),
            ExpenseDate::Unparsed(text) => {
                tracing::warn!(
                    "Excluding expense {} from date filter, its date \"{text}\" is malformed",
                    expense.id
                );
                false
            }
        }
    }

    fn matches_search(&self, expense: &Expense) -> bool {
        let Some(search) = &self.search else {
            return true;
        };

        expense.title.to_lowercase().contains(search)
            || expense.notes_or_empty().to_lowercase().contains(search)
    }
}

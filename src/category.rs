//! Expense categories and the palette used to draw them.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

use crate::Error;

/// The color used for `other` and for any identifier that is not a known category.
pub const FALLBACK_COLOR: &str = "#6B7280";

/// The fixed set of categories an expense can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Groceries, eating out and drinks.
    Food,
    /// Public transport, fuel, taxis.
    Transport,
    /// Movies, games, events.
    Entertainment,
    /// Rent, utilities, subscriptions.
    Bills,
    /// Clothes and other purchases.
    Shopping,
    /// Doctors, pharmacy, insurance.
    Health,
    /// Anything else.
    Other,
}

impl Category {
    /// Every category, in the order they are offered to the user.
    pub const ALL: [Category; 7] = [
        Category::Food,
        Category::Transport,
        Category::Entertainment,
        Category::Bills,
        Category::Shopping,
        Category::Health,
        Category::Other,
    ];

    /// The identifier used in stored records and query parameters, e.g. `"food"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Transport => "transport",
            Self::Entertainment => "entertainment",
            Self::Bills => "bills",
            Self::Shopping => "shopping",
            Self::Health => "health",
            Self::Other => "other",
        }
    }

    /// The human readable name shown in selectors.
    pub fn label(self) -> &'static str {
        match self {
            Self::Food => "Food & Dining",
            Self::Transport => "Transportation",
            Self::Entertainment => "Entertainment",
            Self::Bills => "Bills & Utilities",
            Self::Shopping => "Shopping",
            Self::Health => "Health & Medical",
            Self::Other => "Other",
        }
    }

    /// The identifier with its first letter capitalized, used for chart labels.
    pub fn chart_label(self) -> String {
        let id = self.as_str();
        let mut chars = id.chars();

        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// The display color of the category as a hex string.
    pub fn color(self) -> &'static str {
        match self {
            Self::Food => "#3B82F6",
            Self::Transport => "#10B981",
            Self::Entertainment => "#F59E0B",
            Self::Bills => "#EF4444",
            Self::Shopping => "#8B5CF6",
            Self::Health => "#EC4899",
            Self::Other => FALLBACK_COLOR,
        }
    }

    /// Map an identifier to a category, treating anything unrecognized as [Category::Other].
    pub fn from_id_lossy(id: &str) -> Self {
        id.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown category \"{id}\", treating it as \"other\"");
            Self::Other
        })
    }
}

/// Get the display color for a category identifier.
///
/// Unknown identifiers get [FALLBACK_COLOR], the same color as `other`.
pub fn color_of(category: &str) -> &'static str {
    category
        .parse::<Category>()
        .map(Category::color)
        .unwrap_or(FALLBACK_COLOR)
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownCategory(s.to_owned()))
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Records written by other clients may carry categories this build does not
// know about, those are grouped under `other` instead of failing the load.
impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let id = String::deserialize(deserializer)?;
        Ok(Category::from_id_lossy(&id))
    }
}

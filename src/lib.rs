//! Expense tracker core: record expenses, filter them and total them up.
//!
//! This library holds the client-side logic of a personal finance tracker.
//! Expenses are owned by an external store. The client keeps a synced copy
//! ([ExpenseList]) and derives everything it shows from snapshots of it:
//! the filtered list ([filter_expenses]), totals ([total_of],
//! [totals_by_category]), dashboard cards ([monthly_summary]) and category
//! charts ([spending_chart]).

#![warn(missing_docs)]

use time::Date;

mod aggregation;
mod category;
mod charts;
mod context;
mod currency;
mod date_range;
mod expense;
mod filter;
mod import;
mod report;
mod store;
mod timezone;

pub use aggregation::{
    MonthlySummary, monthly_summary, top_categories, total_of, totals_by_category,
};
pub use category::{Category, FALLBACK_COLOR, color_of};
pub use charts::{ChartKind, spending_chart};
pub use context::{AppContext, Theme, User};
pub use currency::{CURRENCIES, Currency, DEFAULT_CURRENCY, find_currency, format_amount};
pub use date_range::{DateRangeToken, InstantRange, range_for};
pub use expense::{Expense, ExpenseDate, ExpenseId, ExpenseUpdate, NewExpense, TransactionKind};
pub use filter::{CategoryFilter, FilterCriteria, filter_expenses};
pub use import::{ExportFormat, load_expenses, parse_csv, parse_json};
pub use report::ExpenseReport;
pub use store::{
    ChangeEvent, ChangeFeed, ExpenseList, ExpenseStore, InMemoryExpenseStore, Subscription,
};
pub use timezone::{get_local_offset, now_in};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The identifier does not name one of the fixed categories.
    #[error("unknown category \"{0}\"")]
    UnknownCategory(String),

    /// The token does not name one of the date range presets.
    #[error("unknown date range \"{0}\"")]
    UnknownDateRange(String),

    /// An empty string was used as an expense title.
    #[error("expense title cannot be empty")]
    EmptyTitle,

    /// The amount of an expense must be a number greater than zero.
    #[error("{0} is not a valid amount, amounts must be greater than zero")]
    InvalidAmount(f64),

    /// A date in the future was used to create an expense.
    ///
    /// Expenses record money that has already been spent, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// The requested expense was not found.
    ///
    /// Check that the ID is correct and that the expense has not already
    /// been deleted by another client.
    #[error("the requested expense could not be found")]
    NotFound,

    /// Could not acquire a lock on the expense store or one of its lists.
    #[error("could not acquire the expense store lock")]
    StoreLockError,

    /// Expenses can only be changed while a user is signed in.
    #[error("no user is signed in")]
    NotSignedIn,

    /// The currency code is not one of the supported currencies.
    #[error("unsupported currency \"{0}\"")]
    InvalidCurrency(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// The CSV export had issues that prevented it from being parsed.
    #[error("could not parse the CSV file: {0}")]
    InvalidCsv(String),

    /// The JSON export had issues that prevented it from being parsed.
    #[error("could not parse the JSON file: {0}")]
    InvalidJson(String),

    /// A file could not be read or written.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        tracing::error!("could not parse CSV record: {value}");
        Error::InvalidCsv(value.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        tracing::error!("could not parse JSON: {value}");
        Error::InvalidJson(value.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value.to_string())
    }
}

//! Application-wide state shared with everything that renders expenses.
//!
//! An [AppContext] is created once when the application starts and dropped
//! when it shuts down. It holds the signed-in user, the display preferences
//! and the live expense list, which it keeps in sync with the store through a
//! change-feed subscription for as long as it lives.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    currency::{Currency, DEFAULT_CURRENCY},
    expense::{Expense, ExpenseId, ExpenseUpdate, NewExpense},
    filter::FilterCriteria,
    report::ExpenseReport,
    store::{ChangeEvent, ExpenseList, ExpenseStore, Subscription},
};

/// The signed-in user as reported by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The provider's user ID.
    pub id: String,
    /// The user's email address.
    pub email: String,
    /// The code of the currency the user last chose.
    pub currency_preference: String,
}

/// Light or dark colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark text on a light background.
    #[default]
    Light,
    /// Light text on a dark background.
    Dark,
}

impl Theme {
    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// The store, user, preferences and live expense list of a running application.
pub struct AppContext {
    store: Arc<dyn ExpenseStore + Send + Sync>,
    user: Option<User>,
    currency: Currency,
    theme: Theme,
    expenses: Arc<Mutex<ExpenseList>>,
    subscription: Option<Subscription>,
}

impl AppContext {
    /// Load the current expenses from `store` and start following its changes.
    ///
    /// The display currency comes from the user's preference, or
    /// [DEFAULT_CURRENCY] if there is no user or the preference is not supported.
    ///
    /// # Errors
    ///
    /// Returns any error from listing or subscribing to the store.
    pub fn start(
        store: Arc<dyn ExpenseStore + Send + Sync>,
        user: Option<User>,
    ) -> Result<Self, Error> {
        let currency = user
            .as_ref()
            .map(|user| {
                Currency::from_code(&user.currency_preference).unwrap_or_else(|error| {
                    tracing::warn!("{error}, using {}", DEFAULT_CURRENCY.code);
                    DEFAULT_CURRENCY
                })
            })
            .unwrap_or(DEFAULT_CURRENCY);

        // Subscribe before loading so no change between the two is missed.
        let expenses = Arc::new(Mutex::new(ExpenseList::default()));
        let sink = expenses.clone();
        let subscription = store.subscribe(Box::new(move |event: &ChangeEvent| {
            match sink.lock() {
                Ok(mut list) => list.apply(event),
                Err(error) => tracing::error!("could not apply {event:?}: {error}"),
            }
        }))?;

        let context = Self {
            store,
            user,
            currency,
            theme: Theme::default(),
            expenses,
            subscription: Some(subscription),
        };
        context.refresh()?;

        tracing::info!("Started with {} expenses", context.lock_expenses()?.len());

        Ok(context)
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The currency amounts are displayed in.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Change the display currency.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidCurrency] if `code` is not a supported currency.
    pub fn set_currency(&mut self, code: &str) -> Result<(), Error> {
        self.currency = Currency::from_code(code)?;

        if let Some(user) = &mut self.user {
            user.currency_preference = self.currency.code.to_owned();
        }

        Ok(())
    }

    /// Format `amount` in the display currency.
    pub fn format_amount(&self, amount: f64) -> String {
        self.currency.format(amount)
    }

    /// The current theme.
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Switch between light and dark.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    /// A copy of the current expenses, newest first.
    ///
    /// # Errors
    ///
    /// Returns [Error::StoreLockError] if the list's lock is poisoned.
    pub fn expenses(&self) -> Result<Vec<Expense>, Error> {
        Ok(self.lock_expenses()?.as_slice().to_vec())
    }

    /// Filter and total the current expenses.
    ///
    /// # Errors
    ///
    /// Returns [Error::StoreLockError] if the list's lock is poisoned.
    pub fn report(
        &self,
        criteria: &FilterCriteria,
        now: OffsetDateTime,
        top_limit: usize,
    ) -> Result<ExpenseReport, Error> {
        let expenses = self.lock_expenses()?;
        Ok(ExpenseReport::build(expenses.as_slice(), criteria, now, top_limit))
    }

    /// Create an expense for the signed-in user in the display currency.
    ///
    /// The live list picks the new expense up from the change feed.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotSignedIn] without a user, or any error from the store.
    pub fn add_expense(&self, expense: NewExpense) -> Result<Expense, Error> {
        self.require_user()?;
        self.store.create(expense.currency(self.currency.code))
    }

    /// Apply a partial update to one of the signed-in user's expenses.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotSignedIn] without a user, or any error from the store.
    pub fn edit_expense(&self, id: &ExpenseId, update: ExpenseUpdate) -> Result<Expense, Error> {
        self.require_user()?;
        self.store.update(id, update)
    }

    /// Delete one of the signed-in user's expenses.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotSignedIn] without a user, or any error from the store.
    pub fn delete_expense(&self, id: &ExpenseId) -> Result<(), Error> {
        self.require_user()?;
        self.store.delete(id)
    }

    /// Replace the live list with a fresh snapshot from the store.
    ///
    /// # Errors
    ///
    /// Returns any error from listing the store.
    pub fn refresh(&self) -> Result<(), Error> {
        // Events delivered while the snapshot loads wait for the list lock and
        // are applied on top of it.
        let mut expenses = self.lock_expenses()?;
        expenses.replace(self.store.list()?);
        Ok(())
    }

    /// Stop following the store and release the context.
    pub fn shutdown(mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }

        tracing::info!("Expense context shut down");
    }

    fn require_user(&self) -> Result<&User, Error> {
        self.user.as_ref().ok_or(Error::NotSignedIn)
    }

    fn lock_expenses(&self) -> Result<MutexGuard<'_, ExpenseList>, Error> {
        self.expenses
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire expense list lock: {error}"))
            .map_err(|_| Error::StoreLockError)
    }
}

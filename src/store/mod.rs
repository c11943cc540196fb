//! The expense store and the client-side copy that tracks it.
//!
//! The store owns expense identity and ordering. Clients hold an
//! [ExpenseList] and keep it fresh by subscribing to the store's change feed.

mod feed;
mod list;
mod memory;

pub use feed::{ChangeEvent, ChangeFeed, Subscription};
pub use list::ExpenseList;
pub use memory::InMemoryExpenseStore;

use crate::{
    Error,
    expense::{Expense, ExpenseId, ExpenseUpdate, NewExpense},
};

/// Handles the creation, editing, deletion and retrieval of expenses.
pub trait ExpenseStore {
    /// Validate and create a new expense, assigning its ID and creation time.
    fn create(&self, expense: NewExpense) -> Result<Expense, Error>;

    /// Apply a partial update to the expense with `id` and return the new record.
    fn update(&self, id: &ExpenseId, update: ExpenseUpdate) -> Result<Expense, Error>;

    /// Delete the expense with `id`.
    fn delete(&self, id: &ExpenseId) -> Result<(), Error>;

    /// Retrieve every expense, newest first.
    fn list(&self) -> Result<Vec<Expense>, Error>;

    /// Receive every change made to the store until the subscription ends.
    fn subscribe(
        &self,
        listener: Box<dyn Fn(&ChangeEvent) + Send + Sync>,
    ) -> Result<Subscription, Error>;
}

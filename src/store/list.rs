//! The client's copy of the expense collection.

use std::cmp::Reverse;

use crate::{
    expense::{Expense, ExpenseId},
    store::ChangeEvent,
};

/// The expenses the client currently knows about, newest first.
///
/// The list starts from a snapshot of the store and is kept in sync by
/// applying [ChangeEvent]s from the store's change feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseList {
    expenses: Vec<Expense>,
}

impl ExpenseList {
    /// Create a list from a snapshot, ordered newest first by creation time.
    pub fn new(mut snapshot: Vec<Expense>) -> Self {
        snapshot.sort_by_key(|expense| Reverse(expense.created_at));
        Self { expenses: snapshot }
    }

    /// Replace the contents with a fresh snapshot.
    pub fn replace(&mut self, snapshot: Vec<Expense>) {
        *self = Self::new(snapshot);
    }

    /// Apply a change pushed by the store.
    ///
    /// New expenses go to the front, edited expenses are replaced where they
    /// are and deleted expenses are removed. Events about expenses the list
    /// does not hold are ignored.
    pub fn apply(&mut self, event: &ChangeEvent) {
        match event {
            ChangeEvent::Inserted(expense) => match self.position(&expense.id) {
                Some(position) => {
                    tracing::debug!("Expense {} was already in the list", expense.id);
                    self.expenses[position] = expense.clone();
                }
                None => self.expenses.insert(0, expense.clone()),
            },
            ChangeEvent::Updated(expense) => match self.position(&expense.id) {
                Some(position) => self.expenses[position] = expense.clone(),
                None => tracing::debug!("Ignoring update for unknown expense {}", expense.id),
            },
            ChangeEvent::Deleted(id) => self.expenses.retain(|expense| &expense.id != id),
        }
    }

    /// Find an expense by ID.
    pub fn get(&self, id: &ExpenseId) -> Option<&Expense> {
        self.expenses.iter().find(|expense| &expense.id == id)
    }

    /// The expenses, newest first.
    pub fn as_slice(&self) -> &[Expense] {
        &self.expenses
    }

    /// The number of expenses.
    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    /// Whether the list holds no expenses.
    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    fn position(&self, id: &ExpenseId) -> Option<usize> {
        self.expenses.iter().position(|expense| &expense.id == id)
    }
}

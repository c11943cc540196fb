//! An expense store that keeps everything in memory.

use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard},
};

use time::{OffsetDateTime, UtcOffset};

use crate::{
    Error,
    expense::{Expense, ExpenseId, ExpenseUpdate, NewExpense},
    store::{ChangeEvent, ChangeFeed, ExpenseList, ExpenseStore, Subscription},
};

/// Stores expenses in memory and notifies subscribers of every change.
///
/// Subscribers receive events in the order the changes were applied, even
/// when a listener changes the store itself or several threads write at once.
/// A change made while another thread is delivering events is handed to
/// listeners by that thread.
///
/// Used for tests and for working with an exported file offline.
pub struct InMemoryExpenseStore {
    state: Mutex<StoreState>,
    feed: ChangeFeed,
    local_offset: UtcOffset,
}

struct StoreState {
    expenses: ExpenseList,
    /// Applied changes that have not been published yet, oldest first.
    pending: VecDeque<ChangeEvent>,
    delivering: bool,
}

impl StoreState {
    fn record(&mut self, event: ChangeEvent) {
        self.expenses.apply(&event);
        self.pending.push_back(event);
    }
}

impl InMemoryExpenseStore {
    /// Create an empty store.
    ///
    /// `local_offset` decides what "today" is when checking that new
    /// expenses are not dated in the future.
    pub fn new(local_offset: UtcOffset) -> Self {
        Self::with_expenses(Vec::new(), local_offset)
    }

    /// Create a store that starts out holding `expenses`.
    pub fn with_expenses(expenses: Vec<Expense>, local_offset: UtcOffset) -> Self {
        Self {
            state: Mutex::new(StoreState {
                expenses: ExpenseList::new(expenses),
                pending: VecDeque::new(),
                delivering: false,
            }),
            feed: ChangeFeed::new(),
            local_offset,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, Error> {
        self.state
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire expense store lock: {error}"))
            .map_err(|_| Error::StoreLockError)
    }

    /// Apply `event` under the lock that was used to check it, then publish.
    fn commit(
        &self,
        mut state: MutexGuard<'_, StoreState>,
        event: ChangeEvent,
    ) -> Result<(), Error> {
        state.record(event);
        drop(state);
        self.deliver()
    }

    /// Publish pending events in order until the queue is empty.
    ///
    /// Only one caller delivers at a time, the lock is not held while
    /// listeners run.
    fn deliver(&self) -> Result<(), Error> {
        {
            let mut state = self.lock()?;

            if state.delivering {
                return Ok(());
            }

            state.delivering = true;
        }

        loop {
            let next = {
                let mut state = self.lock()?;
                let next = state.pending.pop_front();
                state.delivering = next.is_some();
                next
            };

            let Some(event) = next else {
                return Ok(());
            };

            if let Err(error) = self.feed.publish(&event) {
                if let Ok(mut state) = self.lock() {
                    state.delivering = false;
                }

                return Err(error);
            }
        }
    }
}

impl ExpenseStore for InMemoryExpenseStore {
    fn create(&self, expense: NewExpense) -> Result<Expense, Error> {
        let now = OffsetDateTime::now_utc().to_offset(self.local_offset);
        expense.validate(now.date())?;

        let expense = expense.into_expense(ExpenseId::new_random(), now);
        tracing::debug!("Created expense {}", expense.id);
        self.commit(self.lock()?, ChangeEvent::Inserted(expense.clone()))?;

        Ok(expense)
    }

    fn update(&self, id: &ExpenseId, update: ExpenseUpdate) -> Result<Expense, Error> {
        let state = self.lock()?;
        let mut expense = state.expenses.get(id).cloned().ok_or(Error::NotFound)?;
        update.apply(&mut expense)?;

        tracing::debug!("Updated expense {id}");
        self.commit(state, ChangeEvent::Updated(expense.clone()))?;

        Ok(expense)
    }

    fn delete(&self, id: &ExpenseId) -> Result<(), Error> {
        let state = self.lock()?;

        if state.expenses.get(id).is_none() {
            return Err(Error::NotFound);
        }

        tracing::debug!("Deleted expense {id}");
        self.commit(state, ChangeEvent::Deleted(id.clone()))
    }

    fn list(&self) -> Result<Vec<Expense>, Error> {
        Ok(self.lock()?.expenses.as_slice().to_vec())
    }

    fn subscribe(
        &self,
        listener: Box<dyn Fn(&ChangeEvent) + Send + Sync>,
    ) -> Result<Subscription, Error> {
        self.feed.subscribe(listener)
    }
}

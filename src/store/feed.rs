//! Push notifications of changes to the expense collection.

use std::sync::{Arc, Mutex, Weak};

use crate::{
    Error,
    expense::{Expense, ExpenseId},
};

/// A change made to the expense collection by any client.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// A new expense was created.
    Inserted(Expense),
    /// An existing expense was edited, this holds the whole new record.
    Updated(Expense),
    /// The expense with this ID was deleted.
    Deleted(ExpenseId),
}

type Listener = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Delivers [ChangeEvent]s to every registered listener.
///
/// Cloning a feed gives another handle to the same set of listeners.
#[derive(Clone, Default)]
pub struct ChangeFeed {
    registry: Arc<Mutex<Registry>>,
}

impl ChangeFeed {
    /// Create a feed with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` to be called with every event published from now on.
    ///
    /// The listener stays registered until the returned [Subscription] is
    /// cancelled or dropped.
    ///
    /// # Errors
    ///
    /// Returns [Error::StoreLockError] if the listener registry is poisoned.
    pub fn subscribe(
        &self,
        listener: impl Fn(&ChangeEvent) + Send + Sync + 'static,
    ) -> Result<Subscription, Error> {
        let mut registry = self
            .registry
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire listener lock: {error}"))
            .map_err(|_| Error::StoreLockError)?;

        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(listener)));
        tracing::debug!("Added change feed listener {id}");

        Ok(Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        })
    }

    /// Call every listener with `event`.
    ///
    /// Listeners run on the calling thread after the registry lock is
    /// released, so a listener may subscribe or cancel without deadlocking.
    ///
    /// # Errors
    ///
    /// Returns [Error::StoreLockError] if the listener registry is poisoned.
    pub fn publish(&self, event: &ChangeEvent) -> Result<(), Error> {
        let listeners: Vec<Listener> = self
            .registry
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire listener lock: {error}"))
            .map_err(|_| Error::StoreLockError)?
            .listeners
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        tracing::debug!("Publishing {event:?} to {} listeners", listeners.len());

        for listener in listeners {
            listener(event);
        }

        Ok(())
    }

    /// The number of active subscriptions.
    pub fn listener_count(&self) -> usize {
        self.registry
            .lock()
            .map(|registry| registry.listeners.len())
            .unwrap_or_default()
    }
}

/// A registration on a [ChangeFeed].
///
/// The listener is removed when the subscription is cancelled or dropped.
#[must_use = "dropping a subscription immediately unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Stop receiving events.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };

        match registry.lock() {
            Ok(mut registry) => {
                registry.listeners.retain(|(id, _)| *id != self.id);
                tracing::debug!("Removed change feed listener {}", self.id);
            }
            Err(error) => {
                tracing::error!("could not remove listener {}: {error}", self.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{ChangeEvent, ChangeFeed};
    use crate::expense::ExpenseId;

    fn recorder() -> (Arc<Mutex<Vec<ChangeEvent>>>, impl Fn(&ChangeEvent) + Send + Sync) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();

        (events, move |event: &ChangeEvent| {
            sink.lock().unwrap().push(event.clone())
        })
    }

    #[test]
    fn delivers_events_to_all_listeners() {
        let feed = ChangeFeed::new();
        let (first, first_listener) = recorder();
        let (second, second_listener) = recorder();
        let _first_subscription = feed.subscribe(first_listener).unwrap();
        let _second_subscription = feed.subscribe(second_listener).unwrap();
        let event = ChangeEvent::Deleted(ExpenseId::new("1"));

        feed.publish(&event).unwrap();

        assert_eq!(*first.lock().unwrap(), vec![event.clone()]);
        assert_eq!(*second.lock().unwrap(), vec![event]);
    }

    #[test]
    fn cancel_stops_delivery() {
        let feed = ChangeFeed::new();
        let (events, listener) = recorder();
        let subscription = feed.subscribe(listener).unwrap();

        subscription.cancel();
        feed.publish(&ChangeEvent::Deleted(ExpenseId::new("1"))).unwrap();

        assert!(events.lock().unwrap().is_empty());
        assert_eq!(feed.listener_count(), 0);
    }

    #[test]
    fn drop_stops_delivery() {
        let feed = ChangeFeed::new();
        let (events, listener) = recorder();

        {
            let _subscription = feed.subscribe(listener).unwrap();
            assert_eq!(feed.listener_count(), 1);
        }

        feed.publish(&ChangeEvent::Deleted(ExpenseId::new("1"))).unwrap();

        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn cancelling_one_keeps_others() {
        let feed = ChangeFeed::new();
        let (kept, kept_listener) = recorder();
        let (_, dropped_listener) = recorder();
        let _kept_subscription = feed.subscribe(kept_listener).unwrap();
        feed.subscribe(dropped_listener).unwrap().cancel();

        feed.publish(&ChangeEvent::Deleted(ExpenseId::new("2"))).unwrap();

        assert_eq!(kept.lock().unwrap().len(), 1);
        assert_eq!(feed.listener_count(), 1);
    }

    #[test]
    fn subscription_outliving_feed_is_harmless() {
        let feed = ChangeFeed::new();
        let (_, listener) = recorder();
        let subscription = feed.subscribe(listener).unwrap();

        drop(feed);

        subscription.cancel();
    }
}

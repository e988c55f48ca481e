//! Subscription registry: listeners notified after every applied dispatch.
//!
//! Listeners run synchronously, in registration order, with the fresh
//! snapshot. A panicking listener is isolated so the remaining listeners
//! still run; the panic is reported through `tracing`, not propagated.

use livestate_core::state::Snapshot;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// A registered state listener.
pub type Listener<T> = Arc<dyn Fn(&Snapshot<T>) + Send + Sync>;

/// Registry of active subscribers for one container.
pub(crate) struct SubscriberRegistry<T> {
    entries: Mutex<Vec<(u64, Listener<T>)>>,
    next_id: AtomicU64,
}

impl<T> SubscriberRegistry<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register a listener, returning its registry id.
    pub(crate) fn register(&self, listener: Listener<T>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    /// Remove a listener by id. Removing an already-removed id is a no-op,
    /// which is what makes `Subscription::unsubscribe` idempotent.
    pub(crate) fn remove(&self, id: u64) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(entry_id, _)| *entry_id != id);
    }

    /// Invoke every registered listener with the new snapshot, in
    /// registration order.
    ///
    /// Listeners are cloned out of the lock before invocation so a
    /// listener may subscribe or unsubscribe re-entrantly without
    /// deadlocking. A listener registered during notification is first
    /// called on the next dispatch.
    pub(crate) fn notify(&self, snapshot: &Snapshot<T>) {
        let listeners: Vec<Listener<T>> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(snapshot))).is_err() {
                metrics::counter!("container.subscribers.panicked").increment(1);
                tracing::warn!("subscriber panicked during notification, remaining listeners still run");
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Handle for a registered listener.
///
/// Returned by `Container::subscribe`. Dropping the handle does not
/// unregister the listener; only an explicit [`Subscription::unsubscribe`]
/// does, and calling it more than once is a no-op.
pub struct Subscription<T> {
    id: u64,
    registry: Weak<SubscriberRegistry<T>>,
}

impl<T> Subscription<T> {
    pub(crate) fn new(id: u64, registry: Weak<SubscriberRegistry<T>>) -> Self {
        Self { id, registry }
    }

    /// Deregister the listener. Idempotent; a no-op once the container is
    /// gone.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

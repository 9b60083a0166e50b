//! Change Notification
//!
//! A small callback registry used for primary-subject and flashcard change
//! notifications. Callbacks are invoked synchronously, in registration order.
//!
//! `subscribe` hands back a [`Subscription`] guard; dropping the guard removes
//! the callback, so a consumer registers once for its lifetime instead of
//! piling up duplicate callbacks. Call [`Subscription::detach`] to keep the
//! callback until it is removed explicitly with
//! [`Subscribers::unsubscribe`].

use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Callback type for change notifications.
pub type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Identity of a registered callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

struct Registry<T> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Callback<T>)>,
}

impl<T> Registry<T> {
    fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }
}

/// Type-erased removal handle held by [`Subscription`] guards.
trait Detach: Send + Sync {
    fn detach(&self, id: SubscriptionId);
}

impl<T> Detach for Mutex<Registry<T>> {
    fn detach(&self, id: SubscriptionId) {
        self.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(id);
    }
}

/// Ordered set of change callbacks.
pub struct Subscribers<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: 'static> Subscribers<T> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Registry<T>> {
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a callback. It stays registered while the returned guard lives.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = self.lock();
            let id = SubscriptionId(registry.next_id);
            registry.next_id += 1;
            registry.entries.push((id, Arc::new(callback)));
            id
        };

        let registry: Arc<dyn Detach> = self.registry.clone();
        Subscription {
            id,
            registry: Some(Arc::downgrade(&registry)),
        }
    }

    /// Remove a callback by identity. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().remove(id)
    }

    /// Invoke every callback with `value`.
    ///
    /// The registry lock is released before callbacks run, so a callback may
    /// itself subscribe or unsubscribe.
    pub fn notify(&self, value: &T) {
        let callbacks: Vec<Callback<T>> = self
            .lock()
            .entries
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in callbacks {
            callback(value);
        }
    }

    /// Number of registered callbacks
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> std::fmt::Debug for Subscribers<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.len())
            .finish()
    }
}

/// Scoped registration of a callback; unregisters on drop.
#[must_use = "dropping a Subscription unregisters its callback"]
pub struct Subscription {
    id: SubscriptionId,
    registry: Option<Weak<dyn Detach>>,
}

impl Subscription {
    /// Identity of the registered callback
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Keep the callback registered past the guard's lifetime.
    pub fn detach(mut self) -> SubscriptionId {
        self.registry = None;
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.take().and_then(|weak| weak.upgrade()) {
            registry.detach(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("scoped", &self.registry.is_some())
            .finish()
    }
}

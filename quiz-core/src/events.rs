use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tracing::debug;
use uuid::Uuid;

use crate::state_machine::StateSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

type Listener = dyn Fn(&StateSnapshot) + Send + Sync;
type ListenerMap = Mutex<HashMap<SubscriptionId, Arc<Listener>>>;

/// Fan-out point for state snapshots.
///
/// Listeners register through [`EventHub::subscribe`] and are detached
/// structurally: dropping (or disposing) the returned [`Subscription`]
/// removes the listener synchronously, so a snapshot published afterwards
/// can never reach it. Multiple logical listeners may coexist; there is no
/// shared mutable callback slot to race over.
///
/// The listener map lock is never held while a listener runs, so a callback
/// may subscribe or dispose — the ownership-transfer pattern where one view
/// mounts the next view's listener from inside its own snapshot callback. A
/// listener added during a publish first sees the snapshot after that one.
#[derive(Clone, Default)]
pub struct EventHub {
    listeners: Arc<ListenerMap>,
}

impl EventHub {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&StateSnapshot) + Send + Sync + 'static,
    ) -> Subscription {
        let id = SubscriptionId::new();
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(listener));
        debug!(%id, "listener subscribed");
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    pub fn publish(&self, snapshot: &StateSnapshot) {
        // Clone the callbacks out of the map so no user code runs under the
        // lock; a listener is free to subscribe or dispose from inside.
        let listeners: Vec<Arc<Listener>> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Disposer returned by [`EventHub::subscribe`]. Detaches on drop.
pub struct Subscription {
    id: SubscriptionId,
    listeners: Weak<ListenerMap>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Explicit synchronous detach; equivalent to dropping.
    pub fn dispose(self) {}

    fn detach(&self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.id);
            debug!(id = %self.id, "listener detached");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, Weak};
use tracing::warn;

use otakunote_models::WatchStatus;

/// Field-level change to an existing entry, broadcast on the update channel
/// so views like tab counts can recompute without polling the store.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchlistUpdate {
    Status { id: String, status: WatchStatus },
    Progress { id: String, watched_episodes: u32 },
}

type MembershipListener = Arc<dyn Fn(&str, bool) + Send + Sync>;
type UpdateListener = Arc<dyn Fn(&WatchlistUpdate) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    membership: Vec<(u64, MembershipListener)>,
    updates: Vec<(u64, UpdateListener)>,
}

#[derive(Debug, Clone, Copy)]
enum Channel {
    Membership,
    Updates,
}

/// In-process notification bus for watchlist changes. Owned by the
/// composition root and shared with whoever needs to observe the store.
///
/// Two channels: membership `(id, added)` events for add/remove, and
/// [`WatchlistUpdate`] events for status/progress changes. Delivery is
/// synchronous and in registration order; a panicking listener is isolated
/// and logged so the remaining listeners still run.
#[derive(Default)]
pub struct WatchlistBus {
    registry: Arc<Mutex<Registry>>,
}

impl WatchlistBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for add/remove events. The returned handle
    /// deregisters exactly this listener; dropping the handle without
    /// calling [`Subscription::unsubscribe`] leaves the listener in place
    /// for the life of the bus.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&str, bool) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock().unwrap();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.membership.push((id, Arc::new(listener)));
        Subscription {
            registry: Arc::downgrade(&self.registry),
            id,
            channel: Channel::Membership,
        }
    }

    /// Register a listener for status/progress updates.
    pub fn subscribe_updates<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&WatchlistUpdate) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock().unwrap();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.updates.push((id, Arc::new(listener)));
        Subscription {
            registry: Arc::downgrade(&self.registry),
            id,
            channel: Channel::Updates,
        }
    }

    pub fn publish(&self, id: &str, added: bool) {
        // Snapshot outside the lock so listeners may subscribe/unsubscribe
        // without deadlocking.
        let listeners: Vec<MembershipListener> = {
            let registry = self.registry.lock().unwrap();
            registry.membership.iter().map(|(_, l)| l.clone()).collect()
        };
        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(id, added))).is_err() {
                warn!("watchlist membership listener panicked for id {}", id);
            }
        }
    }

    pub fn publish_update(&self, update: &WatchlistUpdate) {
        let listeners: Vec<UpdateListener> = {
            let registry = self.registry.lock().unwrap();
            registry.updates.iter().map(|(_, l)| l.clone()).collect()
        };
        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(update))).is_err() {
                warn!("watchlist update listener panicked");
            }
        }
    }
}

/// Handle identifying one registered listener.
pub struct Subscription {
    registry: Weak<Mutex<Registry>>,
    id: u64,
    channel: Channel,
}

impl Subscription {
    pub fn unsubscribe(self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.lock().unwrap();
        match self.channel {
            Channel::Membership => registry.membership.retain(|(id, _)| *id != self.id),
            Channel::Updates => registry.updates.retain(|(id, _)| *id != self.id),
        }
    }
}
